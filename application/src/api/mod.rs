//! GraphQL API definitions.

pub mod amenity;
pub mod contact;
mod mutation;
mod query;
pub mod reservation;
pub mod room;
pub mod scalar;

use juniper::EmptySubscription;

use crate::{define_error, Context};

pub use self::{
    amenity::Amenity,
    contact::Contact,
    mutation::Mutation,
    query::Query,
    reservation::Reservation,
    room::{Room, RoomType},
};

/// GraphQL schema.
pub type Schema =
    juniper::RootNode<'static, Query, Mutation, EmptySubscription<Context>>;

define_error! {
    enum InputError {
        #[code = "NEGATIVE_GUEST_COUNT"]
        #[status = BAD_REQUEST]
        #[message = "Number of guests cannot be negative"]
        NegativeGuestCount,

        #[code = "INVALID_CLIENT_ID"]
        #[status = BAD_REQUEST]
        #[message = "Client identifier is empty or malformed"]
        InvalidClientId,
    }
}
