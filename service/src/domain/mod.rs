//! Domain definitions.

pub mod amenity;
pub mod availability;
pub mod contact;
pub mod reservation;
pub mod room;
pub mod room_type;

pub use self::{
    amenity::Amenity, contact::Contact, reservation::Reservation, room::Room,
    room_type::RoomType,
};
