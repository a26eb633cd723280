//! [`Reservation`] definitions.

pub mod link;
pub mod request;

use std::str::FromStr;

use common::{define_kind, unit, DateTimeOf, Money};
#[cfg(doc)]
use common::DateTime;
use derive_more::{AsRef, Display, Error, From, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};

pub use self::{
    link::Link,
    request::{Booking, BuildError, Request},
};

/// Hotel reservation of one or more rooms by a client.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Reservation {
    /// ID of this [`Reservation`].
    pub id: Id,

    /// [`Header`] of this [`Reservation`].
    pub header: Header,

    /// Room [`Link`]s booked by this [`Reservation`], ordered by room.
    pub rooms: Vec<Link>,
}

impl Reservation {
    /// Returns the amount to be paid for this [`Reservation`].
    #[must_use]
    pub fn total(&self) -> Money {
        self.header.total()
    }

    /// Returns the current [`State`] of this [`Reservation`].
    #[must_use]
    pub fn state(&self) -> State {
        self.header.state
    }

    /// Returns the room [`Link`]s of this [`Reservation`] which weren't
    /// cancelled.
    pub fn active_rooms(&self) -> impl Iterator<Item = &Link> {
        self.rooms.iter().filter(|l| l.is_active())
    }
}

/// Scalar part of a [`Reservation`], stored apart from its room [`Link`]s.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Header {
    /// [`ClientId`] of the client who made the [`Reservation`].
    pub client_id: ClientId,

    /// Number of adult guests.
    pub adults: u16,

    /// Number of child guests.
    pub children: u16,

    /// Sum of every booked room's nightly price multiplied by its nights.
    pub subtotal: Money,

    /// Discount subtracted from the [`Header::subtotal`].
    ///
    /// Never negative and never exceeds the [`Header::subtotal`].
    pub discount: Money,

    /// [`DateTime`] the [`Reservation`] was confirmed by the client.
    pub confirmed_at: ConfirmationDateTime,

    /// [`State`] of the [`Reservation`].
    pub state: State,
}

impl Header {
    /// Returns the amount to be paid: [`Header::subtotal`] minus
    /// [`Header::discount`].
    #[must_use]
    pub fn total(&self) -> Money {
        self.subtotal - self.discount
    }
}

/// Change of a [`Reservation`]'s [`State`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct StateChange {
    /// ID of the [`Reservation`] to change.
    pub id: Id,

    /// New [`State`] of the [`Reservation`].
    pub state: State,
}

/// ID of a [`Reservation`].
#[derive(
    Clone,
    Copy,
    Debug,
    Display,
    Eq,
    From,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Id(i32);

/// Identifier of the client owning a [`Reservation`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct ClientId(String);

impl ClientId {
    /// Creates a new [`ClientId`] if the given `id` is valid.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        Self::check(&id).then_some(Self(id))
    }

    /// Checks whether the given `id` is a valid [`ClientId`].
    fn check(id: impl AsRef<str>) -> bool {
        let id = id.as_ref();
        id.trim() == id && !id.is_empty() && id.len() <= 255
    }
}

impl FromStr for ClientId {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `ClientId`")
    }
}

/// [`DateTime`] of a [`Reservation`] confirmation.
pub type ConfirmationDateTime = DateTimeOf<unit::Confirmation>;

define_kind! {
    #[doc = "Lifecycle state of a [`Reservation`]."]
    enum State {
        #[doc = "[`Reservation`] is created, but not confirmed yet."]
        Pending = 1,

        #[doc = "[`Reservation`] is confirmed."]
        Confirmed = 2,

        #[doc = "[`Reservation`] is cancelled and its rooms are released."]
        Cancelled = 3,

        #[doc = "Guests have stayed and checked out."]
        Completed = 4,
    }
}

impl State {
    /// Parses a [`State`] out of its exact name, like `Confirmed`.
    ///
    /// # Errors
    ///
    /// With [`InvalidState`] if the `name` doesn't denote any [`State`].
    pub fn parse(name: &str) -> Result<Self, InvalidState> {
        name.parse().map_err(|_| InvalidState(name.to_owned()))
    }

    /// Indicates whether no further transition is possible from this
    /// [`State`].
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Cancelled | Self::Completed)
    }

    /// Indicates whether a [`Reservation`] may move from this [`State`] into
    /// the `next` one.
    ///
    /// Staying in the same [`State`] is not a transition.
    #[must_use]
    pub fn can_become(self, next: Self) -> bool {
        use State as S;

        matches!(
            (self, next),
            (S::Pending, S::Confirmed | S::Cancelled)
                | (S::Confirmed, S::Completed | S::Cancelled)
        )
    }
}

/// String not denoting any [`State`].
#[derive(Clone, Debug, Display, Error)]
#[display("`{_0}` is not a valid reservation state")]
pub struct InvalidState(#[error(not(source))] pub String);
