//! Room [`Link`] of a [`Reservation`].

use common::{define_kind, DateRange, Money};

#[cfg(doc)]
use crate::domain::Reservation;
use crate::domain::{reservation, room, Room};

/// Booking of a single [`Room`] for a stay, as part of a [`Reservation`].
///
/// Identified by the pair of its [`reservation::Id`] and [`room::Id`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Link {
    /// ID of the [`Reservation`] this [`Link`] belongs to.
    pub reservation_id: reservation::Id,

    /// ID of the booked [`Room`].
    pub room_id: room::Id,

    /// Nightly price of the [`Room`] at the moment of booking.
    pub price: Money,

    /// Stay [`DateRange`] in the [`Room`].
    pub stay: DateRange,

    /// [`State`] of this [`Link`].
    pub state: State,

    /// Booked [`Room`], if it was resolved while reading.
    pub room: Option<Room>,
}

impl Link {
    /// Returns the [`Key`] identifying this [`Link`].
    #[must_use]
    pub fn key(&self) -> Key {
        Key {
            reservation_id: self.reservation_id,
            room_id: self.room_id,
        }
    }

    /// Indicates whether this [`Link`] still holds its [`Room`].
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state == State::Active
    }

    /// Whole amount of this [`Link`]: nightly price multiplied by nights.
    #[must_use]
    pub fn amount(&self) -> Money {
        self.price * self.stay.nights()
    }
}

/// Composite key of a [`Link`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Key {
    /// ID of the [`Reservation`] the [`Link`] belongs to.
    pub reservation_id: reservation::Id,

    /// ID of the booked [`Room`].
    pub room_id: room::Id,
}

/// Change of a [`Link`]'s [`State`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct StateChange {
    /// [`Key`] of the [`Link`] to change.
    pub key: Key,

    /// New [`State`] of the [`Link`].
    pub state: State,
}

define_kind! {
    #[doc = "State of a [`Link`]."]
    enum State {
        #[doc = "[`Link`] was cancelled and releases its [`Room`]."]
        Cancelled = 0,

        #[doc = "[`Link`] holds its [`Room`] for the stay."]
        Active = 1,
    }
}
