//! Availability-related read definitions.

use common::{Date, DateRange};

#[cfg(doc)]
use crate::domain::{availability::Occupancy, Reservation, Room};
use crate::domain::{reservation, room};

/// Selector of a stay in a single [`Room`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Stay {
    /// ID of the [`Room`].
    pub room_id: room::Id,

    /// Stay [`DateRange`].
    pub stay: DateRange,
}

/// Active booking of a non-cancelled [`Reservation`] colliding with a
/// [`Stay`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Conflict {
    /// ID of the colliding [`Reservation`].
    pub reservation_id: reservation::Id,

    /// Colliding stay.
    pub stay: DateRange,
}

/// Selector of the [`Occupancy`] of confirmed [`Reservation`]s touching the
/// `[from, to]` window.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Window {
    /// First day of the window.
    pub from: Date,

    /// Last day of the window.
    pub to: Date,
}
