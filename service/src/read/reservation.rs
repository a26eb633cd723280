//! [`Reservation`]-related read definitions.

use common::{Date, Money};
use derive_more::{Display, Error};

use crate::domain::{reservation, room, Reservation};

/// Selector of the active [`reservation::Link`]s of non-cancelled
/// [`Reservation`]s touching the `[from, to]` window, ordered by check-in.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct InRange {
    /// First day of the window.
    pub from: Date,

    /// Last day of the window.
    pub to: Date,
}

/// Fully resolved [`Reservation`] to be passed to a guest notification.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Summary {
    /// ID of the [`Reservation`].
    pub id: reservation::Id,

    /// Client owning the [`Reservation`].
    pub client_id: reservation::ClientId,

    /// Number of adult guests.
    pub adults: u16,

    /// Number of child guests.
    pub children: u16,

    /// Moment the [`Reservation`] was confirmed by the client.
    pub confirmed_at: reservation::ConfirmationDateTime,

    /// Subtotal of the [`Reservation`].
    pub subtotal: Money,

    /// Discount of the [`Reservation`].
    pub discount: Money,

    /// Amount to be paid.
    pub total: Money,

    /// Booked rooms.
    pub rooms: Vec<summary::Room>,
}

impl TryFrom<&Reservation> for Summary {
    type Error = UnresolvedRoom;

    fn try_from(r: &Reservation) -> Result<Self, Self::Error> {
        let rooms = r
            .active_rooms()
            .map(|l| {
                let room = l.room.as_ref().ok_or(UnresolvedRoom(l.room_id))?;
                Ok(summary::Room {
                    name: room.name.clone(),
                    number: room.number.clone(),
                    stay: l.stay,
                    price: l.price,
                    nights: l.stay.nights(),
                })
            })
            .collect::<Result<_, _>>()?;

        Ok(Self {
            id: r.id,
            client_id: r.header.client_id.clone(),
            adults: r.header.adults,
            children: r.header.children,
            confirmed_at: r.header.confirmed_at,
            subtotal: r.header.subtotal,
            discount: r.header.discount,
            total: r.total(),
            rooms,
        })
    }
}

pub mod summary {
    //! [`Summary`] definitions.

    use common::{DateRange, Money};

    use crate::domain::room;
    #[cfg(doc)]
    use crate::domain::Room as RoomEntity;

    #[cfg(doc)]
    use super::Summary;

    /// Booked room of a [`Summary`].
    #[derive(Clone, Debug, Eq, PartialEq)]
    pub struct Room {
        /// Name of the [`RoomEntity`].
        pub name: room::Name,

        /// Number of the [`RoomEntity`].
        pub number: room::Number,

        /// Stay in the [`RoomEntity`].
        pub stay: DateRange,

        /// Nightly price.
        pub price: Money,

        /// Number of nights.
        pub nights: u32,
    }
}

/// [`reservation::Link`] whose [`room::Room`] wasn't resolved.
#[derive(Clone, Copy, Debug, Display, Error)]
#[display("`Room(id: {_0})` of the reservation is not resolved")]
pub struct UnresolvedRoom(#[error(not(source))] pub room::Id);

