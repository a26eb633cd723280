//! Validation and pricing of a new [`Reservation`].

use std::collections::BTreeSet;

use common::{Date, DateRange, Money};
use derive_more::{Display, Error};

#[cfg(doc)]
use crate::domain::Reservation;
use crate::domain::{reservation, room};

use super::{ClientId, ConfirmationDateTime, Header, State};

/// Unvalidated request for a new [`Reservation`].
#[derive(Clone, Debug)]
pub struct Request {
    /// Raw identifier of the client making the [`Reservation`].
    pub client_id: String,

    /// Number of adult guests.
    pub adults: u16,

    /// Number of child guests.
    pub children: u16,

    /// Requested discount, if any.
    ///
    /// Negative values are treated as no discount.
    pub discount: Option<Money>,

    /// Moment the client confirmed the [`Reservation`], if known.
    ///
    /// Defaults to the moment of creation.
    pub confirmed_at: Option<ConfirmationDateTime>,

    /// Initial [`State`] of the [`Reservation`].
    ///
    /// Defaults to [`State::Pending`].
    pub state: Option<State>,

    /// Rooms to be booked.
    pub rooms: Vec<RoomRequest>,
}

/// Request for booking a single room as part of a [`Request`].
#[derive(Clone, Copy, Debug)]
pub struct RoomRequest {
    /// ID of the room to book.
    pub room_id: room::Id,

    /// Nightly price of the room.
    pub price: Money,

    /// [`Date`] of arrival.
    pub check_in: Date,

    /// [`Date`] of departure.
    pub check_out: Date,
}

impl Request {
    /// Validates this [`Request`] without touching any storage.
    ///
    /// # Errors
    ///
    /// With a [`BuildError`] describing the first violated rule.
    pub fn validate(self) -> Result<Booking, BuildError> {
        use BuildError as E;

        let Self {
            client_id,
            adults,
            children,
            discount,
            confirmed_at,
            state,
            rooms,
        } = self;

        if rooms.is_empty() {
            return Err(E::EmptyBooking);
        }
        let client_id = ClientId::new(client_id).ok_or(E::EmptyClient)?;
        let state = state.unwrap_or(State::Pending);
        if !matches!(state, State::Pending | State::Confirmed) {
            return Err(E::InvalidInitialState(state));
        }

        let mut seen = BTreeSet::new();
        let rooms = rooms
            .into_iter()
            .map(|r| {
                let stay = DateRange::new(r.check_in, r.check_out)
                    .ok_or(E::InvalidDateRange(r.room_id))?;
                if !r.price.is_positive() || !r.price.is_storable() {
                    return Err(E::InvalidPrice(r.room_id));
                }
                if !seen.insert(r.room_id) {
                    return Err(E::DuplicateRoom(r.room_id));
                }
                Ok(BookedRoom {
                    room_id: r.room_id,
                    price: r.price,
                    stay,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let discount =
            discount.filter(|d| !d.is_negative()).unwrap_or_default();
        if !discount.is_storable() {
            return Err(E::InvalidDiscount(discount));
        }

        let subtotal = rooms
            .iter()
            .try_fold(Money::ZERO, |sum, r| sum.checked_add(r.amount()?))
            .filter(|s| s.is_storable())
            .ok_or(E::SubtotalOutOfRange)?;

        Ok(Booking {
            client_id,
            adults,
            children,
            subtotal,
            discount,
            confirmed_at,
            state,
            rooms,
        })
    }
}

/// Validated [`Request`], whose rooms are not yet checked for availability.
#[derive(Clone, Debug)]
pub struct Booking {
    /// Validated [`ClientId`].
    client_id: ClientId,

    /// Number of adult guests.
    adults: u16,

    /// Number of child guests.
    children: u16,

    /// Sum of every room's nightly price multiplied by its nights.
    subtotal: Money,

    /// Non-negative discount.
    discount: Money,

    /// Moment of confirmation, if known.
    confirmed_at: Option<ConfirmationDateTime>,

    /// Initial [`State`].
    state: State,

    /// Booked rooms, each being unique.
    rooms: Vec<BookedRoom>,
}

impl Booking {
    /// Returns the booked rooms of this [`Booking`].
    #[must_use]
    pub fn rooms(&self) -> &[BookedRoom] {
        &self.rooms
    }

    /// Returns IDs of the booked rooms in ascending order.
    #[must_use]
    pub fn room_ids(&self) -> Vec<room::Id> {
        let mut ids: Vec<_> = self.rooms.iter().map(|r| r.room_id).collect();
        ids.sort_unstable();
        ids
    }

    /// Returns subtotal of this [`Booking`]: every room's nightly price
    /// multiplied by its nights.
    #[must_use]
    pub fn subtotal(&self) -> Money {
        self.subtotal
    }

    /// Prices this [`Booking`], producing the [`Header`] to be stored along
    /// with its rooms.
    ///
    /// The `now` is used when no confirmation moment was requested.
    ///
    /// # Errors
    ///
    /// With [`BuildError::DiscountExceedsSubtotal`] if the discount is bigger
    /// than the computed subtotal.
    pub fn finish(
        self,
        now: ConfirmationDateTime,
    ) -> Result<(Header, Vec<BookedRoom>), BuildError> {
        let subtotal = self.subtotal;
        if self.discount > subtotal {
            return Err(BuildError::DiscountExceedsSubtotal {
                discount: self.discount,
                subtotal,
            });
        }

        let header = Header {
            client_id: self.client_id,
            adults: self.adults,
            children: self.children,
            subtotal,
            discount: self.discount,
            confirmed_at: self.confirmed_at.unwrap_or(now),
            state: self.state,
        };
        Ok((header, self.rooms))
    }
}

/// Single validated room of a [`Booking`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BookedRoom {
    /// ID of the booked room.
    pub room_id: room::Id,

    /// Nightly price of the room.
    pub price: Money,

    /// Stay [`DateRange`].
    pub stay: DateRange,
}

impl BookedRoom {
    /// Nightly price multiplied by the nights of the stay, if it doesn't
    /// overflow.
    #[must_use]
    pub fn amount(&self) -> Option<Money> {
        self.price.checked_mul(self.stay.nights())
    }

    /// Turns this [`BookedRoom`] into an active [`reservation::Link`] of the
    /// provided [`Reservation`].
    #[must_use]
    pub fn into_link(self, reservation_id: reservation::Id) -> reservation::Link {
        reservation::Link {
            reservation_id,
            room_id: self.room_id,
            price: self.price,
            stay: self.stay,
            state: reservation::link::State::Active,
            room: None,
        }
    }
}

/// Error of validating or pricing a [`Request`].
#[derive(Clone, Copy, Debug, Display, Error)]
pub enum BuildError {
    /// Discount is bigger than the subtotal.
    #[display("discount {discount} exceeds subtotal {subtotal}")]
    DiscountExceedsSubtotal {
        /// Requested discount.
        discount: Money,

        /// Computed subtotal.
        subtotal: Money,
    },

    /// The same room is requested more than once.
    #[display("`Room(id: {_0})` is requested more than once")]
    DuplicateRoom(#[error(not(source))] room::Id),

    /// No rooms are requested.
    #[display("no rooms are requested")]
    EmptyBooking,

    /// Client identifier is empty or malformed.
    #[display("client identifier is empty or malformed")]
    EmptyClient,

    /// Check-out is not after check-in.
    #[display("check-out of `Room(id: {_0})` is not after its check-in")]
    InvalidDateRange(#[error(not(source))] room::Id),

    /// Initial state is neither pending nor confirmed.
    #[display("`{_0}` cannot be an initial reservation state")]
    InvalidInitialState(#[error(not(source))] State),

    /// Discount has more decimal places than stored or is too big.
    #[display("discount {_0} is not a storable amount")]
    InvalidDiscount(#[error(not(source))] Money),

    /// Nightly price is not positive, has more decimal places than stored or
    /// is too big.
    #[display("price of `Room(id: {_0})` is not a positive storable amount")]
    InvalidPrice(#[error(not(source))] room::Id),

    /// Subtotal exceeds the biggest storable amount.
    #[display("subtotal exceeds the biggest storable amount")]
    SubtotalOutOfRange,
}

#[cfg(test)]
mod spec {
    use common::{Date, DateTime, Money};

    use crate::domain::{reservation::State, room};

    use super::{BuildError, Request, RoomRequest};

    fn date(s: &str) -> Date {
        s.parse().unwrap()
    }

    fn room(id: i32, price: u32, check_in: &str, check_out: &str) -> RoomRequest {
        RoomRequest {
            room_id: room::Id::from(id),
            price: Money::from(price),
            check_in: date(check_in),
            check_out: date(check_out),
        }
    }

    fn request(rooms: Vec<RoomRequest>) -> Request {
        Request {
            client_id: "client-1".into(),
            adults: 2,
            children: 1,
            discount: None,
            confirmed_at: None,
            state: None,
            rooms,
        }
    }

    #[test]
    fn rejects_empty_booking_first() {
        let mut req = request(vec![]);
        req.client_id = String::new();
        req.state = Some(State::Completed);

        assert!(matches!(req.validate(), Err(BuildError::EmptyBooking)));
    }

    #[test]
    fn rejects_empty_client() {
        let mut req = request(vec![room(1, 100, "2024-06-01", "2024-06-03")]);
        req.client_id = "  ".into();

        assert!(matches!(req.validate(), Err(BuildError::EmptyClient)));
    }

    #[test]
    fn rejects_non_increasing_dates() {
        for check_out in ["2024-06-01", "2024-05-30"] {
            let req = request(vec![
                room(1, 100, "2024-06-01", "2024-06-03"),
                room(2, 100, "2024-06-01", check_out),
            ]);

            assert!(matches!(
                req.validate(),
                Err(BuildError::InvalidDateRange(id)) if id == room::Id::from(2),
            ));
        }
    }

    #[test]
    fn rejects_non_positive_price() {
        for price in ["0", "-10"] {
            let mut r = room(3, 1, "2024-06-01", "2024-06-03");
            r.price = price.parse().unwrap();

            assert!(matches!(
                request(vec![r]).validate(),
                Err(BuildError::InvalidPrice(id)) if id == room::Id::from(3),
            ));
        }
    }

    #[test]
    fn rejects_price_not_fitting_storage() {
        for price in [
            "33.333",
            "0.001",
            "10000000000",
            "79228162514264337593543950335",
        ] {
            let mut r = room(4, 1, "2024-06-01", "2024-06-03");
            r.price = price.parse().unwrap();

            assert!(
                matches!(
                    request(vec![r]).validate(),
                    Err(BuildError::InvalidPrice(id)) if id == room::Id::from(4),
                ),
                "{price}",
            );
        }
    }

    #[test]
    fn rejects_discount_not_fitting_storage() {
        let mut req = request(vec![room(1, 100, "2024-06-01", "2024-06-03")]);
        req.discount = Some("0.005".parse().unwrap());

        assert!(matches!(req.clone().validate(), Err(BuildError::InvalidDiscount(_))));

        req.discount = Some("-0.005".parse().unwrap());
        assert_eq!(req.validate().unwrap().subtotal(), Money::from(200));
    }

    #[test]
    fn rejects_subtotal_not_fitting_storage() {
        let mut r = room(1, 1, "2024-06-01", "2024-06-03");
        r.price = Money::MAX;

        assert!(matches!(
            request(vec![r]).validate(),
            Err(BuildError::SubtotalOutOfRange),
        ));

        let mut other = room(2, 1, "2024-06-01", "2024-06-02");
        other.price = Money::MAX;
        let mut one_night = room(3, 1, "2024-06-01", "2024-06-02");
        one_night.price = "0.01".parse().unwrap();
        assert!(matches!(
            request(vec![other, one_night]).validate(),
            Err(BuildError::SubtotalOutOfRange),
        ));
    }

    #[test]
    fn keeps_subtotal_exact_to_cents() {
        let mut r = room(1, 1, "2024-06-01", "2024-06-03");
        r.price = "33.33".parse().unwrap();

        let booking = request(vec![r]).validate().unwrap();
        assert_eq!(booking.subtotal(), "66.66".parse().unwrap());
        assert_eq!(
            booking.rooms()[0].amount(),
            Some(booking.subtotal()),
        );
    }

    #[test]
    fn rejects_duplicate_room() {
        let req = request(vec![
            room(1, 100, "2024-06-01", "2024-06-03"),
            room(1, 100, "2024-06-05", "2024-06-07"),
        ]);

        assert!(matches!(
            req.validate(),
            Err(BuildError::DuplicateRoom(id)) if id == room::Id::from(1),
        ));
    }

    #[test]
    fn rejects_terminal_initial_state() {
        for state in [State::Cancelled, State::Completed] {
            let mut req =
                request(vec![room(1, 100, "2024-06-01", "2024-06-03")]);
            req.state = Some(state);

            assert!(matches!(
                req.validate(),
                Err(BuildError::InvalidInitialState(s)) if s == state,
            ));
        }
    }

    #[test]
    fn computes_subtotal_and_total() {
        let mut req = request(vec![
            room(1, 100, "2024-06-01", "2024-06-03"),
            room(2, 50, "2024-06-01", "2024-06-03"),
        ]);
        req.discount = Some(Money::from(50));

        let booking = req.validate().unwrap();
        assert_eq!(booking.subtotal(), Money::from(300));

        let now = DateTime::now().coerce();
        let (header, rooms) = booking.finish(now).unwrap();
        assert_eq!(header.subtotal, Money::from(300));
        assert_eq!(header.discount, Money::from(50));
        assert_eq!(header.total(), Money::from(250));
        assert_eq!(header.state, State::Pending);
        assert_eq!(header.confirmed_at, now);
        assert_eq!(rooms.len(), 2);
    }

    #[test]
    fn clamps_negative_discount() {
        let mut req = request(vec![room(1, 100, "2024-06-01", "2024-06-02")]);
        req.discount = Some("-20".parse().unwrap());

        let (header, _) =
            req.validate().unwrap().finish(DateTime::now().coerce()).unwrap();
        assert_eq!(header.discount, Money::ZERO);
        assert_eq!(header.total(), Money::from(100));
    }

    #[test]
    fn rejects_discount_over_subtotal() {
        let mut req = request(vec![room(1, 100, "2024-06-01", "2024-06-02")]);
        req.discount = Some(Money::from(101));

        let booking = req.validate().unwrap();
        assert!(matches!(
            booking.finish(DateTime::now().coerce()),
            Err(BuildError::DiscountExceedsSubtotal { discount, subtotal })
                if discount == Money::from(101)
                    && subtotal == Money::from(100),
        ));
    }

    #[test]
    fn accepts_discount_equal_to_subtotal() {
        let mut req = request(vec![room(1, 100, "2024-06-01", "2024-06-02")]);
        req.discount = Some(Money::from(100));

        let (header, _) =
            req.validate().unwrap().finish(DateTime::now().coerce()).unwrap();
        assert_eq!(header.total(), Money::ZERO);
    }

    #[test]
    fn orders_room_ids_ascending() {
        let req = request(vec![
            room(7, 100, "2024-06-01", "2024-06-02"),
            room(2, 100, "2024-06-01", "2024-06-02"),
            room(5, 100, "2024-06-01", "2024-06-02"),
        ]);

        let ids: Vec<i32> = req
            .validate()
            .unwrap()
            .room_ids()
            .into_iter()
            .map(Into::into)
            .collect();
        assert_eq!(ids, [2, 5, 7]);
    }
}
