//! [`Reservation`]-related definitions.

use common::{Date, DateTime, Money};
use derive_more::{Display, From, Into};
use juniper::{
    graphql_object, GraphQLEnum, GraphQLInputObject, GraphQLObject,
    GraphQLScalar,
};
use service::domain::{self, availability, reservation::link};

use crate::{api, Context};

/// A reservation of one or more hotel rooms.
#[derive(Clone, Debug, From)]
pub struct Reservation(domain::Reservation);

/// A reservation of one or more hotel rooms.
#[graphql_object(context = Context)]
impl Reservation {
    /// Unique identifier of this `Reservation`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Reservation.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// Identifier of the client owning this `Reservation`.
    pub fn client_id(&self) -> &str {
        self.0.header.client_id.as_ref()
    }

    /// Number of adult guests.
    pub fn adults(&self) -> i32 {
        self.0.header.adults.into()
    }

    /// Number of child guests.
    pub fn children(&self) -> i32 {
        self.0.header.children.into()
    }

    /// `DateTime` when the client confirmed this `Reservation`.
    pub fn confirmed_at(&self) -> DateTime {
        self.0.header.confirmed_at.coerce()
    }

    /// Lifecycle state of this `Reservation`.
    pub fn state(&self) -> State {
        self.0.state().into()
    }

    /// Sum of the amounts of all the booked rooms.
    pub fn subtotal(&self) -> Money {
        self.0.header.subtotal
    }

    /// Discount applied to the `subtotal`.
    pub fn discount(&self) -> Money {
        self.0.header.discount
    }

    /// Amount to be paid: `subtotal` minus `discount`.
    pub fn total(&self) -> Money {
        self.0.total()
    }

    /// Rooms booked by this `Reservation`, including the cancelled ones.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Reservation.rooms",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn rooms(&self) -> Vec<Booking> {
        self.0.rooms.iter().cloned().map(Into::into).collect()
    }
}

/// Booking of a single room for a stay, as part of a `Reservation`.
#[derive(Clone, Debug, From)]
pub struct Booking(domain::reservation::Link);

/// Booking of a single room for a stay, as part of a `Reservation`.
#[graphql_object(name = "ReservationRoom", context = Context)]
impl Booking {
    /// ID of the `Reservation` this booking belongs to.
    pub fn reservation_id(&self) -> Id {
        self.0.reservation_id.into()
    }

    /// ID of the booked `Room`.
    pub fn room_id(&self) -> api::room::Id {
        self.0.room_id.into()
    }

    /// Booked `Room`.
    ///
    /// `null` if the `Room` is unknown anymore.
    pub fn room(&self) -> Option<api::Room> {
        self.0.room.clone().map(Into::into)
    }

    /// `Date` of arrival.
    pub fn check_in(&self) -> Date {
        self.0.stay.check_in()
    }

    /// `Date` of departure.
    pub fn check_out(&self) -> Date {
        self.0.stay.check_out()
    }

    /// Number of nights of the stay.
    pub fn nights(&self) -> i32 {
        i32::try_from(self.0.stay.nights()).unwrap_or(i32::MAX)
    }

    /// Nightly price of the booked `Room`.
    pub fn price(&self) -> Money {
        self.0.price
    }

    /// Nightly price multiplied by the number of nights.
    pub fn amount(&self) -> Money {
        self.0.amount()
    }

    /// State of this booking.
    pub fn state(&self) -> BookingState {
        self.0.state.into()
    }
}

/// Unique identifier of a `Reservation`.
#[derive(Clone, Copy, Debug, Display, Into, From, GraphQLScalar)]
#[from(domain::reservation::Id)]
#[into(domain::reservation::Id)]
#[graphql(name = "ReservationId", transparent)]
pub struct Id(i32);

/// Lifecycle state of a `Reservation`.
#[derive(Clone, Copy, Debug, GraphQLEnum)]
#[graphql(name = "ReservationState")]
pub enum State {
    /// `Reservation` is created, but not confirmed yet.
    Pending,

    /// `Reservation` is confirmed.
    Confirmed,

    /// `Reservation` is cancelled and its rooms are released.
    Cancelled,

    /// Guests have stayed and checked out.
    Completed,
}

impl From<domain::reservation::State> for State {
    fn from(state: domain::reservation::State) -> Self {
        use domain::reservation::State as S;

        match state {
            S::Pending => Self::Pending,
            S::Confirmed => Self::Confirmed,
            S::Cancelled => Self::Cancelled,
            S::Completed => Self::Completed,
        }
    }
}

/// State of a `ReservationRoom`.
#[derive(Clone, Copy, Debug, GraphQLEnum)]
#[graphql(name = "ReservationRoomState")]
pub enum BookingState {
    /// Booking holds its `Room`.
    Active,

    /// Booking is cancelled and releases its `Room`.
    Cancelled,
}

impl From<link::State> for BookingState {
    fn from(state: link::State) -> Self {
        match state {
            link::State::Active => Self::Active,
            link::State::Cancelled => Self::Cancelled,
        }
    }
}

/// Request for a new `Reservation`.
#[derive(Clone, Debug, GraphQLInputObject)]
#[graphql(name = "ReservationInput")]
pub struct NewReservation {
    /// Identifier of the client making the `Reservation`.
    pub client_id: String,

    /// Number of adult guests.
    pub adults: i32,

    /// Number of child guests.
    pub children: i32,

    /// `Room`s to be booked.
    pub rooms: Vec<BookingInput>,

    /// Discount to apply to the subtotal, if any.
    ///
    /// Negative values are treated as no discount.
    pub discount: Option<Money>,

    /// Initial state, named exactly like `Pending` or `Confirmed`.
    ///
    /// Defaults to `Pending`.
    pub state: Option<String>,

    /// `DateTime` when the client confirmed the `Reservation`.
    ///
    /// Defaults to the moment of creation.
    pub confirmed_at: Option<DateTime>,
}

/// Request for booking a single `Room`.
#[derive(Clone, Copy, Debug, GraphQLInputObject)]
#[graphql(name = "ReservationRoomInput")]
pub struct BookingInput {
    /// ID of the `Room` to book.
    pub room_id: api::room::Id,

    /// Nightly price of the `Room`.
    pub price: Money,

    /// `Date` of arrival.
    pub check_in: Date,

    /// `Date` of departure.
    pub check_out: Date,
}

impl From<BookingInput> for domain::reservation::request::RoomRequest {
    fn from(input: BookingInput) -> Self {
        Self {
            room_id: input.room_id.into(),
            price: input.price,
            check_in: input.check_in,
            check_out: input.check_out,
        }
    }
}

/// Availability of the hotel on a single `Date`.
#[derive(Clone, Copy, Debug, GraphQLObject)]
#[graphql(name = "DayAvailability")]
pub struct Day {
    /// Calendar `Date`.
    pub date: Date,

    /// Indicator whether at least one `Room` is free.
    pub is_available: bool,

    /// Number of free `Room`s.
    pub rooms_free: i32,
}

impl From<availability::Day> for Day {
    fn from(day: availability::Day) -> Self {
        Self {
            date: day.date,
            is_available: day.is_available(),
            rooms_free: i32::try_from(day.rooms_free).unwrap_or(i32::MAX),
        }
    }
}
