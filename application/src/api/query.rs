//! GraphQL [`Query`]s definitions.

use common::Date;
use juniper::graphql_object;
use service::{domain, query, Query as _};

use crate::{api, define_error, AsError, Context, Error};

/// Root of all GraphQL queries.
#[derive(Clone, Copy, Debug)]
pub struct Query;

impl Query {
    /// Name of the [`tracing::Span`] for the queries.
    pub(crate) const SPAN_NAME: &'static str = "GraphQL query";
}

#[graphql_object(context = Context)]
impl Query {
    /// Returns all the hotel `Room`s, ordered by their IDs.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "rooms",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn rooms(ctx: &Context) -> Result<Vec<api::Room>, Error> {
        ctx.service()
            .execute(query::room::All::by(()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|rooms| rooms.into_iter().map(Into::into).collect())
    }

    /// Returns all the `RoomType`s, ordered by their IDs.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "roomTypes",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn room_types(ctx: &Context) -> Result<Vec<api::RoomType>, Error> {
        ctx.service()
            .execute(query::room::Types::by(()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|types| types.into_iter().map(Into::into).collect())
    }

    /// Returns all the `Amenity`s offered by the hotel, ordered by their IDs.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "amenities",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn amenities(ctx: &Context) -> Result<Vec<api::Amenity>, Error> {
        ctx.service()
            .execute(query::amenity::All::by(()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|amenities| amenities.into_iter().map(Into::into).collect())
    }

    /// Returns all the submitted `Contact`s, the most recent first.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "contacts",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn contacts(ctx: &Context) -> Result<Vec<api::Contact>, Error> {
        ctx.service()
            .execute(query::contact::All::by(()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|contacts| contacts.into_iter().map(Into::into).collect())
    }

    /// Returns the `Room`s in service nobody occupies between the provided
    /// `checkIn` and `checkOut` dates.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_DATE_RANGE` - `checkOut` is not after `checkIn`;
    /// - `DATE_IN_PAST` - `checkIn` is earlier than today.
    #[tracing::instrument(
        skip_all,
        fields(
            check_in = %check_in,
            check_out = %check_out,
            gql.name = "availableRooms",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn available_rooms(
        check_in: Date,
        check_out: Date,
        ctx: &Context,
    ) -> Result<Vec<api::Room>, Error> {
        ctx.service()
            .execute(query::AvailableRooms {
                check_in,
                check_out,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|rooms| rooms.into_iter().map(Into::into).collect())
    }

    /// Returns the `Date`s between `from` and `to` (both inclusive) when no
    /// `Room` is free.
    ///
    /// If `to` is omitted, the configured number of months since `from` is
    /// looked up.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_DATE_RANGE` - `to` is before `from`;
    /// - `DATE_RANGE_TOO_LONG` - the window spans more than the configured
    ///   maximum of months;
    /// - `DATE_IN_PAST` - `from` is earlier than today.
    #[tracing::instrument(
        skip_all,
        fields(
            from = %from,
            gql.name = "blockedDates",
            otel.name = Self::SPAN_NAME,
            to = ?to.map(|d| d.to_string()),
        ),
    )]
    pub async fn blocked_dates(
        from: Date,
        to: Option<Date>,
        ctx: &Context,
    ) -> Result<Vec<Date>, Error> {
        ctx.service()
            .execute(query::BlockedDates { from, to })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
    }

    /// Returns the availability of every `Date` between `from` and `to`
    /// (both inclusive).
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_DATE_RANGE` - `to` is before `from`;
    /// - `DATE_RANGE_TOO_LONG` - the window spans more than the configured
    ///   maximum of months;
    /// - `DATE_IN_PAST` - `from` is earlier than today.
    #[tracing::instrument(
        skip_all,
        fields(
            from = %from,
            gql.name = "availabilityByDate",
            otel.name = Self::SPAN_NAME,
            to = ?to.map(|d| d.to_string()),
        ),
    )]
    pub async fn availability_by_date(
        from: Date,
        to: Option<Date>,
        ctx: &Context,
    ) -> Result<Vec<api::reservation::Day>, Error> {
        ctx.service()
            .execute(query::DailyAvailability { from, to })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|days| days.into_iter().map(Into::into).collect())
    }

    /// Checks whether the `Room` is free between the provided `checkIn` and
    /// `checkOut` dates.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_DATE_RANGE` - `checkOut` is not after `checkIn`;
    /// - `ROOM_NOT_EXISTS` - the `Room` with the specified ID does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            check_in = %check_in,
            check_out = %check_out,
            gql.name = "roomAvailability",
            otel.name = Self::SPAN_NAME,
            room_id = %room_id,
        ),
    )]
    pub async fn room_availability(
        room_id: api::room::Id,
        check_in: Date,
        check_out: Date,
        ctx: &Context,
    ) -> Result<bool, Error> {
        ctx.service()
            .execute(query::CheckAvailability {
                room_id: room_id.into(),
                check_in,
                check_out,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
    }

    /// Returns the `Reservation` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `RESERVATION_NOT_EXISTS` - the `Reservation` with the specified ID
    ///                              does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "reservation",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn reservation(
        id: api::reservation::Id,
        ctx: &Context,
    ) -> Result<api::Reservation, Error> {
        ctx.service()
            .execute(query::reservation::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| ReservationError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns the `Reservation`s of the client, the most recently confirmed
    /// first.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_CLIENT_ID` - the `clientId` is empty or malformed.
    #[tracing::instrument(
        skip_all,
        fields(
            client_id = %client_id,
            gql.name = "clientReservations",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn client_reservations(
        client_id: String,
        ctx: &Context,
    ) -> Result<Vec<api::Reservation>, Error> {
        let client_id = domain::reservation::ClientId::new(client_id)
            .ok_or_else(|| api::InputError::InvalidClientId.into())
            .map_err(ctx.error())?;

        ctx.service()
            .execute(query::reservation::ForClient::by(client_id))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|rs| rs.into_iter().map(Into::into).collect())
    }

    /// Returns the active room bookings touching the `from`-`to` window
    /// (both inclusive), ordered by check-in.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_DATE_RANGE` - `to` is not after `from`.
    #[tracing::instrument(
        skip_all,
        fields(
            from = %from,
            gql.name = "reservationsInRange",
            otel.name = Self::SPAN_NAME,
            to = %to,
        ),
    )]
    pub async fn reservations_in_range(
        from: Date,
        to: Date,
        ctx: &Context,
    ) -> Result<Vec<api::reservation::Booking>, Error> {
        ctx.service()
            .execute(query::ReservationsInRange { from, to })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|links| links.into_iter().map(Into::into).collect())
    }
}

define_error! {
    enum ReservationError {
        #[code = "RESERVATION_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Reservation` with the specified ID does not exist"]
        NotExists,
    }
}

define_error! {
    enum RoomError {
        #[code = "ROOM_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Room` with the specified ID does not exist"]
        NotExists,
    }
}

define_error! {
    enum RangeError {
        #[code = "DATE_IN_PAST"]
        #[status = BAD_REQUEST]
        #[message = "Dates cannot be in the past"]
        DateInPast,

        #[code = "INVALID_DATE_RANGE"]
        #[status = BAD_REQUEST]
        #[message = "Date range is empty or inverted"]
        Invalid,

        #[code = "DATE_RANGE_TOO_LONG"]
        #[status = BAD_REQUEST]
        #[message = "Date range spans too many months"]
        TooLong,
    }
}

impl AsError for query::available_rooms::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::DateInPast => Some(RangeError::DateInPast.into()),
            Self::Db(e) => e.try_as_error(),
            Self::InvalidRange => Some(RangeError::Invalid.into()),
        }
    }
}

impl AsError for query::calendar::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::DateInPast => Some(RangeError::DateInPast.into()),
            Self::Db(e) => e.try_as_error(),
            Self::InvalidRange => Some(RangeError::Invalid.into()),
            Self::WindowTooLong(_) => {
                Some(Error::from(RangeError::TooLong).with_message(self))
            }
        }
    }
}

impl AsError for query::check_availability::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::InvalidRange => Some(RangeError::Invalid.into()),
            Self::RoomNotExists(_) => Some(RoomError::NotExists.into()),
        }
    }
}

impl AsError for query::reservations_in_range::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::InvalidRange => Some(RangeError::Invalid.into()),
        }
    }
}

#[cfg(test)]
mod spec {
    use service::query::calendar::ExecutionError;

    use crate::AsError as _;

    #[test]
    fn too_long_window_names_limit() {
        let err = ExecutionError::WindowTooLong(12).as_error();

        assert_eq!(err.code, "DATE_RANGE_TOO_LONG");
        assert_eq!(err.status_code, http::StatusCode::BAD_REQUEST);
        assert!(err.message.contains("12 months"), "{}", err.message);
    }
}
