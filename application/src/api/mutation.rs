//! GraphQL [`Mutation`]s definitions.

use common::DateTime;
use juniper::graphql_object;
use service::{
    command,
    domain::{self, reservation::request::BuildError},
    Command as _,
};

use crate::{api, define_error, AsError, Context, Error};

use super::query::{RangeError, ReservationError, RoomError};

/// Root of all GraphQL mutations.
#[derive(Clone, Copy, Debug)]
pub struct Mutation;

impl Mutation {
    /// Name of the [`tracing::Span`] for the mutations.
    const SPAN_NAME: &'static str = "GraphQL mutation";
}

#[graphql_object(context = Context)]
impl Mutation {
    /// Creates a new `Reservation` of the provided `rooms`.
    ///
    /// Either every `Room` is booked or none is.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `EMPTY_BOOKING` - no `rooms` are provided;
    /// - `EMPTY_CLIENT` - the `clientId` is empty or malformed;
    /// - `NEGATIVE_GUEST_COUNT` - `adults` or `children` is negative;
    /// - `INVALID_STATE` - the `state` is not a valid `ReservationState`;
    /// - `INVALID_INITIAL_STATE` - the `state` is neither `Pending` nor
    ///                             `Confirmed`;
    /// - `INVALID_DATE_RANGE` - a `checkOut` is not after its `checkIn`;
    /// - `INVALID_PRICE` - a nightly price is not positive, has more than 2
    ///                     decimal places or exceeds `9999999999.99`;
    /// - `INVALID_DISCOUNT` - the `discount` has more than 2 decimal places
    ///                        or exceeds `9999999999.99`;
    /// - `SUBTOTAL_OUT_OF_RANGE` - the subtotal exceeds `9999999999.99`;
    /// - `DUPLICATE_ROOM` - the same `Room` is requested more than once;
    /// - `DISCOUNT_EXCEEDS_SUBTOTAL` - the `discount` exceeds the subtotal;
    /// - `ROOM_NOT_EXISTS` - a requested `Room` does not exist;
    /// - `ROOM_UNAVAILABLE` - a requested `Room` is booked for the stay.
    #[tracing::instrument(
        skip_all,
        fields(
            adults = %reservation.adults,
            children = %reservation.children,
            client_id = %reservation.client_id,
            gql.name = "createReservation",
            otel.name = Self::SPAN_NAME,
            rooms = reservation.rooms.len(),
            state = ?reservation.state,
        ),
    )]
    pub async fn create_reservation(
        reservation: api::reservation::NewReservation,
        ctx: &Context,
    ) -> Result<api::Reservation, Error> {
        let api::reservation::NewReservation {
            client_id,
            adults,
            children,
            rooms,
            discount,
            state,
            confirmed_at,
        } = reservation;

        let guests = |count: i32| {
            u16::try_from(count)
                .map_err(|_| api::InputError::NegativeGuestCount.into())
                .map_err(ctx.error())
        };
        let (adults, children) = (guests(adults)?, guests(children)?);
        let state = state
            .as_deref()
            .map(domain::reservation::State::parse)
            .transpose()
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;

        ctx.service()
            .execute(command::CreateReservation(domain::reservation::Request {
                client_id,
                adults,
                children,
                discount,
                confirmed_at: confirmed_at.map(DateTime::coerce),
                state,
                rooms: rooms.into_iter().map(Into::into).collect(),
            }))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Moves the `Reservation` into the provided `state`, named exactly like
    /// `Pending`, `Confirmed`, `Cancelled` or `Completed`.
    ///
    /// Moving into the current state changes nothing.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_STATE` - the `state` is not a valid `ReservationState`;
    /// - `INVALID_TRANSITION` - the `Reservation` cannot move into the
    ///                          `state`;
    /// - `RESERVATION_NOT_EXISTS` - the `Reservation` with the specified ID
    ///                              does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "updateReservationState",
            id = %id,
            notify = ?notify,
            otel.name = Self::SPAN_NAME,
            state = %state,
        ),
    )]
    pub async fn update_reservation_state(
        id: api::reservation::Id,
        state: String,
        notify: Option<bool>,
        ctx: &Context,
    ) -> Result<api::Reservation, Error> {
        let state = domain::reservation::State::parse(&state)
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;

        ctx.service()
            .execute(command::UpdateReservationState {
                reservation_id: id.into(),
                state,
                notify: notify.unwrap_or(true),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Cancels the `Reservation` and all its room bookings.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_TRANSITION` - the `Reservation` is completed already;
    /// - `RESERVATION_NOT_EXISTS` - the `Reservation` with the specified ID
    ///                              does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "cancelReservation",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn cancel_reservation(
        id: api::reservation::Id,
        ctx: &Context,
    ) -> Result<api::Reservation, Error> {
        ctx.service()
            .execute(command::CancelReservation(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Confirms the `Reservation`, notifying its guests unless `notify` is
    /// `false`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_TRANSITION` - the `Reservation` is not pending;
    /// - `RESERVATION_NOT_EXISTS` - the `Reservation` with the specified ID
    ///                              does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "confirmReservation",
            id = %id,
            notify = ?notify,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn confirm_reservation(
        id: api::reservation::Id,
        notify: Option<bool>,
        ctx: &Context,
    ) -> Result<api::Reservation, Error> {
        ctx.service()
            .execute(command::ConfirmReservation {
                reservation_id: id.into(),
                notify: notify.unwrap_or(true),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Completes the confirmed `Reservation`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_TRANSITION` - the `Reservation` is not confirmed;
    /// - `RESERVATION_NOT_EXISTS` - the `Reservation` with the specified ID
    ///                              does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "completeReservation",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn complete_reservation(
        id: api::reservation::Id,
        ctx: &Context,
    ) -> Result<api::Reservation, Error> {
        ctx.service()
            .execute(command::CompleteReservation(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Submits the contact form, notifying the staff.
    ///
    /// Blank `phone` and `message` are treated as omitted.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_CONTACT_NAME` - the `name` has less than 3 or more than 100
    ///                            characters;
    /// - `INVALID_CONTACT_EMAIL` - the `email` is malformed or too long;
    /// - `INVALID_CONTACT_PHONE` - the `phone` is malformed.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "submitContact",
            has_message = contact.message.is_some(),
            has_phone = contact.phone.is_some(),
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn submit_contact(
        contact: api::contact::NewContact,
        ctx: &Context,
    ) -> Result<api::Contact, Error> {
        ctx.service()
            .execute(command::SubmitContact(contact.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Moves the `Contact` into the provided `state`, named exactly like
    /// `New`, `InProgress`, `Answered` or `Closed`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_CONTACT_STATE` - the `state` is not a valid `ContactState`;
    /// - `CONTACT_NOT_EXISTS` - the `Contact` with the specified ID does not
    ///                          exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "updateContactState",
            id = %id,
            otel.name = Self::SPAN_NAME,
            state = %state,
        ),
    )]
    pub async fn update_contact_state(
        id: api::contact::Id,
        state: String,
        ctx: &Context,
    ) -> Result<api::Contact, Error> {
        let state = domain::contact::State::parse(&state)
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;

        ctx.service()
            .execute(command::UpdateContactState {
                contact_id: id.into(),
                state,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }
}

impl AsError for command::create_reservation::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "ROOM_UNAVAILABLE"]
                #[status = CONFLICT]
                #[message = "Requested `Room` is booked for the stay already"]
                RoomUnavailable,
            }
        }

        match self {
            Self::Build(e) => e.try_as_error(),
            Self::Db(e) => e.try_as_error(),
            Self::RoomNotExists(_) => Some(RoomError::NotExists.into()),
            Self::RoomUnavailable(_) => Some(Error::RoomUnavailable.into()),
        }
    }
}

impl AsError for BuildError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "DISCOUNT_EXCEEDS_SUBTOTAL"]
                #[status = CONFLICT]
                #[message = "Discount exceeds the subtotal"]
                DiscountExceedsSubtotal,

                #[code = "DUPLICATE_ROOM"]
                #[status = BAD_REQUEST]
                #[message = "The same `Room` is requested more than once"]
                DuplicateRoom,

                #[code = "EMPTY_BOOKING"]
                #[status = BAD_REQUEST]
                #[message = "At least one `Room` must be requested"]
                EmptyBooking,

                #[code = "EMPTY_CLIENT"]
                #[status = BAD_REQUEST]
                #[message = "Client identifier is empty or malformed"]
                EmptyClient,

                #[code = "INVALID_INITIAL_STATE"]
                #[status = BAD_REQUEST]
                #[message = "`Reservation` may start as `Pending` or \
                             `Confirmed` only"]
                InvalidInitialState,

                #[code = "INVALID_DISCOUNT"]
                #[status = BAD_REQUEST]
                #[message = "Discount must have at most 2 decimal places and \
                             not exceed 9999999999.99"]
                InvalidDiscount,

                #[code = "INVALID_PRICE"]
                #[status = BAD_REQUEST]
                #[message = "Nightly price must be positive, have at most 2 \
                             decimal places and not exceed 9999999999.99"]
                InvalidPrice,

                #[code = "SUBTOTAL_OUT_OF_RANGE"]
                #[status = BAD_REQUEST]
                #[message = "Subtotal exceeds 9999999999.99"]
                SubtotalOutOfRange,
            }
        }

        let error: crate::Error = match self {
            Self::DiscountExceedsSubtotal { .. } => {
                Error::DiscountExceedsSubtotal.into()
            }
            Self::DuplicateRoom(_) => Error::DuplicateRoom.into(),
            Self::EmptyBooking => Error::EmptyBooking.into(),
            Self::EmptyClient => Error::EmptyClient.into(),
            Self::InvalidDateRange(_) => RangeError::Invalid.into(),
            Self::InvalidInitialState(_) => Error::InvalidInitialState.into(),
            Self::InvalidDiscount(_) => Error::InvalidDiscount.into(),
            Self::InvalidPrice(_) => Error::InvalidPrice.into(),
            Self::SubtotalOutOfRange => Error::SubtotalOutOfRange.into(),
        };
        Some(error.with_message(self))
    }
}

impl AsError for command::update_reservation_state::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "INVALID_TRANSITION"]
                #[status = CONFLICT]
                #[message = "`Reservation` cannot move into the requested \
                             state"]
                InvalidTransition,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::InvalidTransition { .. } => Some(
                crate::Error::from(Error::InvalidTransition).with_message(self),
            ),
            Self::LinkNotFound(_) | Self::ReservationNotExists(_) => {
                Some(ReservationError::NotExists.into())
            }
        }
    }
}

impl AsError for command::submit_contact::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Request(e) => e.try_as_error(),
        }
    }
}

impl AsError for domain::contact::RequestError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "INVALID_CONTACT_EMAIL"]
                #[status = BAD_REQUEST]
                #[message = "Email is not a valid address"]
                InvalidEmail,

                #[code = "INVALID_CONTACT_NAME"]
                #[status = BAD_REQUEST]
                #[message = "Name must have from 3 to 100 characters"]
                InvalidName,

                #[code = "INVALID_CONTACT_PHONE"]
                #[status = BAD_REQUEST]
                #[message = "Phone is not a valid number"]
                InvalidPhone,
            }
        }

        let error: crate::Error = match self {
            Self::InvalidEmail => Error::InvalidEmail.into(),
            Self::InvalidName => Error::InvalidName.into(),
            Self::InvalidPhone => Error::InvalidPhone.into(),
        };
        Some(error.with_message(self))
    }
}

impl AsError for command::update_contact_state::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "CONTACT_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Contact` with the specified ID does not exist"]
                NotExists,
            }
        }

        match self {
            Self::ContactNotExists(_) => Some(Error::NotExists.into()),
            Self::Db(e) => e.try_as_error(),
        }
    }
}

#[cfg(test)]
mod spec {
    use common::Money;
    use service::{
        command::update_contact_state,
        domain::{contact, reservation::request::BuildError, room},
    };

    use crate::AsError as _;

    #[test]
    fn discount_over_subtotal_is_conflict() {
        let err = BuildError::DiscountExceedsSubtotal {
            discount: Money::from(150),
            subtotal: Money::from(100),
        }
        .as_error();

        assert_eq!(err.code, "DISCOUNT_EXCEEDS_SUBTOTAL");
        assert_eq!(err.status_code, http::StatusCode::CONFLICT);
        assert!(err.message.contains("150"), "{}", err.message);
    }

    #[test]
    fn unstorable_amounts_are_bad_requests() {
        for (err, code) in [
            (BuildError::InvalidPrice(room::Id::from(1)), "INVALID_PRICE"),
            (BuildError::InvalidDiscount(Money::ZERO), "INVALID_DISCOUNT"),
            (BuildError::SubtotalOutOfRange, "SUBTOTAL_OUT_OF_RANGE"),
        ] {
            let err = err.as_error();

            assert_eq!(err.code, code);
            assert_eq!(err.status_code, http::StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn invalid_contact_fields_are_bad_requests() {
        for (err, code) in [
            (contact::RequestError::InvalidEmail, "INVALID_CONTACT_EMAIL"),
            (contact::RequestError::InvalidName, "INVALID_CONTACT_NAME"),
            (contact::RequestError::InvalidPhone, "INVALID_CONTACT_PHONE"),
        ] {
            let err = err.as_error();

            assert_eq!(err.code, code);
            assert_eq!(err.status_code, http::StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn unknown_contact_is_not_found() {
        let err = update_contact_state::ExecutionError::ContactNotExists(
            contact::Id::from(3),
        )
        .as_error();

        assert_eq!(err.code, "CONTACT_NOT_EXISTS");
        assert_eq!(err.status_code, http::StatusCode::NOT_FOUND);
    }
}
