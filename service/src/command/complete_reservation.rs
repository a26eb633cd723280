//! [`Command`] for completing a [`Reservation`].

use tracerr::Traced;

use crate::{
    domain::{reservation, Reservation},
    Service,
};

use super::{update_reservation_state, Command, UpdateReservationState};

/// [`Command`] for completing a confirmed [`Reservation`] once its guests
/// have checked out.
#[derive(Clone, Copy, Debug)]
pub struct CompleteReservation(pub reservation::Id);

impl<Db, Nt> Command<CompleteReservation> for Service<Db, Nt>
where
    Self: Command<
        UpdateReservationState,
        Ok = Reservation,
        Err = Traced<update_reservation_state::ExecutionError>,
    >,
{
    type Ok = Reservation;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        CompleteReservation(id): CompleteReservation,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(UpdateReservationState {
            reservation_id: id,
            state: reservation::State::Completed,
            notify: false,
        })
        .await
        .map_err(tracerr::wrap!())
    }
}

/// Error of [`CompleteReservation`] [`Command`] execution.
pub type ExecutionError = update_reservation_state::ExecutionError;

#[cfg(test)]
mod spec {
    use crate::{
        domain::reservation::State,
        testing::{book, fixture},
        Command as _,
    };

    use super::{CompleteReservation, ExecutionError};

    #[tokio::test]
    async fn completes_confirmed_only() {
        let (svc, _) = fixture(2);
        let confirmed =
            book(&svc, 1, "2024-06-01", "2024-06-02", State::Confirmed)
                .await
                .id;
        let pending = book(&svc, 2, "2024-06-01", "2024-06-02", State::Pending)
            .await
            .id;

        let done = svc.execute(CompleteReservation(confirmed)).await.unwrap();
        assert_eq!(done.state(), State::Completed);

        let err = svc.execute(CompleteReservation(pending)).await.unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::InvalidTransition {
                from: State::Pending,
                to: State::Completed,
            },
        ));
    }
}
