//! [`Command`] for cancelling a [`Reservation`].

use tracerr::Traced;

use crate::{
    domain::{reservation, Reservation},
    Service,
};

use super::{update_reservation_state, Command, UpdateReservationState};

/// [`Command`] for cancelling a [`Reservation`] along with all its room
/// links, releasing the booked rooms.
#[derive(Clone, Copy, Debug)]
pub struct CancelReservation(pub reservation::Id);

impl<Db, Nt> Command<CancelReservation> for Service<Db, Nt>
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
        CancelReservation(id): CancelReservation,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(UpdateReservationState {
            reservation_id: id,
            state: reservation::State::Cancelled,
            notify: false,
        })
        .await
        .map_err(tracerr::wrap!())
    }
}

/// Error of [`CancelReservation`] [`Command`] execution.
pub type ExecutionError = update_reservation_state::ExecutionError;

#[cfg(test)]
mod spec {
    use crate::{
        domain::reservation::{link, State},
        testing::{book, fixture},
        Command as _,
    };

    use super::CancelReservation;

    #[tokio::test]
    async fn cancels_reservation_and_links() {
        let (svc, notifier) = fixture(1);
        let id = book(&svc, 1, "2024-06-01", "2024-06-04", State::Confirmed)
            .await
            .id;

        let cancelled = svc.execute(CancelReservation(id)).await.unwrap();

        assert_eq!(cancelled.state(), State::Cancelled);
        assert!(cancelled.rooms.iter().all(|l| l.state == link::State::Cancelled));
        assert!(notifier.sent().is_empty());
    }
}
