//! [`Command`] for confirming a [`Reservation`].

use tracerr::Traced;

use crate::{
    domain::{reservation, Reservation},
    Service,
};

use super::{update_reservation_state, Command, UpdateReservationState};

/// [`Command`] for confirming a [`Reservation`].
///
/// Guests are notified about the confirmation if `notify` is set and
/// notifications are enabled in the [`Config`].
///
/// [`Config`]: crate::Config
#[derive(Clone, Copy, Debug)]
pub struct ConfirmReservation {
    /// ID of the [`Reservation`] to confirm.
    pub reservation_id: reservation::Id,

    /// Indicator whether guests should be notified.
    pub notify: bool,
}

impl<Db, Nt> Command<ConfirmReservation> for Service<Db, Nt>
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
        cmd: ConfirmReservation,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(UpdateReservationState {
            reservation_id: cmd.reservation_id,
            state: reservation::State::Confirmed,
            notify: cmd.notify,
        })
        .await
        .map_err(tracerr::wrap!())
    }
}

/// Error of [`ConfirmReservation`] [`Command`] execution.
pub type ExecutionError = update_reservation_state::ExecutionError;

#[cfg(test)]
mod spec {
    use crate::{
        domain::reservation::State,
        testing::{book, fixture},
        Command as _,
    };

    use super::ConfirmReservation;

    #[tokio::test]
    async fn confirms_and_notifies() {
        let (svc, notifier) = fixture(1);
        let id = book(&svc, 1, "2024-06-01", "2024-06-04", State::Pending)
            .await
            .id;

        let confirmed = svc
            .execute(ConfirmReservation {
                reservation_id: id,
                notify: true,
            })
            .await
            .unwrap();

        assert_eq!(confirmed.state(), State::Confirmed);
        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].rooms[0].nights, 3);
    }
}
