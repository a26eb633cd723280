//! [`Command`] for moving a [`Reservation`] into another [`State`].

use std::fmt;

use common::operations::{
    By, Commit, Lock, Notify, Rollback, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        reservation::{self, link, State},
        room, Reservation,
    },
    infra::{database, Database, Notifier},
    read::reservation::Summary,
    Service,
};

use super::{within, Command};

/// [`Command`] for moving a [`Reservation`] into another [`State`].
///
/// Cancelling a [`Reservation`] cancels all its room links as well.
/// Confirming one notifies its guests, unless disabled. Moving into the
/// current [`State`] changes nothing.
#[derive(Clone, Copy, Debug)]
pub struct UpdateReservationState {
    /// ID of the [`Reservation`] to update.
    pub reservation_id: reservation::Id,

    /// [`State`] to move the [`Reservation`] into.
    pub state: State,

    /// Indicator whether guests should be notified once the [`Reservation`]
    /// is confirmed.
    pub notify: bool,
}

impl<Db, Nt> Command<UpdateReservationState> for Service<Db, Nt>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Reservation, reservation::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Reservation>, reservation::Id>>,
            Ok = Option<Reservation>,
            Err = Traced<database::Error>,
        > + Database<
            Update<reservation::StateChange>,
            Ok = bool,
            Err = Traced<database::Error>,
        > + Database<
            Update<link::StateChange>,
            Ok = bool,
            Err = Traced<database::Error>,
        > + Database<Commit, Err = Traced<database::Error>>
        + Database<Rollback, Err = Traced<database::Error>>,
    Nt: Notifier<Notify<Summary>, Err: fmt::Display>,
{
    type Ok = Reservation;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdateReservationState,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateReservationState {
            reservation_id: id,
            state,
            notify,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let (reservation, changed) = within(&tx, async {
            // Avoid concurrent transitions of the same `Reservation`.
            tx.execute(Lock(By::<Reservation, _>::new(id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;

            let mut reservation = tx
                .execute(Select(By::<Option<Reservation>, _>::new(id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::ReservationNotExists(id))
                .map_err(tracerr::wrap!())?;

            let current = reservation.state();
            if current == state {
                return Ok((reservation, false));
            }
            if !current.can_become(state) {
                return Err(tracerr::new!(E::InvalidTransition {
                    from: current,
                    to: state,
                }));
            }

            if state == State::Cancelled {
                for link in &mut reservation.rooms {
                    let updated = tx
                        .execute(Update(link::StateChange {
                            key: link.key(),
                            state: link::State::Cancelled,
                        }))
                        .await
                        .map_err(tracerr::map_from_and_wrap!(=> E))?;
                    if !updated {
                        return Err(tracerr::new!(E::LinkNotFound(
                            link.room_id
                        )));
                    }
                    link.state = link::State::Cancelled;
                }
            }

            let updated = tx
                .execute(Update(reservation::StateChange { id, state }))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            if !updated {
                return Err(tracerr::new!(E::ReservationNotExists(id)));
            }
            reservation.header.state = state;

            Ok((reservation, true))
        })
        .await?;

        if changed
            && state == State::Confirmed
            && notify
            && self.config().notifications
        {
            self.notify_confirmed(&reservation).await;
        }

        Ok(reservation)
    }
}

impl<Db, Nt> Service<Db, Nt>
where
    Nt: Notifier<Notify<Summary>, Err: fmt::Display>,
{
    /// Notifies guests about the confirmed [`Reservation`].
    ///
    /// Failures are logged only.
    async fn notify_confirmed(&self, reservation: &Reservation) {
        let summary = match Summary::try_from(reservation) {
            Ok(s) => s,
            Err(e) => {
                log::warn!(
                    reservation.id = %reservation.id,
                    "failed to summarize confirmed reservation: {e}",
                );
                return;
            }
        };
        if let Err(e) = self.notifier().execute(Notify(summary)).await {
            log::warn!(
                reservation.id = %reservation.id,
                "failed to notify about confirmed reservation: {e}",
            );
        }
    }
}

/// Error of [`UpdateReservationState`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Reservation`] cannot move between the [`State`]s.
    #[display("`Reservation` cannot move from `{from}` to `{to}`")]
    InvalidTransition {
        /// Current [`State`] of the [`Reservation`].
        from: State,

        /// Requested [`State`].
        to: State,
    },

    /// Room link of the [`Reservation`] vanished while being cancelled.
    #[display("`Reservation` link to `Room(id: {_0})` does not exist")]
    LinkNotFound(#[error(not(source))] room::Id),

    /// [`Reservation`] with the provided ID does not exist.
    #[display("`Reservation(id: {_0})` does not exist")]
    ReservationNotExists(#[error(not(source))] reservation::Id),
}

#[cfg(test)]
mod spec {
    use common::Money;

    use crate::{
        domain::{
            reservation::{self, link, request::RoomRequest, State},
            room,
        },
        infra::memory::Fault,
        query,
        testing::{book, date, fixture, room as test_room, TestService},
        Command as _, Config, Query as _,
    };

    use super::{ExecutionError, UpdateReservationState};

    fn update(id: reservation::Id, state: State) -> UpdateReservationState {
        UpdateReservationState {
            reservation_id: id,
            state,
            notify: true,
        }
    }

    async fn two_rooms_reservation(svc: &TestService) -> reservation::Id {
        svc.execute(crate::command::CreateReservation(reservation::Request {
            client_id: "client-2".into(),
            adults: 3,
            children: 1,
            discount: Some(Money::from(20)),
            confirmed_at: None,
            state: None,
            rooms: [1, 2]
                .into_iter()
                .map(|id| RoomRequest {
                    room_id: room::Id::from(id),
                    price: Money::from(100),
                    check_in: date("2024-06-01"),
                    check_out: date("2024-06-03"),
                })
                .collect(),
        }))
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn cancellation_cascades_to_every_link() {
        let (svc, _) = fixture(2);
        let id = two_rooms_reservation(&svc).await;

        let cancelled = svc.execute(update(id, State::Cancelled)).await.unwrap();
        assert_eq!(cancelled.state(), State::Cancelled);

        let read = svc
            .execute(query::reservation::ById::by(id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(read.state(), State::Cancelled);
        assert_eq!(read.rooms.len(), 2);
        assert!(read.rooms.iter().all(|l| l.state == link::State::Cancelled));

        let free = svc
            .execute(query::CheckAvailability {
                room_id: room::Id::from(1),
                check_in: date("2024-06-01"),
                check_out: date("2024-06-03"),
            })
            .await
            .unwrap();
        assert!(free, "cancelled reservation releases its rooms");
    }

    #[tokio::test]
    async fn missing_link_fails_whole_cancellation() {
        let (svc, _) = fixture(2);
        let id = two_rooms_reservation(&svc).await;
        svc.database().inject(Fault::LinkMissing(1)).await;

        let err = svc.execute(update(id, State::Cancelled)).await.unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::LinkNotFound(room_id)
                if *room_id == room::Id::from(2),
        ));

        let read = svc
            .execute(query::reservation::ById::by(id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(read.state(), State::Pending);
        assert_eq!(read.rooms.len(), 2);
        assert!(read.rooms.iter().all(|l| l.state == link::State::Active));

        let free = svc
            .execute(query::CheckAvailability {
                room_id: room::Id::from(1),
                check_in: date("2024-06-01"),
                check_out: date("2024-06-03"),
            })
            .await
            .unwrap();
        assert!(!free, "failed cancellation keeps the rooms booked");
    }

    #[tokio::test]
    async fn cancelling_twice_is_noop() {
        let (svc, _) = fixture(2);
        let id = two_rooms_reservation(&svc).await;

        let first = svc.execute(update(id, State::Cancelled)).await.unwrap();
        let second = svc.execute(update(id, State::Cancelled)).await.unwrap();

        assert_eq!(first, second);
        assert!(second.rooms.iter().all(|l| l.state == link::State::Cancelled));
    }

    #[tokio::test]
    async fn follows_lifecycle() {
        let (svc, _) = fixture(1);
        let id = book(&svc, 1, "2024-06-01", "2024-06-02", State::Pending)
            .await
            .id;

        for state in [State::Confirmed, State::Completed] {
            let r = svc.execute(update(id, state)).await.unwrap();
            assert_eq!(r.state(), state);
        }
        let read = svc
            .execute(query::reservation::ById::by(id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(read.state(), State::Completed);
        assert!(read.rooms.iter().all(|l| l.state == link::State::Active));
    }

    #[tokio::test]
    async fn rejects_invalid_transitions() {
        let (svc, _) = fixture(3);
        let pending = book(&svc, 1, "2024-06-01", "2024-06-02", State::Pending)
            .await
            .id;
        let cancelled =
            book(&svc, 2, "2024-06-01", "2024-06-02", State::Pending).await.id;
        _ = svc.execute(update(cancelled, State::Cancelled)).await.unwrap();

        for (id, from, to) in [
            (pending, State::Pending, State::Completed),
            (cancelled, State::Cancelled, State::Confirmed),
            (cancelled, State::Cancelled, State::Pending),
        ] {
            let err = svc.execute(update(id, to)).await.unwrap_err();
            assert!(
                matches!(
                    err.as_ref(),
                    ExecutionError::InvalidTransition { from: f, to: t }
                        if *f == from && *t == to,
                ),
                "{from} -> {to}",
            );
        }

        let read = svc
            .execute(query::reservation::ById::by(cancelled))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(read.state(), State::Cancelled);
    }

    #[tokio::test]
    async fn rejects_unknown_reservation() {
        let (svc, _) = fixture(1);
        let id = reservation::Id::from(42);

        let err = svc.execute(update(id, State::Confirmed)).await.unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::ReservationNotExists(i) if *i == id,
        ));
    }

    #[tokio::test]
    async fn confirmation_notifies_with_summary() {
        let (svc, notifier) = fixture(2);
        let id = two_rooms_reservation(&svc).await;

        _ = svc.execute(update(id, State::Confirmed)).await.unwrap();

        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        let summary = &sent[0];
        assert_eq!(summary.id, id);
        assert_eq!(summary.adults, 3);
        assert_eq!(summary.subtotal, Money::from(400));
        assert_eq!(summary.total, Money::from(380));
        assert_eq!(summary.rooms.len(), 2);
        assert!(summary.rooms.iter().all(|r| r.nights == 2));
        assert_eq!(summary.rooms[0].name, test_room(1).name);

        // Staying confirmed notifies nobody.
        _ = svc.execute(update(id, State::Confirmed)).await.unwrap();
        assert_eq!(notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn failed_notification_keeps_confirmation() {
        let (svc, notifier) = fixture(1);
        notifier.fail();
        let id = book(&svc, 1, "2024-06-01", "2024-06-02", State::Pending)
            .await
            .id;

        let confirmed = svc.execute(update(id, State::Confirmed)).await;
        assert!(confirmed.is_ok());
        assert_eq!(notifier.sent().len(), 1);

        let read = svc
            .execute(query::reservation::ById::by(id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(read.state(), State::Confirmed);
    }

    #[tokio::test]
    async fn notifies_nobody_when_asked_so() {
        let (svc, notifier) = fixture(1);
        let id = book(&svc, 1, "2024-06-01", "2024-06-02", State::Pending)
            .await
            .id;

        let mut cmd = update(id, State::Confirmed);
        cmd.notify = false;
        _ = svc.execute(cmd).await.unwrap();

        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn notifies_nobody_when_disabled() {
        let (svc, notifier) = fixture(1);
        let svc = crate::Service::new(
            Config {
                notifications: false,
                ..*svc.config()
            },
            svc.database().clone(),
            notifier.clone(),
        );
        let id = book(&svc, 1, "2024-06-01", "2024-06-02", State::Pending)
            .await
            .id;

        _ = svc.execute(update(id, State::Confirmed)).await.unwrap();

        assert!(notifier.sent().is_empty());
    }
}
