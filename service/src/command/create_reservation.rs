//! [`Command`] for creating a new [`Reservation`].

use std::collections::HashMap;

use common::operations::{
    By, Commit, Insert, Lock, Rollback, Select, Transact, Transacted,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{reservation, room, Reservation, Room},
    infra::{database, Database},
    read, Service,
};

use super::{within, Command};

/// [`Command`] for creating a new [`Reservation`] of one or more [`Room`]s.
///
/// Either every requested [`Room`] is booked or none is.
#[derive(Clone, Debug)]
pub struct CreateReservation(pub reservation::Request);

impl<Db, Nt> Command<CreateReservation> for Service<Db, Nt>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Room, room::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<HashMap<room::Id, Room>, Vec<room::Id>>>,
            Ok = HashMap<room::Id, Room>,
            Err = Traced<database::Error>,
        > + Database<
            Select<
                By<
                    Option<read::availability::Conflict>,
                    read::availability::Stay,
                >,
            >,
            Ok = Option<read::availability::Conflict>,
            Err = Traced<database::Error>,
        > + Database<
            Insert<reservation::Header>,
            Ok = reservation::Id,
            Err = Traced<database::Error>,
        > + Database<Insert<reservation::Link>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>
        + Database<Rollback, Err = Traced<database::Error>>,
{
    type Ok = Reservation;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        CreateReservation(request): CreateReservation,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let booking = request
            .validate()
            .map_err(tracerr::from_and_wrap!(=> E))?;
        let now = self.now().coerce();

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        within(&tx, async {
            let room_ids = booking.room_ids();

            // Avoid concurrent bookings of the same `Room`s. Locks are taken
            // in ascending order of IDs to never deadlock.
            for &id in &room_ids {
                tx.execute(Lock(By::<Room, _>::new(id)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))
                    .map(drop)?;
            }

            let mut rooms = tx
                .execute(Select(By::new(room_ids.clone())))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            if let Some(&missing) =
                room_ids.iter().find(|id| !rooms.contains_key(id))
            {
                return Err(tracerr::new!(E::RoomNotExists(missing)));
            }

            for booked in booking.rooms() {
                let conflict = tx
                    .execute(Select(By::new(read::availability::Stay {
                        room_id: booked.room_id,
                        stay: booked.stay,
                    })))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?;
                if conflict.is_some() {
                    return Err(tracerr::new!(E::RoomUnavailable(
                        booked.room_id
                    )));
                }
            }

            let (header, booked) = booking
                .finish(now)
                .map_err(tracerr::from_and_wrap!(=> E))?;

            let id = tx
                .execute(Insert(header.clone()))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;

            let mut links = Vec::with_capacity(booked.len());
            for room in booked {
                let link = room.into_link(id);
                tx.execute(Insert(link.clone()))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))
                    .map(drop)?;
                links.push(reservation::Link {
                    room: rooms.remove(&link.room_id),
                    ..link
                });
            }
            links.sort_by_key(|l| l.room_id);

            Ok(Reservation {
                id,
                header,
                rooms: links,
            })
        })
        .await
    }
}

/// Error of [`CreateReservation`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`reservation::Request`] is invalid.
    #[display("Invalid reservation: {_0}")]
    #[from]
    Build(reservation::BuildError),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Room`] with the provided ID does not exist.
    #[display("`Room(id: {_0})` does not exist")]
    RoomNotExists(#[error(not(source))] room::Id),

    /// [`Room`] is already booked for an overlapping stay.
    #[display("`Room(id: {_0})` is already booked for the requested dates")]
    RoomUnavailable(#[error(not(source))] room::Id),
}

#[cfg(test)]
mod spec {
    use common::{Date, Money};

    use crate::{
        domain::{
            reservation::{self, link, request::RoomRequest, BuildError},
            room, Reservation,
        },
        infra::memory::Fault,
        query, Command as _, Query as _,
        testing::{book, date, fixture, TestService},
    };

    use super::{CreateReservation, ExecutionError};

    fn stay(room: i32, price: u32, check_in: &str, check_out: &str) -> RoomRequest {
        RoomRequest {
            room_id: room::Id::from(room),
            price: Money::from(price),
            check_in: date(check_in),
            check_out: date(check_out),
        }
    }

    fn request(rooms: Vec<RoomRequest>) -> CreateReservation {
        CreateReservation(reservation::Request {
            client_id: "client-1".into(),
            adults: 2,
            children: 0,
            discount: None,
            confirmed_at: None,
            state: None,
            rooms,
        })
    }

    async fn client_reservations(svc: &TestService) -> Vec<Reservation> {
        svc.execute(query::reservation::ForClient::by(
            reservation::ClientId::new("client-1").unwrap(),
        ))
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn books_multiple_rooms_with_pricing() {
        let (svc, _) = fixture(2);
        let mut cmd = request(vec![
            stay(2, 50, "2024-06-01", "2024-06-03"),
            stay(1, 100, "2024-06-01", "2024-06-03"),
        ]);
        cmd.0.discount = Some(Money::from(50));

        let created = svc.execute(cmd).await.unwrap();
        assert_eq!(created.header.subtotal, Money::from(300));
        assert_eq!(created.header.discount, Money::from(50));
        assert_eq!(created.total(), Money::from(250));
        assert_eq!(created.state(), reservation::State::Pending);

        let read = svc
            .execute(query::reservation::ById::by(created.id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(read, created);

        let recomputed: Money = read.rooms.iter().map(|l| l.amount()).sum();
        assert_eq!(read.header.subtotal, recomputed);
        assert_eq!(
            read.rooms.iter().map(|l| i32::from(l.room_id)).collect::<Vec<_>>(),
            [1, 2],
        );
        assert!(read.rooms.iter().all(|l| l.state == link::State::Active));
        assert!(read.rooms.iter().all(|l| l.room.is_some()));
    }

    #[tokio::test]
    async fn rejects_overlapping_booking() {
        let (svc, _) = fixture(1);
        _ = book(&svc, 1, "2024-06-01", "2024-06-04", reservation::State::Pending)
            .await;

        let err = svc
            .execute(request(vec![stay(1, 100, "2024-06-03", "2024-06-06")]))
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::RoomUnavailable(id) if *id == room::Id::from(1),
        ));
        assert_eq!(client_reservations(&svc).await.len(), 1);
    }

    #[tokio::test]
    async fn allows_back_to_back_booking() {
        let (svc, _) = fixture(1);
        _ = book(&svc, 1, "2024-06-01", "2024-06-03", reservation::State::Confirmed)
            .await;

        let next = svc
            .execute(request(vec![stay(1, 100, "2024-06-03", "2024-06-05")]))
            .await;
        assert!(next.is_ok());
    }

    #[tokio::test]
    async fn rejects_whole_booking_if_any_room_is_taken() {
        let (svc, _) = fixture(2);
        _ = book(&svc, 2, "2024-06-01", "2024-06-03", reservation::State::Pending)
            .await;

        let err = svc
            .execute(request(vec![
                stay(1, 100, "2024-06-01", "2024-06-03"),
                stay(2, 100, "2024-06-02", "2024-06-03"),
            ]))
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::RoomUnavailable(_)));

        let free = svc
            .execute(query::CheckAvailability {
                room_id: room::Id::from(1),
                check_in: date("2024-06-01"),
                check_out: date("2024-06-03"),
            })
            .await
            .unwrap();
        assert!(free, "no part of the rejected booking may persist");
    }

    #[tokio::test]
    async fn validates_before_touching_storage() {
        let (svc, _) = fixture(1);

        let err = svc.execute(request(vec![])).await.unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::Build(BuildError::EmptyBooking),
        ));

        let err = svc
            .execute(request(vec![stay(1, 100, "2024-06-03", "2024-06-01")]))
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::Build(BuildError::InvalidDateRange(_)),
        ));
        assert!(client_reservations(&svc).await.is_empty());
    }

    #[tokio::test]
    async fn rejects_amounts_not_fitting_storage() {
        let (svc, _) = fixture(2);

        for price in ["79228162514264337593543950335", "33.333", "0.001"] {
            let mut r = stay(1, 1, "2024-06-01", "2024-06-03");
            r.price = price.parse().unwrap();

            let err = svc.execute(request(vec![r])).await.unwrap_err();
            assert!(
                matches!(
                    err.as_ref(),
                    ExecutionError::Build(BuildError::InvalidPrice(id))
                        if *id == room::Id::from(1),
                ),
                "{price}: {err}",
            );
        }

        let mut huge = stay(2, 1, "2024-06-01", "2024-06-30");
        huge.price = Money::MAX;
        let err = svc.execute(request(vec![huge])).await.unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::Build(BuildError::SubtotalOutOfRange),
        ));

        assert!(client_reservations(&svc).await.is_empty());
    }

    #[tokio::test]
    async fn rejects_discount_over_subtotal() {
        let (svc, _) = fixture(1);
        let mut cmd = request(vec![stay(1, 100, "2024-06-01", "2024-06-02")]);
        cmd.0.discount = Some(Money::from(150));

        let err = svc.execute(cmd).await.unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::Build(BuildError::DiscountExceedsSubtotal { .. }),
        ));
        assert!(client_reservations(&svc).await.is_empty());
    }

    #[tokio::test]
    async fn rejects_unknown_room() {
        let (svc, _) = fixture(1);

        let err = svc
            .execute(request(vec![stay(5, 100, "2024-06-01", "2024-06-02")]))
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::RoomNotExists(id) if *id == room::Id::from(5),
        ));
    }

    #[tokio::test]
    async fn rolls_back_on_failed_link_insert() {
        let (svc, _) = fixture(2);
        svc.database().inject(Fault::LinkInsert(1)).await;

        let err = svc
            .execute(request(vec![
                stay(1, 100, "2024-06-01", "2024-06-03"),
                stay(2, 100, "2024-06-01", "2024-06-03"),
            ]))
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::Db(_)));
        assert!(client_reservations(&svc).await.is_empty());

        // Fault is gone, so the very same booking succeeds now.
        let created = svc
            .execute(request(vec![
                stay(1, 100, "2024-06-01", "2024-06-03"),
                stay(2, 100, "2024-06-01", "2024-06-03"),
            ]))
            .await
            .unwrap();
        assert_eq!(created.rooms.len(), 2);
    }

    #[tokio::test]
    async fn rolls_back_on_failed_commit() {
        let (svc, _) = fixture(1);
        svc.database().inject(Fault::Commit).await;

        let err = svc
            .execute(request(vec![stay(1, 100, "2024-06-01", "2024-06-03")]))
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::Db(_)));
        assert!(client_reservations(&svc).await.is_empty());
    }

    #[tokio::test]
    async fn never_double_books_concurrently() {
        let (svc, _) = fixture(1);
        let first = request(vec![stay(1, 100, "2024-06-01", "2024-06-04")]);
        let second = request(vec![stay(1, 100, "2024-06-02", "2024-06-05")]);

        let (a, b) = tokio::join!(svc.execute(first), svc.execute(second));

        assert_eq!(usize::from(a.is_ok()) + usize::from(b.is_ok()), 1);
        let failed = a.err().or(b.err()).unwrap();
        assert!(matches!(failed.as_ref(), ExecutionError::RoomUnavailable(_)));
        assert_eq!(client_reservations(&svc).await.len(), 1);
    }

    #[tokio::test]
    async fn defaults_confirmation_to_now() {
        let (svc, _) = fixture(1);

        let created = svc
            .execute(request(vec![stay(1, 100, "2024-06-01", "2024-06-03")]))
            .await
            .unwrap();
        assert_eq!(created.header.confirmed_at, svc.now().coerce());
        assert_eq!(
            svc.today(),
            "2024-05-01".parse::<Date>().unwrap(),
        );
    }
}
