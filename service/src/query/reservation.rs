//! [`Query`] collection related to [`Reservation`]s.

use common::operations::By;

use crate::domain::{reservation, Reservation};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a [`Reservation`] by its [`reservation::Id`], along with all its
/// room links, including the cancelled ones.
pub type ById = DatabaseQuery<By<Option<Reservation>, reservation::Id>>;

/// Queries [`Reservation`]s of a client, the most recently confirmed first.
pub type ForClient =
    DatabaseQuery<By<Vec<Reservation>, reservation::ClientId>>;

#[cfg(test)]
mod spec {
    use common::{DateTime, Money};

    use crate::{
        command::{CancelReservation, CreateReservation},
        domain::{
            reservation::{self, request::RoomRequest, ClientId},
            room,
        },
        testing::{book, date, fixture},
        Command as _, Query as _,
    };

    use super::{ById, ForClient};

    fn confirmed_at(rfc3339: &str) -> reservation::ConfirmationDateTime {
        DateTime::from_rfc3339(rfc3339).unwrap().coerce()
    }

    #[tokio::test]
    async fn lists_client_reservations_newest_first() {
        let (svc, _) = fixture(2);
        let mut ids = Vec::new();
        for (room_id, at) in
            [(1, "2024-04-01T10:00:00Z"), (2, "2024-04-20T10:00:00Z")]
        {
            let created = svc
                .execute(CreateReservation(reservation::Request {
                    client_id: "client-7".into(),
                    adults: 2,
                    children: 1,
                    discount: None,
                    confirmed_at: Some(confirmed_at(at)),
                    state: None,
                    rooms: vec![RoomRequest {
                        room_id: room::Id::from(room_id),
                        price: Money::from(80),
                        check_in: date("2024-06-10"),
                        check_out: date("2024-06-12"),
                    }],
                }))
                .await
                .unwrap();
            ids.push(created.id);
        }
        _ = book(&svc, 1, "2024-07-01", "2024-07-02", reservation::State::Pending)
            .await;

        let found = svc
            .execute(ForClient::by(ClientId::new("client-7").unwrap()))
            .await
            .unwrap();

        assert_eq!(
            found.iter().map(|r| r.id).collect::<Vec<_>>(),
            [ids[1], ids[0]],
        );
        assert!(found.iter().all(|r| r.rooms.len() == 1));
    }

    #[tokio::test]
    async fn keeps_cancelled_links_visible() {
        let (svc, _) = fixture(1);
        let created =
            book(&svc, 1, "2024-06-01", "2024-06-03", reservation::State::Pending)
                .await;
        _ = svc.execute(CancelReservation(created.id)).await.unwrap();

        let read = svc.execute(ById::by(created.id)).await.unwrap().unwrap();

        assert_eq!(read.state(), reservation::State::Cancelled);
        assert_eq!(read.rooms.len(), 1);
        assert!(!read.rooms[0].is_active());
        assert_eq!(
            svc.execute(ById::by(reservation::Id::from(404))).await.unwrap(),
            None,
        );
    }
}
