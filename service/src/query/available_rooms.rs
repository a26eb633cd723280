//! [`Query`] for the [`Room`]s free for a stay.

use common::{
    operations::{By, Select},
    Date, DateRange,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::Room,
    infra::{database, Database},
    read, Service,
};

use super::Query;

/// [`Query`] for the [`Room`]s in service nobody occupies during a stay,
/// ordered by their IDs.
#[derive(Clone, Copy, Debug)]
pub struct AvailableRooms {
    /// [`Date`] of arrival.
    pub check_in: Date,

    /// [`Date`] of departure.
    pub check_out: Date,
}

impl<Db, Nt> Query<AvailableRooms> for Service<Db, Nt>
where
    Db: Database<
        Select<By<Vec<Room>, read::room::Vacant>>,
        Ok = Vec<Room>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vec<Room>;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        query: AvailableRooms,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let stay = DateRange::new(query.check_in, query.check_out)
            .ok_or(E::InvalidRange)
            .map_err(tracerr::wrap!())?;
        if stay.check_in() < self.today() {
            return Err(tracerr::new!(E::DateInPast));
        }

        self.database()
            .execute(Select(By::new(read::room::Vacant(stay))))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
    }
}

/// Error of [`AvailableRooms`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// Check-in is earlier than today.
    #[display("check-in cannot be in the past")]
    DateInPast,

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Check-out is not after check-in.
    #[display("check-out must be after check-in")]
    InvalidRange,
}

#[cfg(test)]
mod spec {
    use crate::{
        command::CancelReservation,
        domain::{reservation::State, room},
        testing::{book, date, fixture_with, room as test_room, TODAY},
        Query as _,
    };

    use super::{AvailableRooms, ExecutionError};

    fn available(check_in: &str, check_out: &str) -> AvailableRooms {
        AvailableRooms {
            check_in: date(check_in),
            check_out: date(check_out),
        }
    }

    #[tokio::test]
    async fn skips_occupied_and_out_of_service_rooms() {
        let mut broken = test_room(3);
        broken.status = room::Status::Maintenance;
        let (svc, _) = fixture_with(vec![test_room(1), test_room(2), broken]);
        _ = book(&svc, 1, "2024-06-01", "2024-06-05", State::Pending).await;
        _ = book(&svc, 2, "2024-06-05", "2024-06-07", State::Confirmed).await;

        let rooms = svc
            .execute(available("2024-06-03", "2024-06-05"))
            .await
            .unwrap();

        let ids: Vec<_> = rooms.iter().map(|r| r.id).collect();
        assert_eq!(ids, [room::Id::from(2)]);
    }

    #[tokio::test]
    async fn returns_released_rooms() {
        let (svc, _) = fixture_with(vec![test_room(1)]);
        let id = book(&svc, 1, "2024-06-01", "2024-06-05", State::Pending)
            .await
            .id;
        _ = svc.execute(CancelReservation(id)).await.unwrap();

        let rooms = svc
            .execute(available("2024-06-01", "2024-06-05"))
            .await
            .unwrap();

        assert_eq!(rooms.len(), 1);
    }

    #[tokio::test]
    async fn accepts_today_but_not_past() {
        let (svc, _) = fixture_with(vec![test_room(1)]);

        assert!(svc.execute(available(TODAY, "2024-05-02")).await.is_ok());

        let err = svc
            .execute(available("2024-04-30", "2024-05-02"))
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::DateInPast));
    }

    #[tokio::test]
    async fn rejects_invalid_range() {
        let (svc, _) = fixture_with(vec![test_room(1)]);

        let err = svc
            .execute(available("2024-06-05", "2024-06-01"))
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::InvalidRange));
    }
}
