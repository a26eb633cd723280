//! [`Query`] for checking whether a [`Room`] is free for a stay.

use std::collections::HashMap;

use common::{
    operations::{By, Select},
    Date, DateRange,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{room, Room},
    infra::{database, Database},
    read, Service,
};

use super::Query;

/// [`Query`] for checking whether a [`Room`] is free for a stay.
///
/// The [`Room`] is free unless an active booking of a non-cancelled
/// reservation overlaps the stay. Back-to-back stays don't overlap.
#[derive(Clone, Copy, Debug)]
pub struct CheckAvailability {
    /// ID of the [`Room`] to check.
    pub room_id: room::Id,

    /// [`Date`] of arrival.
    pub check_in: Date,

    /// [`Date`] of departure.
    pub check_out: Date,
}

impl<Db, Nt> Query<CheckAvailability> for Service<Db, Nt>
where
    Db: Database<
            Select<By<HashMap<room::Id, Room>, [room::Id; 1]>>,
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
        >,
{
    type Ok = bool;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        query: CheckAvailability,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CheckAvailability {
            room_id,
            check_in,
            check_out,
        } = query;

        let stay = DateRange::new(check_in, check_out)
            .ok_or(E::InvalidRange)
            .map_err(tracerr::wrap!())?;

        let rooms = self
            .database()
            .execute(Select(By::new([room_id])))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if !rooms.contains_key(&room_id) {
            return Err(tracerr::new!(E::RoomNotExists(room_id)));
        }

        self.database()
            .execute(Select(By::new(read::availability::Stay { room_id, stay })))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(|conflict| conflict.is_none())
    }
}

/// Error of [`CheckAvailability`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Check-out is not after check-in.
    #[display("check-out must be after check-in")]
    InvalidRange,

    /// [`Room`] with the provided ID does not exist.
    #[display("`Room(id: {_0})` does not exist")]
    RoomNotExists(#[error(not(source))] room::Id),
}

#[cfg(test)]
mod spec {
    use common::Date;

    use crate::{
        domain::{reservation::State, room},
        testing::{book, fixture},
        Query as _,
    };

    use super::{CheckAvailability, ExecutionError};

    fn check(room: i32, check_in: &str, check_out: &str) -> CheckAvailability {
        CheckAvailability {
            room_id: room::Id::from(room),
            check_in: check_in.parse::<Date>().unwrap(),
            check_out: check_out.parse::<Date>().unwrap(),
        }
    }

    #[tokio::test]
    async fn allows_back_to_back_stays() {
        let (svc, _) = fixture(2);
        _ = book(&svc, 1, "2024-06-01", "2024-06-03", State::Confirmed).await;

        assert!(svc.execute(check(1, "2024-06-03", "2024-06-05")).await.unwrap());
        assert!(svc.execute(check(1, "2024-05-28", "2024-06-01")).await.unwrap());
        assert!(!svc.execute(check(1, "2024-06-02", "2024-06-04")).await.unwrap());
        assert!(svc.execute(check(2, "2024-06-02", "2024-06-04")).await.unwrap());
    }

    #[tokio::test]
    async fn ignores_pending_but_not_cancelled_reservations() {
        let (svc, _) = fixture(1);
        _ = book(&svc, 1, "2024-06-01", "2024-06-03", State::Pending).await;

        assert!(!svc.execute(check(1, "2024-06-01", "2024-06-02")).await.unwrap());
    }

    #[tokio::test]
    async fn rejects_invalid_range() {
        let (svc, _) = fixture(1);

        let err = svc
            .execute(check(1, "2024-06-03", "2024-06-03"))
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::InvalidRange));
    }

    #[tokio::test]
    async fn rejects_unknown_room() {
        let (svc, _) = fixture(1);

        let err = svc
            .execute(check(9, "2024-06-01", "2024-06-03"))
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::RoomNotExists(id) if *id == room::Id::from(9),
        ));
    }
}
