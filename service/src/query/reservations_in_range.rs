//! [`Query`] for the room bookings touching a calendar window.

use common::{
    operations::{By, Select},
    Date,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::reservation,
    infra::{database, Database},
    read, Service,
};
#[cfg(doc)]
use crate::domain::Reservation;

use super::Query;

/// [`Query`] for the active [`reservation::Link`]s of non-cancelled
/// [`Reservation`]s touching the `[from, to]` window, along with their rooms,
/// ordered by check-in.
#[derive(Clone, Copy, Debug)]
pub struct ReservationsInRange {
    /// First [`Date`] of the window.
    pub from: Date,

    /// Last [`Date`] of the window.
    pub to: Date,
}

impl<Db, Nt> Query<ReservationsInRange> for Service<Db, Nt>
where
    Db: Database<
        Select<By<Vec<reservation::Link>, read::reservation::InRange>>,
        Ok = Vec<reservation::Link>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vec<reservation::Link>;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        ReservationsInRange { from, to }: ReservationsInRange,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        if to <= from {
            return Err(tracerr::new!(E::InvalidRange));
        }

        self.database()
            .execute(Select(By::new(read::reservation::InRange { from, to })))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
    }
}

/// Error of [`ReservationsInRange`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Window doesn't end after it starts.
    #[display("end of the window must be after its start")]
    InvalidRange,
}

#[cfg(test)]
mod spec {
    use crate::{
        command::CancelReservation,
        domain::{reservation::State, room},
        testing::{book, date, fixture},
        Query as _,
    };

    use super::{ExecutionError, ReservationsInRange};

    fn in_range(from: &str, to: &str) -> ReservationsInRange {
        ReservationsInRange {
            from: date(from),
            to: date(to),
        }
    }

    #[tokio::test]
    async fn lists_touching_bookings_by_check_in() {
        let (svc, _) = fixture(3);
        _ = book(&svc, 2, "2024-06-10", "2024-06-12", State::Confirmed).await;
        _ = book(&svc, 1, "2024-06-03", "2024-06-05", State::Pending).await;
        _ = book(&svc, 3, "2024-06-20", "2024-06-22", State::Confirmed).await;
        let gone = book(&svc, 3, "2024-06-01", "2024-06-02", State::Pending)
            .await
            .id;
        _ = svc.execute(CancelReservation(gone)).await.unwrap();

        let links = svc.execute(in_range("2024-06-01", "2024-06-10")).await.unwrap();

        let rooms: Vec<_> = links.iter().map(|l| l.room_id).collect();
        assert_eq!(rooms, [room::Id::from(1), room::Id::from(2)]);
        assert!(links.iter().all(|l| l.room.is_some()));
    }

    #[tokio::test]
    async fn rejects_empty_window() {
        let (svc, _) = fixture(1);

        for (from, to) in [
            ("2024-06-01", "2024-06-01"),
            ("2024-06-02", "2024-06-01"),
        ] {
            let err = svc.execute(in_range(from, to)).await.unwrap_err();
            assert!(matches!(err.as_ref(), ExecutionError::InvalidRange));
        }
    }
}
