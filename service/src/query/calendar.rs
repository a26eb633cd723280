//! [`Query`] collection related to the availability [`Calendar`].

use common::{
    operations::{By, Select},
    Date,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::availability::{Calendar, Day, Occupancy},
    infra::{database, Database},
    read, Service,
};
#[cfg(doc)]
use crate::{domain::Room, Config};

use super::Query;

/// [`Query`] for the availability [`Calendar`] of the `[from, to]` window,
/// both ends inclusive.
///
/// If `to` is omitted, the window lasts [`Config::blocked_dates_window_months`]
/// since `from`. Either way, it cannot last longer than
/// [`Config::calendar_max_months`].
#[derive(Clone, Copy, Debug)]
pub struct Window {
    /// First [`Date`] of the window.
    pub from: Date,

    /// Last [`Date`] of the window.
    pub to: Option<Date>,
}

impl<Db, Nt> Query<Window> for Service<Db, Nt>
where
    Db: Database<
            Select<By<read::room::InServiceCount, ()>>,
            Ok = read::room::InServiceCount,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Occupancy>, read::availability::Window>>,
            Ok = Vec<Occupancy>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Calendar;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, query: Window) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let Window { from, to } = query;
        let months = self.config().calendar_max_months;
        let to = match to {
            Some(to) => to,
            None => from
                .add_months(self.config().blocked_dates_window_months)
                .ok_or(E::InvalidRange)
                .map_err(tracerr::wrap!())?,
        };
        if from > to {
            return Err(tracerr::new!(E::InvalidRange));
        }
        if from.add_months(months).map_or(true, |max| to > max) {
            return Err(tracerr::new!(E::WindowTooLong(months)));
        }
        if from < self.today() {
            return Err(tracerr::new!(E::DateInPast));
        }

        let total = self
            .database()
            .execute(Select(By::<read::room::InServiceCount, _>::new(())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let occupancy = self
            .database()
            .execute(Select(By::new(read::availability::Window { from, to })))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(Calendar::new(from, to, total.into(), occupancy))
    }
}

/// [`Query`] for the [`Date`]s of the `[from, to]` window having no free
/// [`Room`].
#[derive(Clone, Copy, Debug)]
pub struct BlockedDates {
    /// First [`Date`] of the window.
    pub from: Date,

    /// Last [`Date`] of the window, if any.
    pub to: Option<Date>,
}

impl<Db, Nt> Query<BlockedDates> for Service<Db, Nt>
where
    Self: Query<Window, Ok = Calendar, Err = Traced<ExecutionError>>,
{
    type Ok = Vec<Date>;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        BlockedDates { from, to }: BlockedDates,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Window { from, to })
            .await
            .map(|c| c.blocked().collect())
            .map_err(tracerr::wrap!())
    }
}

/// [`Query`] for the [`Day`]-by-[`Day`] availability of the `[from, to]`
/// window.
#[derive(Clone, Copy, Debug)]
pub struct DailyAvailability {
    /// First [`Date`] of the window.
    pub from: Date,

    /// Last [`Date`] of the window, if any.
    pub to: Option<Date>,
}

impl<Db, Nt> Query<DailyAvailability> for Service<Db, Nt>
where
    Self: Query<Window, Ok = Calendar, Err = Traced<ExecutionError>>,
{
    type Ok = Vec<Day>;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        DailyAvailability { from, to }: DailyAvailability,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Window { from, to })
            .await
            .map(|c| c.days().collect())
            .map_err(tracerr::wrap!())
    }
}

/// Error of the availability [`Calendar`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// Window starts earlier than today.
    #[display("window cannot start in the past")]
    DateInPast,

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Window ends before it starts.
    #[display("window must not end before it starts")]
    InvalidRange,

    /// Window spans more months than allowed.
    #[display("window cannot span more than {_0} months")]
    WindowTooLong(#[error(not(source))] u32),
}

#[cfg(test)]
mod spec {
    use crate::{
        command::CancelReservation,
        domain::{reservation::State, room},
        testing::{book, date, fixture, fixture_with, room as test_room, TODAY},
        Query as _,
    };

    use super::{BlockedDates, DailyAvailability, ExecutionError, Window};

    fn blocked(from: &str, to: &str) -> BlockedDates {
        BlockedDates {
            from: date(from),
            to: Some(date(to)),
        }
    }

    #[tokio::test]
    async fn blocks_day_occupied_by_every_room() {
        let (svc, _) = fixture(2);
        _ = book(&svc, 1, "2024-05-30", "2024-06-02", State::Confirmed).await;
        _ = book(&svc, 2, "2024-06-02", "2024-06-05", State::Confirmed).await;

        let dates = svc
            .execute(blocked("2024-06-01", "2024-06-03"))
            .await
            .unwrap();

        assert_eq!(dates, [date("2024-06-02")]);
    }

    #[tokio::test]
    async fn counts_confirmed_reservations_only() {
        let (svc, _) = fixture(1);
        _ = book(&svc, 1, "2024-06-01", "2024-06-03", State::Pending).await;

        let days = svc
            .execute(DailyAvailability {
                from: date("2024-06-01"),
                to: Some(date("2024-06-03")),
            })
            .await
            .unwrap();

        assert_eq!(days.len(), 3);
        assert!(days.iter().all(|d| d.rooms_free == 1 && d.is_available()));
    }

    #[tokio::test]
    async fn releases_cancelled_reservations() {
        let (svc, _) = fixture(1);
        let id = book(&svc, 1, "2024-06-01", "2024-06-02", State::Confirmed)
            .await
            .id;
        assert_eq!(
            svc.execute(blocked("2024-06-01", "2024-06-02"))
                .await
                .unwrap()
                .len(),
            2,
        );

        _ = svc.execute(CancelReservation(id)).await.unwrap();

        assert!(svc
            .execute(blocked("2024-06-01", "2024-06-02"))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn counts_rooms_in_service_only() {
        let mut broken = test_room(2);
        broken.status = room::Status::Maintenance;
        let (svc, _) = fixture_with(vec![test_room(1), broken]);
        _ = book(&svc, 1, "2024-06-01", "2024-06-02", State::Confirmed).await;

        let dates = svc
            .execute(blocked("2024-06-01", "2024-06-03"))
            .await
            .unwrap();

        assert_eq!(dates, [date("2024-06-01"), date("2024-06-02")]);
    }

    #[tokio::test]
    async fn defaults_window_to_configured_months() {
        let (svc, _) = fixture(1);

        let calendar = svc
            .execute(Window {
                from: date(TODAY),
                to: None,
            })
            .await
            .unwrap();

        let days: Vec<_> = calendar.days().collect();
        assert_eq!(days.first().map(|d| d.date), Some(date(TODAY)));
        assert_eq!(days.last().map(|d| d.date), Some(date("2024-08-01")));
    }

    #[tokio::test]
    async fn rejects_invalid_windows() {
        let (svc, _) = fixture(1);

        let err = svc
            .execute(blocked("2024-06-03", "2024-06-01"))
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::InvalidRange));

        let err = svc
            .execute(blocked("2024-04-30", "2024-06-01"))
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::DateInPast));
    }

    #[tokio::test]
    async fn caps_window_length() {
        let (svc, _) = fixture(1);

        let days = svc
            .execute(DailyAvailability {
                from: date(TODAY),
                to: Some(date("2025-05-01")),
            })
            .await
            .unwrap();
        assert_eq!(days.last().map(|d| d.date), Some(date("2025-05-01")));

        let err = svc
            .execute(blocked(TODAY, "2025-05-02"))
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::WindowTooLong(12)));
    }
}
