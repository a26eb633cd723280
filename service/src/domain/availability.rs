//! Per-day availability of the hotel rooms.

use std::collections::BTreeSet;

use common::{date::Days, Date, DateRange};

#[cfg(doc)]
use crate::domain::{reservation, Reservation};
use crate::domain::room;

/// [`room::Id`] held for a stay by an active [`reservation::Link`] of a
/// confirmed [`Reservation`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Occupancy {
    /// ID of the occupied room.
    pub room_id: room::Id,

    /// Stay the room is occupied for.
    pub stay: DateRange,
}

/// Availability of the hotel on a single [`Date`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Day {
    /// Calendar [`Date`] of this [`Day`].
    pub date: Date,

    /// Number of rooms nobody occupies on this [`Day`].
    pub rooms_free: u32,
}

impl Day {
    /// Indicates whether at least one room is free on this [`Day`].
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.rooms_free > 0
    }

    /// Indicates whether every room is occupied on this [`Day`].
    #[must_use]
    pub fn is_blocked(&self) -> bool {
        !self.is_available()
    }
}

/// Calendar of [`Day`]s in the `[from, to]` window, both ends inclusive.
///
/// A room is occupied on a [`Day`] if any of its [`Occupancy`] stays touches
/// it, counting both the check-in and the check-out days.
#[derive(Clone, Debug)]
pub struct Calendar {
    /// First [`Date`] of this [`Calendar`].
    from: Date,

    /// Last [`Date`] of this [`Calendar`].
    to: Date,

    /// Number of rooms in service.
    total: u32,

    /// [`Occupancy`] touching the window of this [`Calendar`].
    occupancy: Vec<Occupancy>,
}

impl Calendar {
    /// Creates a new [`Calendar`] over `total` rooms in service.
    ///
    /// [`Occupancy`] not touching the `[from, to]` window is dropped.
    #[must_use]
    pub fn new(
        from: Date,
        to: Date,
        total: u32,
        occupancy: impl IntoIterator<Item = Occupancy>,
    ) -> Self {
        Self {
            from,
            to,
            total,
            occupancy: occupancy
                .into_iter()
                .filter(|o| o.stay.touches_window(from, to))
                .collect(),
        }
    }

    /// Lazily iterates over every [`Day`] of this [`Calendar`].
    ///
    /// Each call starts over from the first [`Date`].
    #[must_use]
    pub fn days(&self) -> DaysIter<'_> {
        DaysIter {
            calendar: self,
            dates: self.from.through(self.to),
        }
    }

    /// Lazily iterates over the blocked [`Date`]s of this [`Calendar`].
    pub fn blocked(&self) -> impl Iterator<Item = Date> + '_ {
        self.days().filter(Day::is_blocked).map(|d| d.date)
    }

    /// Computes the [`Day`] of the provided [`Date`].
    fn day(&self, date: Date) -> Day {
        let occupied: BTreeSet<_> = self
            .occupancy
            .iter()
            .filter(|o| o.stay.touches(date))
            .map(|o| o.room_id)
            .collect();
        let occupied = u32::try_from(occupied.len()).unwrap_or(u32::MAX);
        Day {
            date,
            rooms_free: self.total.saturating_sub(occupied),
        }
    }
}

/// Iterator over the [`Day`]s of a [`Calendar`].
#[derive(Clone, Debug)]
pub struct DaysIter<'c> {
    /// [`Calendar`] being iterated.
    calendar: &'c Calendar,

    /// Remaining [`Date`]s.
    dates: Days,
}

impl Iterator for DaysIter<'_> {
    type Item = Day;

    fn next(&mut self) -> Option<Self::Item> {
        self.dates.next().map(|d| self.calendar.day(d))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.dates.size_hint()
    }
}

impl ExactSizeIterator for DaysIter<'_> {}

/// Indicates whether the `stay` collides with none of the `booked` ones.
///
/// Back-to-back stays don't collide: the check-out day is free.
#[must_use]
pub fn is_free<'b>(
    stay: &DateRange,
    booked: impl IntoIterator<Item = &'b DateRange>,
) -> bool {
    booked.into_iter().all(|b| !b.overlaps(stay))
}

#[cfg(test)]
mod spec {
    use common::{Date, DateRange};

    use crate::domain::room;

    use super::{is_free, Calendar, Occupancy};

    fn date(s: &str) -> Date {
        s.parse().unwrap()
    }

    fn stay(from: &str, to: &str) -> DateRange {
        DateRange::new(date(from), date(to)).unwrap()
    }

    fn occupied(room: i32, from: &str, to: &str) -> Occupancy {
        Occupancy {
            room_id: room::Id::from(room),
            stay: stay(from, to),
        }
    }

    #[test]
    fn back_to_back_stays_are_free() {
        let booked = [stay("2024-06-01", "2024-06-03")];

        assert!(is_free(&stay("2024-06-03", "2024-06-05"), &booked));
        assert!(is_free(&stay("2024-05-29", "2024-06-01"), &booked));
    }

    #[test]
    fn overlapping_stays_collide() {
        let booked = [stay("2024-06-01", "2024-06-04")];

        for (from, to) in [
            ("2024-06-03", "2024-06-06"),
            ("2024-05-30", "2024-06-02"),
            ("2024-06-02", "2024-06-03"),
            ("2024-05-01", "2024-07-01"),
        ] {
            assert!(!is_free(&stay(from, to), &booked), "{from}..{to}");
        }
    }

    #[test]
    fn blocks_only_fully_occupied_days() {
        // Both rooms are held only on the 2nd, by stays ending/starting there.
        let calendar = Calendar::new(
            date("2024-06-01"),
            date("2024-06-03"),
            2,
            [
                occupied(1, "2024-05-30", "2024-06-02"),
                occupied(2, "2024-06-02", "2024-06-05"),
            ],
        );
        let days: Vec<_> = calendar.days().collect();

        assert_eq!(days.len(), 3);
        assert_eq!(
            days.iter().map(|d| d.rooms_free).collect::<Vec<_>>(),
            [1, 0, 1],
        );
        assert_eq!(calendar.blocked().collect::<Vec<_>>(), [date("2024-06-02")]);
    }

    #[test]
    fn counts_each_room_once_per_day() {
        let calendar = Calendar::new(
            date("2024-06-01"),
            date("2024-06-01"),
            2,
            [
                occupied(1, "2024-05-30", "2024-06-01"),
                occupied(1, "2024-06-01", "2024-06-03"),
            ],
        );
        let day = calendar.days().next().unwrap();

        assert_eq!(day.rooms_free, 1);
        assert!(day.is_available());
    }

    #[test]
    fn never_underflows_capacity() {
        let calendar = Calendar::new(
            date("2024-06-01"),
            date("2024-06-02"),
            1,
            [
                occupied(1, "2024-06-01", "2024-06-02"),
                occupied(2, "2024-06-01", "2024-06-02"),
            ],
        );

        assert!(calendar.days().all(|d| d.rooms_free == 0 && d.is_blocked()));
    }

    #[test]
    fn is_restartable_and_empty_for_inverted_window() {
        let calendar =
            Calendar::new(date("2024-06-01"), date("2024-06-05"), 3, []);

        assert_eq!(calendar.days().count(), 5);
        assert_eq!(calendar.days().count(), 5);
        assert_eq!(calendar.blocked().count(), 0);

        let inverted =
            Calendar::new(date("2024-06-05"), date("2024-06-01"), 3, []);
        assert_eq!(inverted.days().count(), 0);
    }

    #[test]
    fn without_rooms_every_day_is_blocked() {
        let calendar =
            Calendar::new(date("2024-06-01"), date("2024-06-03"), 0, []);

        assert_eq!(calendar.blocked().count(), 3);
    }
}
