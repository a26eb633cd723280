//! [`RoomType`] definitions.

use std::str::FromStr;

use common::Money;
use derive_more::{AsRef, Display, From, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};

/// Category of hotel rooms sharing a nightly price and capacities.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RoomType {
    /// ID of this [`RoomType`].
    pub id: Id,

    /// [`Title`] of this [`RoomType`].
    pub title: Title,

    /// Free-form description of this [`RoomType`].
    pub description: String,

    /// Maximum number of adults a room of this [`RoomType`] hosts.
    pub adult_capacity: u16,

    /// Maximum number of children a room of this [`RoomType`] hosts.
    pub child_capacity: u16,

    /// Number of beds in a room of this [`RoomType`].
    pub beds: u16,

    /// Nightly price of a room of this [`RoomType`].
    pub price: Money,
}

/// ID of a [`RoomType`].
#[derive(
    Clone,
    Copy,
    Debug,
    Display,
    Eq,
    From,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Id(i32);

/// Title of a [`RoomType`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Title(String);

impl Title {
    /// Creates a new [`Title`] if the given `title` is valid.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Option<Self> {
        let title = title.into();
        Self::check(&title).then_some(Self(title))
    }

    /// Checks whether the given `title` is a valid [`Title`].
    fn check(title: impl AsRef<str>) -> bool {
        let title = title.as_ref();
        title.trim() == title && !title.is_empty() && title.len() <= 255
    }
}

impl FromStr for Title {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Title`")
    }
}
