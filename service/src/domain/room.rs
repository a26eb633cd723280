//! [`Room`] definitions.

use std::str::FromStr;

use common::define_kind;
use derive_more::{AsRef, Display, From, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};

use crate::domain::RoomType;

/// Bookable hotel room.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Room {
    /// ID of this [`Room`].
    pub id: Id,

    /// [`Name`] of this [`Room`].
    pub name: Name,

    /// [`Number`] of this [`Room`] as displayed on its door.
    pub number: Number,

    /// Number of guests this [`Room`] hosts.
    pub capacity: u16,

    /// Current [`Status`] of this [`Room`].
    pub status: Status,

    /// Free-form description of this [`Room`].
    pub description: String,

    /// [`RoomType`] this [`Room`] belongs to.
    pub room_type: RoomType,
}

impl Room {
    /// Indicates whether this [`Room`] counts towards the bookable capacity
    /// of the hotel.
    #[must_use]
    pub fn is_in_service(&self) -> bool {
        self.status == Status::Available
    }
}

/// ID of a [`Room`].
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

/// Name of a [`Room`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Name(String);

impl Name {
    /// Creates a new [`Name`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Name`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.len() <= 255
    }
}

impl FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Name`")
    }
}

/// Number of a [`Room`], like `101` or `2B`.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct Number(String);

impl Number {
    /// Creates a new [`Number`] if the given `number` is valid.
    #[must_use]
    pub fn new(number: impl Into<String>) -> Option<Self> {
        let number = number.into();
        Self::check(&number).then_some(Self(number))
    }

    /// Checks whether the given `number` is a valid [`Number`].
    fn check(number: impl AsRef<str>) -> bool {
        let number = number.as_ref();
        number.trim() == number && !number.is_empty() && number.len() <= 32
    }
}

impl FromStr for Number {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Number`")
    }
}

define_kind! {
    #[doc = "Operational status of a [`Room`]."]
    enum Status {
        #[doc = "[`Room`] is in service and may be booked."]
        Available = 1,

        #[doc = "[`Room`] is occupied by guests right now."]
        Occupied = 2,

        #[doc = "[`Room`] is out of service for maintenance."]
        Maintenance = 3,
    }
}
