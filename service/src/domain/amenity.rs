//! [`Amenity`] definitions.

use std::str::FromStr;

use common::Money;
use derive_more::{AsRef, Display, From, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};

/// Extra service offered by the hotel to its guests, like breakfast or a
/// spa visit.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Amenity {
    /// ID of this [`Amenity`].
    pub id: Id,

    /// [`Name`] of this [`Amenity`].
    pub name: Name,

    /// Free-form description of this [`Amenity`].
    pub description: String,

    /// Listed price of this [`Amenity`].
    ///
    /// Zero for complimentary ones.
    pub price: Money,
}

/// ID of an [`Amenity`].
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

/// Name of an [`Amenity`].
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
