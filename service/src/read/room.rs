//! [`Room`]-related read definitions.

use common::DateRange;
use derive_more::{From, Into};

#[cfg(doc)]
use crate::domain::{room::Status, Room};

/// Selector of the [`Room`]s in [`Status::Available`] having no active
/// booking colliding with the contained stay.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Vacant(pub DateRange);

/// Number of [`Room`]s in [`Status::Available`].
#[derive(Clone, Copy, Debug, Default, Eq, From, Into, PartialEq)]
pub struct InServiceCount(u32);
