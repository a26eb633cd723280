//! Service contains the business logic of the hotel reservation engine.
//!
//! List of available Cargo features:
#![doc = document_features::document_features!()]
#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod command;
pub mod domain;
pub mod infra;
pub mod query;
pub mod read;
#[cfg(test)]
mod testing;

use common::{datetime::UtcOffset, Date, DateTime};
use smart_default::SmartDefault;

#[cfg(doc)]
use infra::{Database, Notifier};

pub use self::{command::Command, query::Query};

/// Offset of the hotel's local time from UTC used by default (UTC-5).
pub const DEFAULT_UTC_OFFSET: UtcOffset = match UtcOffset::from_hms(-5, 0, 0)
{
    Ok(offset) => offset,
    Err(_) => UtcOffset::UTC,
};

/// [`Service`] configuration.
#[derive(Clone, Copy, Debug, SmartDefault)]
pub struct Config {
    /// [`Clock`] telling the current time.
    pub clock: Clock,

    /// Offset of the hotel's local time from UTC, defining "today".
    #[default(DEFAULT_UTC_OFFSET)]
    pub utc_offset: UtcOffset,

    /// Number of months the blocked dates are looked up for, if no end of the
    /// window is provided.
    #[default = 3]
    pub blocked_dates_window_months: u32,

    /// Maximum number of months a calendar window may span.
    #[default = 12]
    pub calendar_max_months: u32,

    /// Indicator whether guests are notified about confirmed reservations.
    #[default = true]
    pub notifications: bool,
}

/// Source of the current time.
#[derive(Clone, Copy, Debug, Default)]
pub enum Clock {
    /// Time of the operating system.
    #[default]
    System,

    /// Time frozen at the provided moment.
    Fixed(DateTime),
}

impl Clock {
    /// Returns the current [`DateTime`] according to this [`Clock`].
    #[must_use]
    pub fn now(&self) -> DateTime {
        match self {
            Self::System => DateTime::now(),
            Self::Fixed(at) => *at,
        }
    }
}

/// Domain service.
#[derive(Clone, Debug)]
pub struct Service<Db, Nt = infra::notifier::Disabled> {
    /// Configuration of this [`Service`].
    config: Config,

    /// [`Database`] of this [`Service`].
    database: Db,

    /// [`Notifier`] of this [`Service`].
    notifier: Nt,
}

impl<Db, Nt> Service<Db, Nt> {
    /// Creates a new [`Service`] with the provided parameters.
    #[must_use]
    pub fn new(config: Config, database: Db, notifier: Nt) -> Self {
        Self {
            config,
            database,
            notifier,
        }
    }

    /// Returns [`Config`] of this [`Service`].
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns [`Database`] of this [`Service`].
    #[must_use]
    pub fn database(&self) -> &Db {
        &self.database
    }

    /// Returns [`Notifier`] of this [`Service`].
    #[must_use]
    pub fn notifier(&self) -> &Nt {
        &self.notifier
    }

    /// Returns the current [`DateTime`].
    #[must_use]
    pub fn now(&self) -> DateTime {
        self.config.clock.now()
    }

    /// Returns today's [`Date`] in the hotel's local time.
    #[must_use]
    pub fn today(&self) -> Date {
        self.now().date_at(self.config.utc_offset)
    }
}
