//! [`Config`]-related definitions.

use std::time;

use common::datetime::UtcOffset;
use config::{builder::DefaultState, ConfigBuilder, ConfigError};
use derive_more::{Display, Error};
use serde::Deserialize;
use smart_default::SmartDefault;

/// Application configuration.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    /// HTTP server configuration.
    pub server: Server,

    /// Reservation engine configuration.
    pub service: Service,

    /// Database configuration.
    pub postgres: Postgres,

    /// Logging configuration.
    pub log: Log,
}

impl Config {
    /// Loads a [`Config`] from the TOML file at the provided `path` (which
    /// may be absent), overriding its values with the `CONF.`-prefixed
    /// environment variables and defaulting the missing ones.
    ///
    /// # Errors
    ///
    /// If the file or any environment variable is malformed.
    pub fn new(path: impl AsRef<str>) -> Result<Self, ConfigError> {
        ConfigBuilder::<DefaultState>::default()
            .add_source(config::File::with_name(path.as_ref()).required(false))
            .add_source(config::Environment::with_prefix("CONF").separator("."))
            .build()?
            .try_deserialize()
    }
}

/// HTTP server configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Server {
    /// Host to listen on.
    #[default("0.0.0.0".to_owned())]
    pub host: String,

    /// Port to listen on.
    #[default(8080)]
    pub port: u16,

    /// [CORS] configuration.
    ///
    /// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
    pub cors: Cors,

    /// Maximum duration of a single request handling.
    #[default(time::Duration::from_secs(30))]
    #[serde(with = "humantime_serde")]
    pub request_timeout: time::Duration,
}

/// [CORS] configuration.
///
/// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Cors {
    /// Origins allowed to call the API.
    #[default(vec!["*".to_owned()])]
    pub origins: Vec<String>,
}

/// Reservation engine configuration.
#[derive(Clone, Copy, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Service {
    /// Offset of the hotel's local time from UTC in hours, defining "today".
    #[default(-5)]
    pub utc_offset_hours: i8,

    /// Number of months the blocked dates are looked up for, if no end of the
    /// window is provided.
    #[default(3)]
    pub blocked_dates_window_months: u32,

    /// Maximum number of months a calendar window may span.
    #[default(12)]
    pub calendar_max_months: u32,

    /// Guest notifications configuration.
    pub notifications: Notifications,
}

impl TryFrom<Service> for service::Config {
    type Error = InvalidUtcOffset;

    fn try_from(value: Service) -> Result<Self, Self::Error> {
        let Service {
            utc_offset_hours,
            blocked_dates_window_months,
            calendar_max_months,
            notifications: Notifications { enabled },
        } = value;

        Ok(Self {
            clock: service::Clock::System,
            utc_offset: UtcOffset::from_hms(utc_offset_hours, 0, 0)
                .map_err(|_| InvalidUtcOffset(utc_offset_hours))?,
            blocked_dates_window_months,
            calendar_max_months,
            notifications: enabled,
        })
    }
}

/// Guest notifications configuration.
#[derive(Clone, Copy, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Notifications {
    /// Indicator whether guests are notified about confirmed reservations.
    #[default(true)]
    pub enabled: bool,
}

/// Configured UTC offset is out of range.
#[derive(Clone, Copy, Debug, Display, Error)]
#[display("`{_0}` hours is not a valid UTC offset")]
pub struct InvalidUtcOffset(#[error(not(source))] pub i8);

/// Database configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Postgres {
    #[default("127.0.0.1".to_owned())]
    pub host: String,

    #[default(5432)]
    pub port: u16,

    #[default("postgres".to_owned())]
    pub user: String,

    #[default("postgres".to_owned())]
    pub password: String,

    /// Name of the database holding the rooms and reservations.
    #[default("hotel".to_owned())]
    pub dbname: String,
}

impl From<Postgres> for service::infra::postgres::Config {
    fn from(value: Postgres) -> Self {
        let Postgres {
            host,
            port,
            user,
            password,
            dbname,
        } = value;

        Self {
            host: Some(host),
            port: Some(port),
            user: Some(user),
            password: Some(password),
            dbname: Some(dbname),
            ..Self::default()
        }
    }
}

/// Logging configuration.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Log {
    /// Maximum level of the written events.
    pub level: LogLevel,
}

/// Level of the written events.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}

#[cfg(test)]
mod spec {
    use super::{Config, Service};

    #[test]
    fn defaults_to_hotel_settings() {
        let conf = Config::default();

        assert_eq!(conf.server.port, 8080);
        assert_eq!(conf.server.request_timeout.as_secs(), 30);
        assert_eq!(conf.service.utc_offset_hours, -5);
        assert_eq!(conf.service.blocked_dates_window_months, 3);
        assert_eq!(conf.service.calendar_max_months, 12);
        assert!(conf.service.notifications.enabled);
    }

    #[test]
    fn converts_into_service_config() {
        let conf = service::Config::try_from(Service::default())
            .expect("valid offset");

        assert_eq!(conf.utc_offset.whole_hours(), -5);
        assert_eq!(conf.blocked_dates_window_months, 3);
        assert_eq!(conf.calendar_max_months, 12);
        assert!(conf.notifications);
    }

    #[test]
    fn rejects_out_of_range_offset() {
        let res = service::Config::try_from(Service {
            utc_offset_hours: 30,
            ..Service::default()
        });

        assert!(res.is_err());
    }
}
