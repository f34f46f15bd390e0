//! Subcommands and the shared backend session.

pub mod calendar;
pub mod capacity;
pub mod lookup;

use std::io::Write;

use chrono::{FixedOffset, NaiveDate, Utc};
use pantry_shifts_client::config::get_optional_env;
use pantry_shifts_client::{ApiClient, ApiConfig, ApiError, ConfigError};
use pantry_shifts_core::{InvalidOffset, PantryId, UserId, parse_offset};
use thiserror::Error;

/// Errors that can end a CLI command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Backend settings are missing or malformed.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// `--utc-offset` or `PANTRY_UTC_OFFSET` could not be parsed.
    #[error(transparent)]
    Offset(#[from] InvalidOffset),

    /// `PANTRY_USER_ID` is not a number.
    #[error("Invalid PANTRY_USER_ID: {0}")]
    InvalidUser(String),

    /// The backend rejected or failed a request.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The requested pantry is not in the pantry list.
    #[error("No pantry with id {0}")]
    UnknownPantry(PantryId),

    /// Writing to the terminal failed.
    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),
}

/// A configured client plus the offset used for calendar days.
#[derive(Debug, Clone)]
pub struct Session {
    pub client: ApiClient,
    pub offset: FixedOffset,
}

impl Session {
    /// Build a session from flags, falling back to the environment.
    ///
    /// # Errors
    ///
    /// Returns `CliError` if the URL, identity or offset is invalid.
    pub fn connect(
        api_url: Option<&str>,
        user_id: Option<UserId>,
        utc_offset: Option<&str>,
    ) -> Result<Self, CliError> {
        let mut config = match api_url {
            Some(url) => ApiConfig::new(url)?,
            None => ApiConfig::from_env()?,
        };
        let offset = utc_offset
            .map(str::to_owned)
            .or_else(|| get_optional_env("PANTRY_UTC_OFFSET"));
        if let Some(offset) = offset {
            config = config.with_utc_offset(parse_offset(&offset)?);
        }

        let user_id = match user_id {
            Some(id) => Some(id),
            None => get_optional_env("PANTRY_USER_ID")
                .map(|raw| raw.parse().map_err(|_| CliError::InvalidUser(raw)))
                .transpose()?,
        };

        let client = ApiClient::new(&config)?;
        let client = match user_id {
            Some(id) => client.as_user(id),
            None => client,
        };
        tracing::debug!(api = %config.base_url, user_id = ?user_id, "session ready");

        Ok(Self {
            client,
            offset: config.utc_offset,
        })
    }

    /// Today's date at the session offset.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.offset).date_naive()
    }
}

/// Write `text` to stdout followed by a newline.
pub(crate) fn print(text: &str) -> Result<(), CliError> {
    let mut out = std::io::stdout().lock();
    writeln!(out, "{text}")?;
    out.flush()?;
    Ok(())
}
