//! Settings
//!
//! Command line flags and environment variables, optionally layered over a YAML
//! settings file. Explicit flags win over the file, the file wins over defaults.

use std::{
    fs,
    io,
    path::{Path, PathBuf},
};

use clap::Parser;
use rusty_money::iso::Currency;
use serde::Deserialize;
use thiserror::Error;

use crate::{cart::AddPolicy, logging::LogFormat, prices::parse_currency, pricing::MissingPrice};

/// Currency used when neither flags nor the settings file name one.
pub const DEFAULT_CURRENCY: &str = "INR";

/// Settings errors
#[derive(Debug, Error)]
pub enum SettingsError {
    /// IO error reading the settings file
    #[error("failed to read settings file {path}: {source}")]
    Io {
        /// Settings file path
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },

    /// YAML parsing error
    #[error("failed to parse settings file: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Unknown currency code
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),
}

/// Grocer command line
#[derive(Debug, Parser)]
#[command(name = "grocer", about = "Interactive grocery ordering", long_about = None)]
pub struct Args {
    /// Directory holding the JSON stores
    #[arg(short, long, env = "GROCER_DATA_DIR", default_value = ".")]
    pub data_dir: PathBuf,

    /// Optional YAML settings file
    #[arg(short, long, env = "GROCER_CONFIG")]
    pub config: Option<PathBuf>,

    /// ISO currency code for prices (INR, GBP, USD, EUR)
    #[arg(long, env = "GROCER_CURRENCY")]
    pub currency: Option<String>,

    /// How zero or negative `add` quantities are handled
    #[arg(long, env = "GROCER_ADD_POLICY", value_enum)]
    pub add_policy: Option<AddPolicy>,

    /// How products without a listed price are totalled
    #[arg(long, env = "GROCER_MISSING_PRICE", value_enum)]
    pub missing_price: Option<MissingPrice>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "warn")]
    pub log_level: String,

    /// Log line format
    #[arg(long, env = "GROCER_LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,

    /// Skip the storage report printed when the session ends
    #[arg(long)]
    pub no_report: bool,
}

/// Settings file contents. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileSettings {
    /// ISO currency code
    pub currency: Option<String>,

    /// Add policy
    pub add_policy: Option<AddPolicy>,

    /// Missing price policy
    pub missing_price: Option<MissingPrice>,
}

impl FileSettings {
    /// Read settings from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns a [`SettingsError`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let contents = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(serde_norway::from_str(&contents)?)
    }
}

/// Resolved settings for one session.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Directory holding the JSON stores
    pub data_dir: PathBuf,

    /// Currency for every price
    pub currency: &'static Currency,

    /// How zero or negative `add` quantities are handled
    pub add_policy: AddPolicy,

    /// How products without a listed price are totalled
    pub missing_price: MissingPrice,

    /// Log filter
    pub log_level: String,

    /// Log line format
    pub log_format: LogFormat,

    /// Whether to print the storage report at the end of the session
    pub show_report: bool,
}

impl Args {
    /// Parse arguments from the process environment, after loading `.env` if present.
    ///
    /// # Errors
    ///
    /// Returns a [`clap::Error`] if the arguments are invalid.
    pub fn load() -> Result<Self, clap::Error> {
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    /// Merge the arguments with the optional settings file.
    ///
    /// # Errors
    ///
    /// Returns a [`SettingsError`] if the settings file is unreadable or the currency is unknown.
    pub fn resolve(self) -> Result<Settings, SettingsError> {
        let file = match &self.config {
            Some(path) => FileSettings::load(path)?,
            None => FileSettings::default(),
        };

        let code = self
            .currency
            .or(file.currency)
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());

        let currency = parse_currency(&code).ok_or(SettingsError::UnknownCurrency(code))?;

        Ok(Settings {
            data_dir: self.data_dir,
            currency,
            add_policy: self.add_policy.or(file.add_policy).unwrap_or_default(),
            missing_price: self.missing_price.or(file.missing_price).unwrap_or_default(),
            log_level: self.log_level,
            log_format: self.log_format,
            show_report: !self.no_report,
        })
    }
}
