//! Editor configuration loaded from TOML.
//!
//! ```toml
//! [history]
//! depth = 200
//! group_delay_ms = 750
//! ```
//!
//! Every field is optional; missing values fall back to the defaults.


use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// The input is not valid TOML or does not match the expected shape.
	#[error("TOML parse error: {0}")]
	Toml(#[from] toml::de::Error),

	/// A value parsed but is outside its permitted range.
	#[error("invalid value for '{key}': {reason}")]
	InvalidValue {
		/// Dotted key of the offending field.
		key: &'static str,
		/// What is wrong with it.
		reason: &'static str,
	},
}

/// Top-level editor configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditorConfig {
	/// Undo history settings.
	pub history: HistoryConfig,
}

/// Undo history settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HistoryConfig {
	/// Maximum number of undo groups kept; older groups are evicted.
	pub depth: usize,
	/// Longest pause between two edits that may still share an undo group.
	pub group_delay_ms: u64,
}

impl Default for HistoryConfig {
	fn default() -> Self {
		Self {
			depth: 100,
			group_delay_ms: 500,
		}
	}
}

impl HistoryConfig {
	pub fn group_delay(&self) -> Duration {
		Duration::from_millis(self.group_delay_ms)
	}
}

impl EditorConfig {
	/// Parses and validates configuration from TOML text.
	pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
		let config: Self = toml::from_str(input)?;
		config.validate()?;
		Ok(config)
	}

	/// Checks value ranges that serde cannot express.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.history.depth == 0 {
			return Err(ConfigError::InvalidValue {
				key: "history.depth",
				reason: "must be at least 1",
			});
		}
		Ok(())
	}
}
