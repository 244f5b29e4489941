//! Error types for loader configuration.

use thiserror::Error;

/// Errors that can occur when building a loader configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// The TOML document could not be parsed or has unknown keys.
	#[error("TOML parse error: {0}")]
	Parse(#[from] toml::de::Error),

	/// A field holds a value the loader cannot run with.
	#[error("invalid value for `{field}`: {message}")]
	Invalid {
		/// Name of the offending field.
		field: &'static str,
		/// What is wrong with it.
		message: String,
	},
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
