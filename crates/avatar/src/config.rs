use serde::Deserialize;

use crate::error::{ConfigError, Result};

/// Loader settings.
///
/// ```toml
/// avatar_size_px = 48
/// max_in_flight = 16
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoaderConfig {
	/// Edge length used by [`crate::AvatarLoader::request_avatar_default`].
	pub avatar_size_px: u32,
	/// Background computations admitted at once. Requests beyond this are
	/// rejected, not queued.
	pub max_in_flight: usize,
}

impl Default for LoaderConfig {
	fn default() -> Self {
		Self {
			avatar_size_px: 48,
			max_in_flight: 16,
		}
	}
}

impl LoaderConfig {
	/// Parses and validates a TOML document. Missing keys take defaults.
	pub fn from_toml_str(source: &str) -> Result<Self> {
		let config: Self = toml::from_str(source)?;
		config.validate()?;
		Ok(config)
	}

	pub fn validate(&self) -> Result<()> {
		if self.avatar_size_px == 0 {
			return Err(ConfigError::Invalid {
				field: "avatar_size_px",
				message: "must be > 0".to_string(),
			});
		}
		if self.max_in_flight == 0 {
			return Err(ConfigError::Invalid {
				field: "max_in_flight",
				message: "must be > 0".to_string(),
			});
		}
		Ok(())
	}
}
