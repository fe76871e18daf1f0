use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::pricing::Rounding;

/// Editor-wide configuration, shared by every deal. A missing file means
/// defaults; unknown fields are preserved nowhere, this is not user data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub use_decimals: bool,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "USD".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            use_decimals: false,
            currency: default_currency(),
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        serde_json::from_str(&fs::read_to_string(path)?)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn rounding(&self) -> Rounding {
        if self.use_decimals {
            Rounding::Cents
        } else {
            Rounding::Dollars
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = Settings::default();
        assert!(!settings.use_decimals);
        assert_eq!(settings.currency, "USD");
        assert_eq!(settings.rounding(), Rounding::Dollars);

        let settings: Settings = serde_json::from_str(r#"{"use_decimals": true}"#).unwrap();
        assert_eq!(settings.rounding(), Rounding::Cents);
        assert_eq!(settings.currency, "USD");
    }

    #[test]
    fn missing_file_is_defaults() {
        let settings = Settings::load(Path::new("no-such-settings.json")).unwrap();
        assert!(!settings.use_decimals);
    }
}
