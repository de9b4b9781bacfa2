//! # Token Configuration & Constants
//!
//! The reference GPTG parameters live here, together with [`TokenConfig`],
//! the genesis description used to create a ledger. Changing any of these
//! after genesis has no effect on an existing ledger: metadata is fixed at
//! construction and the initial supply is issued exactly once.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::ledger::Amount;

// ---------------------------------------------------------------------------
// Reference Token
// ---------------------------------------------------------------------------

/// Display name of the reference token. The trailing period is part of the
/// deployed name.
pub const TOKEN_NAME: &str = "GPT Guru Token.";

/// Ticker symbol of the reference token.
pub const TOKEN_SYMBOL: &str = "GPTG";

/// Decimal places: one whole GPTG is `10^18` base units.
pub const TOKEN_DECIMALS: u8 = 18;

/// Initial supply in whole tokens.
pub const INITIAL_SUPPLY_TOKENS: Amount = 2_000_000_000;

/// Initial supply in base units (`2e9 * 10^18`). Does not fit in a `u64`,
/// which is why amounts are `u128`.
pub const INITIAL_SUPPLY: Amount = INITIAL_SUPPLY_TOKENS * 10u128.pow(TOKEN_DECIMALS as u32);

/// Largest decimals value whose unit (`10^decimals`) fits in a `u128`.
pub const MAX_DECIMALS: u8 = 38;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised while loading or validating a [`TokenConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// The config file was not valid JSON for a [`TokenConfig`].
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// The config parsed but describes an unusable token.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ---------------------------------------------------------------------------
// TokenConfig
// ---------------------------------------------------------------------------

/// Genesis parameters for a ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Human-readable token name.
    pub name: String,
    /// Ticker symbol.
    pub symbol: String,
    /// Number of decimal places used for display.
    pub decimals: u8,
    /// Supply credited to the issuer at genesis, in base units.
    pub initial_supply: Amount,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            name: TOKEN_NAME.to_string(),
            symbol: TOKEN_SYMBOL.to_string(),
            decimals: TOKEN_DECIMALS,
            initial_supply: INITIAL_SUPPLY,
        }
    }
}

impl TokenConfig {
    /// Reads and validates a JSON genesis file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config: TokenConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the config describes a usable token.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Invalid("name must not be empty".into()));
        }
        if self.symbol.trim().is_empty() {
            return Err(ConfigError::Invalid("symbol must not be empty".into()));
        }
        if self.decimals > MAX_DECIMALS {
            return Err(ConfigError::Invalid(format!(
                "decimals must be at most {MAX_DECIMALS}, got {}",
                self.decimals
            )));
        }
        Ok(())
    }

    /// Base units in one whole token, or `None` if `decimals` is out of range.
    pub fn unit(&self) -> Option<Amount> {
        10u128.checked_pow(u32::from(self.decimals))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reference_supply_is_two_billion_tokens() {
        assert_eq!(INITIAL_SUPPLY, 2_000_000_000_000_000_000_000_000_000);
        assert!(INITIAL_SUPPLY > u64::MAX as u128);
    }

    #[test]
    fn default_is_reference_token() {
        let config = TokenConfig::default();
        assert_eq!(config.name, "GPT Guru Token.");
        assert_eq!(config.symbol, "GPTG");
        assert_eq!(config.decimals, 18);
        assert_eq!(config.initial_supply, INITIAL_SUPPLY);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn max_decimals_unit_fits() {
        let mut config = TokenConfig::default();
        config.decimals = MAX_DECIMALS;
        assert!(config.unit().is_some());
        config.decimals = MAX_DECIMALS + 1;
        assert!(config.unit().is_none());
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_symbol_rejected() {
        let config = TokenConfig {
            symbol: "  ".into(),
            ..TokenConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn loads_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"name":"Test","symbol":"TST","decimals":6,"initial_supply":1000000}}"#
        )
        .unwrap();

        let config = TokenConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.symbol, "TST");
        assert_eq!(config.decimals, 6);
        assert_eq!(config.initial_supply, 1_000_000);
    }

    #[test]
    fn malformed_json_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();
        assert!(matches!(
            TokenConfig::from_json_file(file.path()),
            Err(ConfigError::Parse(_))
        ));
    }
}
