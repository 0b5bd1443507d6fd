//! Presentation settings for claimable amounts.
//!
//! Load from: env `BOOST_YIELD_CONFIG_PATH`, or `./config/boost_yield.json`, or `./boost_yield.json`.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

/// Mint decimals of the reward token.
pub const DEFAULT_DISPLAY_DECIMALS: u8 = 11;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct YieldConfig {
    /// Raw reward units per display unit, as a power of ten.
    #[serde(default = "default_display_decimals")]
    pub display_decimals: u8,
}

fn default_display_decimals() -> u8 {
    DEFAULT_DISPLAY_DECIMALS
}

impl Default for YieldConfig {
    fn default() -> Self {
        Self {
            display_decimals: DEFAULT_DISPLAY_DECIMALS,
        }
    }
}

impl YieldConfig {
    /// Load config from path. Returns default on error or missing file.
    pub fn load_from_path(path: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        match serde_json::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "invalid config, using defaults");
                Self::default()
            }
        }
    }

    /// Load config: env BOOST_YIELD_CONFIG_PATH, then ./config/boost_yield.json, then ./boost_yield.json.
    pub fn load() -> Self {
        if let Ok(path) = std::env::var("BOOST_YIELD_CONFIG_PATH") {
            let p = Path::new(&path);
            if p.exists() {
                return Self::load_from_path(p);
            }
        }
        for candidate in [
            Path::new("./config/boost_yield.json"),
            Path::new("./boost_yield.json"),
        ] {
            if candidate.exists() {
                return Self::load_from_path(candidate);
            }
        }
        Self::default()
    }
}
