use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::StoreResult;
use crate::storage::{load_slot, KeyValueStore};

pub const CONFIG_KEY: &str = "appConfig";

const GEOLOCATION_URL: &str = "https://ipapi.co/json/";

/// Runtime settings. Any field may be overridden through the `appConfig` slot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    pub geolocation_url: String,
    /// Balance every signed-in user is topped up to on dashboard load.
    #[serde(with = "rust_decimal::serde::float")]
    pub minimum_balance: Decimal,
    /// `tracing` filter directive, e.g. `info` or `vestora_frontend=debug`.
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            geolocation_url: GEOLOCATION_URL.to_string(),
            minimum_balance: Decimal::from(145_000),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load(store: &dyn KeyValueStore) -> StoreResult<Self> {
        Ok(load_slot(store, CONFIG_KEY)?.unwrap_or_default())
    }
}
