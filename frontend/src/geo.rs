//! IP geolocation lookup used to pick the display currency.

use gloo_net::http::Request;
use serde::Deserialize;
use tracing::{info, warn};

use crate::currency::{currency_for_country, CurrencyInfo, USD};
use crate::error::GeoError;

#[derive(Debug, Deserialize)]
struct GeoResponse {
    #[serde(default)]
    country_code: Option<String>,
}

impl GeoResponse {
    fn into_country(self) -> Result<String, GeoError> {
        self.country_code
            .filter(|code| !code.trim().is_empty())
            .ok_or(GeoError::MissingCountry)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DisplayLocale {
    pub country: String,
    pub currency: CurrencyInfo,
}

impl Default for DisplayLocale {
    fn default() -> Self {
        Self {
            country: "US".to_string(),
            currency: USD,
        }
    }
}

impl DisplayLocale {
    /// Countries without a table entry keep their code but display USD.
    pub fn for_country(country_code: &str) -> Self {
        Self {
            country: country_code.to_string(),
            currency: currency_for_country(country_code),
        }
    }
}

pub async fn lookup_country(url: &str) -> Result<String, GeoError> {
    let resp = Request::get(url).send().await?;
    if !resp.ok() {
        return Err(GeoError::Status(resp.status()));
    }
    resp.json::<GeoResponse>().await?.into_country()
}

/// One lookup, no retry. Any failure falls back to US/USD.
pub async fn detect_display_locale(url: &str) -> DisplayLocale {
    match lookup_country(url).await {
        Ok(country) => {
            let locale = DisplayLocale::for_country(&country);
            info!(country = %locale.country, currency = locale.currency.code, "display locale detected");
            locale
        }
        Err(err) => {
            warn!(error = %err, "could not detect location, using USD");
            DisplayLocale::default()
        }
    }
}
