//! The `[bots.assistant]` configuration section.
//!
//! ```toml
//! [bots.assistant]
//! timeout_secs = 10
//!
//! [bots.assistant.weather]
//! api_key = "CWA-XXXXXXXX"      # or BRASS_BOTS__ASSISTANT__WEATHER__API_KEY
//! default_city = "臺北市"
//!
//! [bots.assistant.transit]
//! client_id = "..."
//! client_secret = "..."
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::policy::ApiFailurePolicy;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// Timeout for data-service calls.
    pub timeout_secs: u64,
    pub stock: StockConfig,
    pub weather: WeatherConfig,
    pub transit: TransitConfig,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            stock: StockConfig::default(),
            weather: WeatherConfig::default(),
            transit: TransitConfig::default(),
        }
    }
}

impl AssistantConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

/// TWSE market information service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StockConfig {
    pub api_base: String,
    pub on_failure: ApiFailurePolicy,
}

impl Default for StockConfig {
    fn default() -> Self {
        Self {
            api_base: "https://mis.twse.com.tw".to_string(),
            on_failure: ApiFailurePolicy::notify("查無資料"),
        }
    }
}

/// CWA open-data weather forecasts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub api_base: String,
    /// CWA authorization key.
    pub api_key: String,
    /// Used when the user names no city.
    pub default_city: String,
    pub on_failure: ApiFailurePolicy,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_base: "https://opendata.cwa.gov.tw".to_string(),
            api_key: String::new(),
            default_city: "臺北市".to_string(),
            on_failure: ApiFailurePolicy::Propagate,
        }
    }
}

/// TDX transport data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitConfig {
    /// OAuth token endpoint.
    pub auth_url: String,
    pub api_base: String,
    pub client_id: String,
    pub client_secret: String,
    /// Used when the user names no city.
    pub default_city: String,
    pub on_failure: ApiFailurePolicy,
}

impl Default for TransitConfig {
    fn default() -> Self {
        Self {
            auth_url: "https://tdx.transportdata.tw/auth/realms/TDXConnect/protocol/openid-connect/token"
                .to_string(),
            api_base: "https://tdx.transportdata.tw/api/basic".to_string(),
            client_id: String::new(),
            client_secret: String::new(),
            default_city: "臺北市".to_string(),
            on_failure: ApiFailurePolicy::notify("查無公車資料"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_section() {
        let config: AssistantConfig = serde_json::from_value(serde_json::json!({
            "weather": {"api_key": "k", "on_failure": {"notify": "天氣服務暫時無法使用"}}
        }))
        .unwrap();

        assert_eq!(config.weather.api_key, "k");
        assert_eq!(config.weather.default_city, "臺北市");
        assert_eq!(
            config.weather.on_failure,
            ApiFailurePolicy::notify("天氣服務暫時無法使用")
        );
        assert_eq!(config.stock.on_failure, ApiFailurePolicy::notify("查無資料"));
        assert_eq!(config.timeout(), Duration::from_secs(10));
    }
}
