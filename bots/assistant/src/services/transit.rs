//! TDX bus arrival estimates.
//!
//! TDX uses OAuth client credentials. The access token is cached and reused
//! until 60 seconds before it expires; a `401` drops it so the next lookup
//! fetches a fresh one.

use std::time::{Duration, Instant};

use brass::core::TransportError;
use brass::transport::HttpClient;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::city::{normalize_city, transit_code};
use crate::config::TransitConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::policy::ApiFailurePolicy;

/// Tokens are refreshed this long before they expire.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Most arrivals listed in one reply.
const MAX_ARRIVALS: usize = 5;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    refresh_at: Instant,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawArrival {
    stop_name: Name,
    #[serde(default)]
    direction: u8,
    /// Seconds until arrival; absent when no bus is on the way.
    estimate_time: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct Name {
    #[serde(rename = "Zh_tw", default)]
    zh_tw: String,
}

/// One stop's estimate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arrival {
    pub stop: String,
    pub direction: u8,
    pub seconds: u64,
}

impl Arrival {
    fn label(&self) -> String {
        let minutes = self.seconds / 60;
        let eta = if minutes == 0 {
            "進站中".to_string()
        } else {
            format!("{minutes} 分鐘")
        };
        let direction = if self.direction == 0 { "去程" } else { "返程" };
        format!("• {}（{}）: {}", self.stop, direction, eta)
    }
}

/// Renders the soonest arrivals for a route.
pub fn render_arrivals(route: &str, city: &str, arrivals: &[Arrival]) -> String {
    if arrivals.is_empty() {
        return format!("公車 {route}（{city}）目前沒有到站預估");
    }
    let mut lines = vec![format!("公車 {route}（{city}）即將到站:")];
    lines.extend(arrivals.iter().take(MAX_ARRIVALS).map(Arrival::label));
    lines.join("\n")
}

/// Route names such as `307`, `紅5` or `藍1區-1`. Anything else could leave
/// its path segment.
fn is_route_name(route: &str) -> bool {
    !route.is_empty() && route.chars().all(|c| c.is_alphanumeric() || c == '-')
}

/// Splits `307 台北` into route and city.
fn parse_query(query: &str) -> (&str, &str) {
    let query = query.trim();
    match query.split_once(char::is_whitespace) {
        Some((route, city)) => (route, city.trim()),
        None => (query, ""),
    }
}

/// Client for the TDX bus API.
#[derive(Debug)]
pub struct TransitClient {
    http: HttpClient,
    auth_url: String,
    api_base: String,
    client_id: String,
    client_secret: String,
    default_city: String,
    policy: ApiFailurePolicy,
    token: Mutex<Option<CachedToken>>,
}

impl TransitClient {
    pub fn new(http: HttpClient, config: &TransitConfig) -> Self {
        Self {
            http,
            auth_url: config.auth_url.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            default_city: config.default_city.clone(),
            policy: config.on_failure.clone(),
            token: Mutex::new(None),
        }
    }

    /// Returns a cached token or exchanges the client credentials for one.
    ///
    /// The lock is held across the exchange so concurrent lookups share a
    /// single refresh.
    async fn access_token(&self) -> ServiceResult<String> {
        if self.client_id.is_empty() || self.client_secret.is_empty() {
            return Err(ServiceError::NotConfigured {
                service: "transit",
                field: "client_id/client_secret",
            });
        }

        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref()
            && Instant::now() < token.refresh_at
        {
            return Ok(token.value.clone());
        }

        let request = self.http.post(&self.auth_url).form(&[
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ]);
        let response: TokenResponse = self.http.send_json(request).await?;
        let lifetime = Duration::from_secs(response.expires_in).saturating_sub(EXPIRY_MARGIN);
        info!(expires_in = response.expires_in, "Obtained transit access token");

        *cached = Some(CachedToken {
            value: response.access_token.clone(),
            refresh_at: Instant::now() + lifetime,
        });
        Ok(response.access_token)
    }

    async fn invalidate_token(&self) {
        *self.token.lock().await = None;
    }

    /// Arrival estimates for `route` in `city` (official name), soonest first.
    pub async fn arrivals(&self, route: &str, city: &str) -> ServiceResult<Vec<Arrival>> {
        if !is_route_name(route) {
            return Err(ServiceError::NotFound(route.to_string()));
        }
        let code = transit_code(city).ok_or_else(|| ServiceError::NotFound(city.to_string()))?;
        let token = self.access_token().await?;

        let url = format!(
            "{}/v2/Bus/EstimatedTimeOfArrival/City/{code}/{route}",
            self.api_base
        );
        let request = self
            .http
            .get(&url)
            .bearer_auth(token)
            .query(&[("$format", "JSON")]);
        let raw: Vec<RawArrival> = match self.http.send_json(request).await {
            Ok(raw) => raw,
            Err(TransportError::Status { status: 401, body }) => {
                self.invalidate_token().await;
                return Err(TransportError::Status { status: 401, body }.into());
            }
            Err(e) => return Err(e.into()),
        };
        debug!(route, city = code, stops = raw.len(), "Arrival estimates received");

        if raw.is_empty() {
            return Err(ServiceError::NotFound(route.to_string()));
        }
        let mut arrivals: Vec<Arrival> = raw
            .into_iter()
            .filter_map(|a| {
                Some(Arrival {
                    seconds: a.estimate_time?,
                    stop: a.stop_name.zh_tw,
                    direction: a.direction,
                })
            })
            .collect();
        arrivals.sort_by_key(|a| a.seconds);
        Ok(arrivals)
    }

    /// The reply for `公車：<route> [city]`, after the failure policy.
    pub async fn reply(&self, query: &str) -> ServiceResult<String> {
        let (route, city) = parse_query(query);
        let city = normalize_city(city, &self.default_city);
        let result = self
            .arrivals(route, &city)
            .await
            .map(|arrivals| render_arrivals(route, &city, &arrivals));
        self.policy.resolve("transit", result)
    }
}
