//! TWSE market information quotes.

use brass::transport::HttpClient;
use serde::Deserialize;
use tracing::debug;

use crate::config::StockConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::policy::ApiFailurePolicy;

/// A quote: last trade (or best bid before the first trade) against the
/// previous close.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub code: String,
    pub name: String,
    pub price: f64,
    pub previous_close: f64,
}

impl Quote {
    pub fn change(&self) -> f64 {
        self.price - self.previous_close
    }

    /// Change relative to the previous close, in percent.
    pub fn change_percent(&self) -> f64 {
        if self.previous_close > 0.0 {
            self.change() / self.previous_close * 100.0
        } else {
            0.0
        }
    }

    /// ```text
    /// 台積電 (2330)
    /// 成交價: 585.00
    /// 漲跌: +5.00 (+0.86%)
    /// ```
    pub fn render(&self) -> String {
        format!(
            "{} ({})\n成交價: {:.2}\n漲跌: {}",
            self.name,
            self.code,
            self.price,
            format_change(self.change(), self.change_percent())
        )
    }

    fn from_raw(raw: RawQuote) -> Option<Self> {
        let previous_close = parse_price(&raw.y)?;
        let price = parse_price(&raw.z).or_else(|| {
            raw.b
                .split('_')
                .find(|bid| !bid.is_empty())
                .and_then(parse_price)
        })?;
        Some(Self {
            code: raw.c,
            name: raw.n,
            price,
            previous_close,
        })
    }
}

/// `+5.00 (+0.86%)`: two decimals with an explicit sign.
pub fn format_change(diff: f64, percent: f64) -> String {
    format!("{:+.2} ({:+.2}%)", round2(diff), round2(percent))
}

// Avoids "-0.00" for changes that round to zero.
fn round2(value: f64) -> f64 {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// `"-"` and empty strings mean "no value".
fn parse_price(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
}

#[derive(Debug, Deserialize)]
struct RawResponse {
    #[serde(rename = "msgArray", default)]
    msg_array: Vec<RawQuote>,
}

/// `c` code, `n` name, `z` last trade, `y` previous close, `b` bids.
#[derive(Debug, Deserialize)]
struct RawQuote {
    c: String,
    n: String,
    #[serde(default)]
    z: String,
    #[serde(default)]
    y: String,
    #[serde(default)]
    b: String,
}

/// Client for `getStockInfo.jsp`.
#[derive(Debug)]
pub struct StockClient {
    http: HttpClient,
    api_base: String,
    policy: ApiFailurePolicy,
}

impl StockClient {
    pub fn new(http: HttpClient, config: &StockConfig) -> Self {
        Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            policy: config.on_failure.clone(),
        }
    }

    /// Looks up a listed (`tse`) symbol such as `2330`.
    pub async fn quote(&self, code: &str) -> ServiceResult<Quote> {
        let code = code.trim();
        if code.is_empty() || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ServiceError::NotFound(code.to_string()));
        }

        let url = format!("{}/stock/api/getStockInfo.jsp", self.api_base);
        let channel = format!("tse_{code}.tw");
        let request = self
            .http
            .get(&url)
            .query(&[("ex_ch", channel.as_str()), ("json", "1"), ("delay", "0")]);
        let response: RawResponse = self.http.send_json(request).await?;
        debug!(code, entries = response.msg_array.len(), "Stock quote received");

        response
            .msg_array
            .into_iter()
            .next()
            .and_then(Quote::from_raw)
            .ok_or_else(|| ServiceError::NotFound(code.to_string()))
    }

    /// The reply for `股價：<code>`, after the failure policy.
    pub async fn reply(&self, code: &str) -> ServiceResult<String> {
        let result = self.quote(code).await.map(|q| q.render());
        self.policy.resolve("stock", result)
    }
}
