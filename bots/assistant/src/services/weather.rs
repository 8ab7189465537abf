//! CWA 36-hour forecasts (`F-C0032-001`).

use brass::transport::HttpClient;
use serde::Deserialize;
use tracing::debug;

use crate::city::normalize_city;
use crate::config::WeatherConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::policy::ApiFailurePolicy;

const DATASET: &str = "F-C0032-001";

/// The first forecast period for one location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Forecast {
    pub city: String,
    pub start: String,
    pub end: String,
    /// Weather phenomenon, e.g. `多雲時晴`.
    pub description: String,
    /// Probability of precipitation, percent.
    pub rain_chance: String,
    pub min_temp: String,
    pub max_temp: String,
    /// Comfort index, e.g. `舒適`.
    pub comfort: String,
}

impl Forecast {
    pub fn render(&self) -> String {
        format!(
            "{} {} ~ {}\n天氣: {}\n降雨機率: {}%\n溫度: {}°C ~ {}°C\n體感: {}",
            self.city,
            short_time(&self.start),
            short_time(&self.end),
            self.description,
            self.rain_chance,
            self.min_temp,
            self.max_temp,
            self.comfort
        )
    }

    fn from_location(location: Location) -> ServiceResult<Self> {
        let element = |name: &str| -> ServiceResult<&Period> {
            location
                .weather_element
                .iter()
                .find(|e| e.element_name == name)
                .and_then(|e| e.time.first())
                .ok_or_else(|| ServiceError::Malformed(format!("missing element {name}")))
        };

        let wx = element("Wx")?;
        Ok(Self {
            city: location.location_name.clone(),
            start: wx.start_time.clone(),
            end: wx.end_time.clone(),
            description: wx.parameter.parameter_name.clone(),
            rain_chance: element("PoP")?.parameter.parameter_name.clone(),
            min_temp: element("MinT")?.parameter.parameter_name.clone(),
            max_temp: element("MaxT")?.parameter.parameter_name.clone(),
            comfort: element("CI")?.parameter.parameter_name.clone(),
        })
    }
}

/// `2024-01-01 18:00:00` → `01-01 18:00`
fn short_time(raw: &str) -> &str {
    raw.get(5..16).unwrap_or(raw)
}

#[derive(Debug, Deserialize)]
struct RawResponse {
    records: Records,
}

#[derive(Debug, Deserialize)]
struct Records {
    #[serde(default)]
    location: Vec<Location>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Location {
    location_name: String,
    #[serde(default)]
    weather_element: Vec<Element>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Element {
    element_name: String,
    #[serde(default)]
    time: Vec<Period>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Period {
    start_time: String,
    end_time: String,
    parameter: Parameter,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Parameter {
    parameter_name: String,
}

/// Client for the CWA open-data forecast dataset.
#[derive(Debug)]
pub struct WeatherClient {
    http: HttpClient,
    api_base: String,
    api_key: String,
    default_city: String,
    policy: ApiFailurePolicy,
}

impl WeatherClient {
    pub fn new(http: HttpClient, config: &WeatherConfig) -> Self {
        Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            default_city: config.default_city.clone(),
            policy: config.on_failure.clone(),
        }
    }

    /// Forecast for `city` as typed by the user; empty means the default city.
    pub async fn forecast(&self, city: &str) -> ServiceResult<Forecast> {
        if self.api_key.is_empty() {
            return Err(ServiceError::NotConfigured {
                service: "weather",
                field: "api_key",
            });
        }

        let city = normalize_city(city, &self.default_city);
        let url = format!("{}/api/v1/rest/datastore/{DATASET}", self.api_base);
        let request = self.http.get(&url).query(&[
            ("Authorization", self.api_key.as_str()),
            ("locationName", city.as_str()),
        ]);
        let response: RawResponse = self.http.send_json(request).await?;
        debug!(%city, locations = response.records.location.len(), "Forecast received");

        let location = response
            .records
            .location
            .into_iter()
            .find(|l| l.location_name == city)
            .ok_or(ServiceError::NotFound(city))?;
        Forecast::from_location(location)
    }

    /// The reply for `天氣：<city>`, after the failure policy.
    pub async fn reply(&self, city: &str) -> ServiceResult<String> {
        let result = self.forecast(city).await.map(|f| f.render());
        self.policy.resolve("weather", result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn element(name: &str, value: &str) -> Value {
        json!({
            "elementName": name,
            "time": [{
                "startTime": "2024-01-01 18:00:00",
                "endTime": "2024-01-02 06:00:00",
                "parameter": {"parameterName": value}
            }]
        })
    }

    fn payload(city: &str) -> Value {
        json!({
            "success": "true",
            "records": {
                "datasetDescription": "三十六小時天氣預報",
                "location": [{
                    "locationName": city,
                    "weatherElement": [
                        element("Wx", "多雲時晴"),
                        element("PoP", "20"),
                        element("MinT", "17"),
                        element("CI", "稍有寒意至舒適"),
                        element("MaxT", "22")
                    ]
                }]
            }
        })
    }

    fn client(server: &MockServer, api_key: &str) -> WeatherClient {
        let config = WeatherConfig {
            api_base: server.uri(),
            api_key: api_key.to_string(),
            ..WeatherConfig::default()
        };
        WeatherClient::new(HttpClient::new().unwrap(), &config)
    }

    #[tokio::test]
    async fn test_forecast_normalizes_city() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/rest/datastore/F-C0032-001"))
            .and(query_param("Authorization", "key"))
            .and(query_param("locationName", "臺中市"))
            .respond_with(ResponseTemplate::new(200).set_body_json(payload("臺中市")))
            .expect(1)
            .mount(&server)
            .await;

        let reply = client(&server, "key").reply("台中").await.unwrap();
        assert_eq!(
            reply,
            "臺中市 01-01 18:00 ~ 01-02 06:00\n天氣: 多雲時晴\n降雨機率: 20%\n溫度: 17°C ~ 22°C\n體感: 稍有寒意至舒適"
        );
    }

    #[tokio::test]
    async fn test_empty_city_uses_default() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("locationName", "臺北市"))
            .respond_with(ResponseTemplate::new(200).set_body_json(payload("臺北市")))
            .expect(1)
            .mount(&server)
            .await;

        let forecast = client(&server, "key").forecast("").await.unwrap();
        assert_eq!(forecast.city, "臺北市");
        assert_eq!(forecast.rain_chance, "20");
    }

    #[tokio::test]
    async fn test_failures_propagate_by_default() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
            .mount(&server)
            .await;

        let weather = client(&server, "bad-key");
        assert!(matches!(
            weather.reply("臺北市").await,
            Err(ServiceError::Transport(_))
        ));

        let unconfigured = client(&server, "");
        assert!(matches!(
            unconfigured.reply("臺北市").await,
            Err(ServiceError::NotConfigured { .. })
        ));
    }

    #[tokio::test]
    async fn test_unknown_location() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"success": "true", "records": {"location": []}})),
            )
            .mount(&server)
            .await;

        assert!(matches!(
            client(&server, "key").forecast("東京").await,
            Err(ServiceError::NotFound(city)) if city == "東京"
        ));
    }
}
