//! Third-party data services used by the commands.

pub mod stock;
pub mod transit;
pub mod weather;

use std::sync::Arc;

use brass::transport::HttpClient;

use crate::config::AssistantConfig;
use crate::error::ServiceResult;

pub use stock::StockClient;
pub use transit::TransitClient;
pub use weather::WeatherClient;

/// The data clients, shared by every command that needs them.
#[derive(Debug, Clone)]
pub struct Services {
    pub stock: Arc<StockClient>,
    pub weather: Arc<WeatherClient>,
    pub transit: Arc<TransitClient>,
}

impl Services {
    /// Builds all clients over one HTTP connection pool.
    pub fn new(config: &AssistantConfig) -> ServiceResult<Self> {
        let http = HttpClient::with_timeout(config.timeout())?;
        Ok(Self {
            stock: Arc::new(StockClient::new(http.clone(), &config.stock)),
            weather: Arc::new(WeatherClient::new(http.clone(), &config.weather)),
            transit: Arc::new(TransitClient::new(http, &config.transit)),
        })
    }
}
