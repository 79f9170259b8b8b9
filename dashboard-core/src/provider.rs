use crate::{
    Config,
    error::ProviderError,
    model::{FetchKind, FetchRequest, HistoryGranularity, Location, WeatherPayload},
    provider::tomorrow::TomorrowIoProvider,
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod tomorrow;

/// Outbound calls to a weather API. Every call hits the network.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch_realtime(&self, location: &Location) -> Result<WeatherPayload, ProviderError>;

    async fn fetch_forecast(&self, location: &Location) -> Result<WeatherPayload, ProviderError>;

    async fn fetch_history(
        &self,
        location: &Location,
        granularity: HistoryGranularity,
    ) -> Result<WeatherPayload, ProviderError>;

    /// Dispatch on the request kind.
    async fn fetch(&self, request: &FetchRequest) -> Result<WeatherPayload, ProviderError> {
        match request.kind {
            FetchKind::Realtime => self.fetch_realtime(&request.location).await,
            FetchKind::Forecast => self.fetch_forecast(&request.location).await,
            FetchKind::History(granularity) => {
                self.fetch_history(&request.location, granularity).await
            }
        }
    }
}

/// Construct the provider client from config.
///
/// Never fails on a missing key; the client reports it per request instead.
pub fn provider_from_config(config: &Config) -> Arc<dyn WeatherProvider> {
    Arc::new(TomorrowIoProvider::new(
        config.api_key().map(str::to_owned),
        config.base_url.clone(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Coordinates;

    #[tokio::test]
    async fn provider_from_config_without_key_fails_as_authentication() {
        let cfg = Config::default();
        let provider = provider_from_config(&cfg);

        let request = FetchRequest {
            location: Location::Coordinates(Coordinates { latitude: 1.0, longitude: 2.0 }),
            kind: FetchKind::Realtime,
        };
        let err = provider.fetch(&request).await.unwrap_err();
        assert!(matches!(err, ProviderError::Authentication(_)));
        assert!(err.to_string().contains("No API key configured"));
    }
}
