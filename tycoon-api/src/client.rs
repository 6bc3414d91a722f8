use reqwest::{Client, Method, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use tycoon_core::config::env_string;
use tycoon_core::{ProgressTotals, Reward};

use crate::error::{ServiceError, ServiceResult};
use crate::service::AuthoritativeService;
use crate::wire::{ApiResponse, CreateUserRequest, FinishGameRequest, FinishedGame, PlayerRecord};

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";

/// JSON-over-HTTP client for the tycoon backend.
#[derive(Clone, Debug)]
pub struct HttpAuthoritativeService {
    client: Client,
    base_url: Url,
}

impl HttpAuthoritativeService {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url.trim())
            .map_err(|e| anyhow::anyhow!("invalid backend url `{base_url}`: {e}"))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("backend url `{base_url}` cannot carry a path");
        }

        Ok(Self {
            client: Client::new(),
            base_url,
        })
    }

    /// Build from `TYCOON_API_URL`, defaulting to a local backend.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::new(&env_string("TYCOON_API_URL", DEFAULT_API_URL))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> ServiceResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ServiceError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send<B, T>(&self, method: Method, url: Url, body: Option<&B>) -> ServiceResult<ApiResponse<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!(%method, %url, "backend request");

        let mut request = self.client.request(method, url.clone());
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ApiResponse<serde_json::Value>>()
                .await
                .ok()
                .and_then(|body| body.message);
            return Err(ServiceError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.json::<ApiResponse<T>>().await?;
        if !body.success {
            return Err(ServiceError::Rejected {
                message: body.message.unwrap_or_else(|| "no reason given".to_owned()),
            });
        }

        debug!(%url, "backend response ok");
        Ok(body)
    }
}

impl AuthoritativeService for HttpAuthoritativeService {
    async fn health(&self) -> ServiceResult<()> {
        let url = self.endpoint(&["api", "health"])?;
        self.send::<(), serde_json::Value>(Method::GET, url, None)
            .await
            .map(|_| ())
    }

    async fn create_or_get_user(&self, request: &CreateUserRequest) -> ServiceResult<PlayerRecord> {
        let url = self.endpoint(&["api", "user"])?;
        self.send::<_, PlayerRecord>(Method::POST, url, Some(request))
            .await?
            .data
            .ok_or(ServiceError::MissingData)
    }

    async fn finish_game(&self, user_id: &str, reward: Reward) -> ServiceResult<FinishedGame> {
        let url = self.endpoint(&["api", "game", "finish"])?;
        let request = FinishGameRequest {
            user_id: user_id.to_owned(),
            coins: reward.coins,
            xp: reward.xp,
        };

        let body = self
            .send::<_, ProgressTotals>(Method::POST, url, Some(&request))
            .await?;
        let totals = body.data.ok_or(ServiceError::MissingData)?;

        Ok(FinishedGame::from_response(
            totals,
            body.level_up,
            body.levels_gained,
        ))
    }

    async fn get_user(&self, user_id: &str) -> ServiceResult<PlayerRecord> {
        let url = self.endpoint(&["api", "user", user_id])?;
        self.send::<(), PlayerRecord>(Method::GET, url, None)
            .await?
            .data
            .ok_or(ServiceError::MissingData)
    }
}

#[cfg(test)]
mod tests {
    use super::HttpAuthoritativeService;

    #[test]
    fn endpoints_join_onto_the_base_path() {
        let service = HttpAuthoritativeService::new("http://localhost:5000/").unwrap();
        let url = service.endpoint(&["api", "game", "finish"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/game/finish");

        let nested = HttpAuthoritativeService::new("https://pizza.test/tycoon").unwrap();
        let url = nested.endpoint(&["api", "user", "abc"]).unwrap();
        assert_eq!(url.as_str(), "https://pizza.test/tycoon/api/user/abc");
    }

    #[test]
    fn user_ids_are_escaped_as_one_segment() {
        let service = HttpAuthoritativeService::new("http://localhost:5000").unwrap();
        let url = service.endpoint(&["api", "user", "a/b c"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/user/a%2Fb%20c");
    }

    #[test]
    fn rejects_unusable_base_urls() {
        assert!(HttpAuthoritativeService::new("not a url").is_err());
        assert!(HttpAuthoritativeService::new("mailto:chef@pizza.test").is_err());
    }
}
