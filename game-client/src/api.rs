use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

use crate::config::Config;
use game_types::{
    ClientGameState, CreateGameResponse, GameApiError, GameId, GameStatus, JoinGameRequest,
    PlayerInfo, StateQuery, StatusResponse, WordRequest,
};

/// Calls the session makes against the game server. The server owns every
/// game rule; implementations only move requests and answers.
#[async_trait]
pub trait RemoteGameApi: Send + Sync {
    async fn create_game(&self) -> Result<GameId, GameApiError>;

    async fn join_game(&self, game_id: &str, name: &str) -> Result<PlayerInfo, GameApiError>;

    async fn pick_word(
        &self,
        game_id: &str,
        word: &str,
        secret_id: &str,
    ) -> Result<GameStatus, GameApiError>;

    async fn get_info(&self, game_id: &str) -> Result<GameStatus, GameApiError>;

    async fn get_state(
        &self,
        game_id: &str,
        secret_id: &str,
    ) -> Result<ClientGameState, GameApiError>;

    async fn guess_word(
        &self,
        game_id: &str,
        word: &str,
        secret_id: &str,
    ) -> Result<ClientGameState, GameApiError>;
}

/// What a failed call was about, used to pick the error variant.
#[derive(Debug, Clone, Copy, Default)]
pub struct CallContext<'a> {
    /// Set only on `join_game`, the one call where an unknown game code is
    /// the user's mistake rather than a broken session.
    pub game_id: Option<&'a str>,
    pub word: Option<&'a str>,
}

pub fn error_for_status(status: StatusCode, context: CallContext<'_>) -> GameApiError {
    match (status, context.game_id, context.word) {
        (StatusCode::NOT_FOUND, Some(game_id), _) => GameApiError::GameNotFound {
            game_id: game_id.to_string(),
        },
        (StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY, _, Some(word)) => {
            GameApiError::InvalidWord {
                word: word.to_string(),
            }
        }
        _ => GameApiError::network(format!("Server returned {}", status)),
    }
}

fn transport_error(error: reqwest::Error) -> GameApiError {
    if error.is_decode() {
        GameApiError::Unexpected {
            message: error.to_string(),
        }
    } else {
        GameApiError::network(error.to_string())
    }
}

/// JSON-over-HTTP implementation of [`RemoteGameApi`].
pub struct HttpGameApi {
    client: Client,
    base_url: String,
}

impl HttpGameApi {
    pub fn new(config: &Config) -> Result<Self, GameApiError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(transport_error)?;

        Ok(Self {
            client,
            base_url: config.server_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        context: CallContext<'_>,
    ) -> Result<T, GameApiError> {
        let response = request.send().await.map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("Request failed with status {}", status);
            return Err(error_for_status(status, context));
        }

        response.json::<T>().await.map_err(transport_error)
    }
}

#[async_trait]
impl RemoteGameApi for HttpGameApi {
    async fn create_game(&self) -> Result<GameId, GameApiError> {
        let response: CreateGameResponse = self
            .send(self.client.post(self.url("game")), CallContext::default())
            .await?;
        Ok(response.game_id)
    }

    async fn join_game(&self, game_id: &str, name: &str) -> Result<PlayerInfo, GameApiError> {
        let request = self
            .client
            .post(self.url(&format!("game/{}/join", game_id)))
            .json(&JoinGameRequest {
                name: name.to_string(),
            });
        self.send(
            request,
            CallContext {
                game_id: Some(game_id),
                word: None,
            },
        )
        .await
    }

    async fn pick_word(
        &self,
        game_id: &str,
        word: &str,
        secret_id: &str,
    ) -> Result<GameStatus, GameApiError> {
        let request = self
            .client
            .post(self.url(&format!("game/{}/word", game_id)))
            .json(&WordRequest {
                word: word.to_string(),
                secret_id: secret_id.to_string(),
            });
        let response: StatusResponse = self
            .send(
                request,
                CallContext {
                    game_id: None,
                    word: Some(word),
                },
            )
            .await?;
        Ok(response.status)
    }

    async fn get_info(&self, game_id: &str) -> Result<GameStatus, GameApiError> {
        let request = self.client.get(self.url(&format!("game/{}/info", game_id)));
        let response: StatusResponse = self.send(request, CallContext::default()).await?;
        Ok(response.status)
    }

    async fn get_state(
        &self,
        game_id: &str,
        secret_id: &str,
    ) -> Result<ClientGameState, GameApiError> {
        let request = self
            .client
            .get(self.url(&format!("game/{}/state", game_id)))
            .query(&StateQuery {
                secret_id: secret_id.to_string(),
            });
        self.send(request, CallContext::default()).await
    }

    async fn guess_word(
        &self,
        game_id: &str,
        word: &str,
        secret_id: &str,
    ) -> Result<ClientGameState, GameApiError> {
        let request = self
            .client
            .post(self.url(&format!("game/{}/guess", game_id)))
            .json(&WordRequest {
                word: word.to_string(),
                secret_id: secret_id.to_string(),
            });
        self.send(
            request,
            CallContext {
                game_id: None,
                word: Some(word),
            },
        )
        .await
    }
}
