use std::path::PathBuf;

use chrono::Utc;
use reqwest::Client;

use crate::{config, types::Service, types::Token};

/// Caches one service's OAuth token on disk and refreshes it proactively.
///
/// Tokens are persisted as JSON below the local data directory, one file per
/// service. `get_valid_token` refreshes four minutes before the reported
/// expiry so in-flight requests never race the expiration.
pub struct TokenManager {
    service: Service,
    token: Token,
}

impl TokenManager {
    pub fn new(service: Service, token: Token) -> Self {
        TokenManager { service, token }
    }

    pub async fn load(service: Service) -> Result<Self, String> {
        let path = Self::token_path(service);
        let content = async_fs::read_to_string(&path)
            .await
            .map_err(|e| e.to_string())?;
        let token: Token = serde_json::from_str(&content).map_err(|e| e.to_string())?;
        Ok(Self { service, token })
    }

    pub async fn persist(&self) -> Result<(), String> {
        let path = Self::token_path(self.service);
        if let Some(parent) = path.parent() {
            async_fs::create_dir_all(parent)
                .await
                .map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(&self.token).map_err(|e| e.to_string())?;
        async_fs::write(path, json).await.map_err(|e| e.to_string())
    }

    pub async fn get_valid_token(&mut self) -> String {
        if self.is_expired() {
            if let Ok(new_token) = self.refresh_token().await {
                self.token = new_token;
                let _ = self.persist().await;
            }
        }

        self.token.access_token.clone()
    }

    fn is_expired(&self) -> bool {
        let now = Utc::now().timestamp() as u64;
        now >= self.token.obtained_at + self.token.expires_in - 240
    }

    async fn refresh_token(&self) -> Result<Token, String> {
        let client = Client::new();
        let request = match self.service {
            Service::Spotify => client.post(config::spotify_apitoken_url()).form(&[
                ("grant_type", "refresh_token".to_string()),
                ("refresh_token", self.token.refresh_token.clone()),
                ("client_id", config::spotify_client_id()),
            ]),
            Service::Tidal => client
                .post(format!("{}/token", config::tidal_apiauth_url()))
                .basic_auth(config::tidal_client_id(), Some(config::tidal_client_secret()))
                .form(&[
                    ("grant_type", "refresh_token".to_string()),
                    ("refresh_token", self.token.refresh_token.clone()),
                    ("client_id", config::tidal_client_id()),
                ]),
        };

        let res = request.send().await.map_err(|e| e.to_string())?;
        let json: serde_json::Value = res.json().await.map_err(|e| e.to_string())?;

        Ok(Token {
            access_token: json["access_token"]
                .as_str()
                .unwrap_or_default()
                .to_string(),
            // Some providers omit the refresh token on refresh; keep the old one.
            refresh_token: json["refresh_token"]
                .as_str()
                .unwrap_or(&self.token.refresh_token)
                .to_string(),
            scope: json["scope"].as_str().unwrap_or_default().to_string(),
            expires_in: json["expires_in"].as_i64().unwrap_or(3600) as u64,
            obtained_at: Utc::now().timestamp() as u64,
        })
    }

    fn token_path(service: Service) -> PathBuf {
        let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(format!("syncli/cache/{}/token.json", service));
        path
    }

    pub fn current_token(&self) -> &Token {
        &self.token
    }
}
