use std::time::{Duration, Instant};

use chrono::Utc;
use reqwest::Client;
use serde_json::Value;
use tokio::time::sleep;

use crate::{
    config, error, info,
    management::TokenManager,
    success,
    types::{Service, TidalDeviceAuthResponse, Token},
    warning,
};

/// Scope requested for the device-code login: read and write access to the
/// user's playlists and favorites.
const TIDAL_SCOPE: &str = "r_usr w_usr";

/// Runs the OAuth 2.0 device-code flow against Tidal.
///
/// Requests a device authorization, opens the verification page in the
/// user's browser and polls the token endpoint until the login is confirmed
/// or the device code expires. On success the token is persisted through the
/// token manager.
pub async fn auth() {
    let client = Client::new();

    let device = match request_device_authorization(&client).await {
        Ok(device) => device,
        Err(e) => error!("Failed to start Tidal device authorization: {}", e),
    };

    let mut verification_url = device.verification_uri_complete.clone();
    if !verification_url.starts_with("http") {
        verification_url = format!("https://{}", verification_url);
    }

    info!(
        "Confirm the Tidal login in your browser (code {})",
        device.user_code
    );
    if webbrowser::open(&verification_url).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            verification_url
        );
    }

    match wait_for_token(&client, &device).await {
        Some(token) => {
            let token_manager = TokenManager::new(Service::Tidal, token);
            if let Err(e) = token_manager.persist().await {
                error!("Failed to save token to cache: {}", e);
            }

            success!("Tidal authentication successful!");
        }
        None => {
            error!("Tidal authentication failed or timed out.");
        }
    }
}

async fn request_device_authorization(
    client: &Client,
) -> Result<TidalDeviceAuthResponse, reqwest::Error> {
    let res = client
        .post(format!(
            "{}/device_authorization",
            config::tidal_apiauth_url()
        ))
        .form(&[
            ("client_id", config::tidal_client_id()),
            ("scope", TIDAL_SCOPE.to_string()),
        ])
        .send()
        .await?
        .error_for_status()?;

    res.json::<TidalDeviceAuthResponse>().await
}

// Polls the token endpoint at the interval the device authorization
// dictates. Error responses mean the user has not confirmed yet.
async fn wait_for_token(client: &Client, device: &TidalDeviceAuthResponse) -> Option<Token> {
    let interval = Duration::from_secs(device.interval.max(1));
    let deadline = Instant::now() + Duration::from_secs(device.expires_in);

    while Instant::now() < deadline {
        sleep(interval).await;

        let res = client
            .post(format!("{}/token", config::tidal_apiauth_url()))
            .basic_auth(
                config::tidal_client_id(),
                Some(config::tidal_client_secret()),
            )
            .form(&[
                ("client_id", config::tidal_client_id()),
                ("device_code", device.device_code.clone()),
                (
                    "grant_type",
                    "urn:ietf:params:oauth:grant-type:device_code".to_string(),
                ),
                ("scope", TIDAL_SCOPE.to_string()),
            ])
            .send()
            .await;

        let Ok(response) = res else { continue };
        if !response.status().is_success() {
            continue;
        }

        let Ok(json) = response.json::<Value>().await else {
            continue;
        };

        return Some(Token {
            access_token: json["access_token"]
                .as_str()
                .unwrap_or_default()
                .to_string(),
            refresh_token: json["refresh_token"]
                .as_str()
                .unwrap_or_default()
                .to_string(),
            scope: json["scope"].as_str().unwrap_or_default().to_string(),
            expires_in: json["expires_in"].as_i64().unwrap_or(3600) as u64,
            obtained_at: Utc::now().timestamp() as u64,
        });
    }

    None
}
