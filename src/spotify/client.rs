use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tokio::time::sleep;

use crate::{
    Res, config,
    management::TokenManager,
    sync::ServiceClient,
    types::{
        AddTracksRequest, CreatePlaylistRequest, LIKED_PLAYLIST, Playlist, RemoveTracksRequest,
        Service, SpotifyPlaylist, SpotifyPlaylistTracksResponse, SpotifyPlaylistsResponse,
        SpotifySavedTracksResponse, SpotifySearchResponse, SpotifyTrack, Track, TrackUri,
    },
    warning,
};

/// Authenticated Spotify Web API client.
pub struct SpotifyClient {
    http: Client,
    tokens: Mutex<TokenManager>,
}

impl SpotifyClient {
    /// Loads the cached Spotify token. Fails when the user has not run
    /// `syncli auth spotify` yet.
    pub async fn load() -> Result<Self, String> {
        let tokens = TokenManager::load(Service::Spotify).await?;
        Ok(Self {
            http: Client::new(),
            tokens: Mutex::new(tokens),
        })
    }

    fn api_url(&self, path: &str) -> Res<Url> {
        Ok(Url::parse(&format!("{}{}", config::spotify_apiurl(), path))?)
    }

    // Sends one API request, transparently refreshing the token and riding
    // out 429 (Retry-After) and 502 responses.
    async fn request(
        &self,
        method: Method,
        url: Url,
        body: Option<serde_json::Value>,
    ) -> Res<reqwest::Response> {
        loop {
            let token = self.tokens.lock().await.get_valid_token().await;
            let mut request = self.http.request(method.clone(), url.clone()).bearer_auth(token);
            if let Some(body) = &body {
                request = request.json(body);
            }

            let response = request.send().await?;

            // check for retry-after header
            if response.status() == StatusCode::TOO_MANY_REQUESTS {
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(1);
                if retry_after <= 120 {
                    sleep(Duration::from_secs(retry_after)).await;
                    continue;
                }
                warning!(
                    "Retry after has reached an abnormal high of {} seconds. Try again later.",
                    retry_after
                );
            }

            match response.error_for_status() {
                Ok(valid_response) => return Ok(valid_response),
                Err(err) => {
                    if err.status() == Some(StatusCode::BAD_GATEWAY) {
                        sleep(Duration::from_secs(10)).await;
                        continue; // retry
                    }
                    return Err(err.into());
                }
            }
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Res<T> {
        let response = self.request(Method::GET, url, None).await?;
        Ok(response.json::<T>().await?)
    }

    /// Lists the user's playlists, paging through the full collection.
    pub async fn list_playlists(&self) -> Res<Vec<Playlist>> {
        let mut playlists = Vec::new();
        let mut url = self.api_url("/me/playlists?limit=50")?;

        loop {
            let page: SpotifyPlaylistsResponse = self.get_json(url).await?;
            playlists.extend(page.items.into_iter().map(|p| Playlist {
                id: p.id,
                name: p.name,
                service: Service::Spotify,
                track_count: p.tracks.map(|t| t.total).unwrap_or(0),
            }));

            match page.next {
                Some(next) => url = Url::parse(&next)?,
                None => break,
            }
        }

        Ok(playlists)
    }

    /// Finds a playlist by name. The reserved name `liked` resolves to the
    /// user's saved tracks.
    pub async fn find_playlist(&self, name: &str) -> Res<Option<Playlist>> {
        if name == LIKED_PLAYLIST {
            let page: SpotifySavedTracksResponse =
                self.get_json(self.api_url("/me/tracks?limit=1")?).await?;
            return Ok(Some(Playlist {
                id: LIKED_PLAYLIST.to_string(),
                name: LIKED_PLAYLIST.to_string(),
                service: Service::Spotify,
                track_count: page.total.unwrap_or(0),
            }));
        }

        let playlists = self.list_playlists().await?;
        Ok(playlists.into_iter().find(|p| p.name == name))
    }

    /// Creates a new private playlist owned by the configured user.
    pub async fn create_playlist(&self, name: &str) -> Res<Playlist> {
        let url = self.api_url(&format!("/users/{}/playlists", config::spotify_user()))?;
        let body = serde_json::to_value(CreatePlaylistRequest {
            name: name.to_string(),
            description: "Synchronized with Tidal by syncli".to_string(),
            public: false,
            collaborative: false,
        })?;

        let response = self.request(Method::POST, url, Some(body)).await?;
        let created: SpotifyPlaylist = response.json().await?;

        Ok(Playlist {
            id: created.id,
            name: created.name,
            service: Service::Spotify,
            track_count: 0,
        })
    }

    fn to_track(track: SpotifyTrack) -> Track {
        Track {
            title: track.name,
            artists: track.artists.into_iter().map(|a| a.name).collect(),
            source_id: track.id.unwrap_or_default(),
            origin: Service::Spotify,
        }
    }

    fn track_uri(track: &Track) -> String {
        format!("spotify:track:{}", track.source_id)
    }
}

#[async_trait]
impl ServiceClient for SpotifyClient {
    fn service(&self) -> Service {
        Service::Spotify
    }

    async fn fetch_playlist_tracks(&self, playlist: &Playlist) -> Res<Vec<Track>> {
        let mut tracks = Vec::new();

        if playlist.id == LIKED_PLAYLIST {
            let mut url = self.api_url("/me/tracks?limit=50")?;
            loop {
                let page: SpotifySavedTracksResponse = self.get_json(url).await?;
                tracks.extend(page.items.into_iter().map(|i| Self::to_track(i.track)));
                match page.next {
                    Some(next) => url = Url::parse(&next)?,
                    None => break,
                }
            }
        } else {
            let mut url = self.api_url(&format!("/playlists/{}/tracks?limit=100", playlist.id))?;
            loop {
                let page: SpotifyPlaylistTracksResponse = self.get_json(url).await?;
                tracks.extend(
                    page.items
                        .into_iter()
                        .filter_map(|i| i.track)
                        .map(Self::to_track),
                );
                match page.next {
                    Some(next) => url = Url::parse(&next)?,
                    None => break,
                }
            }
        }

        Ok(tracks)
    }

    async fn search_tracks(&self, query: &str) -> Res<Vec<Track>> {
        let limit = config::SEARCH_RESULTS_LIMIT.to_string();
        let url = Url::parse_with_params(
            &format!("{}/search", config::spotify_apiurl()),
            &[("q", query), ("type", "track"), ("limit", limit.as_str())],
        )?;

        let response: SpotifySearchResponse = self.get_json(url).await?;
        Ok(response
            .tracks
            .items
            .into_iter()
            .map(Self::to_track)
            .collect())
    }

    async fn add_track(&self, playlist: &Playlist, track: &Track) -> Res<()> {
        if playlist.id == LIKED_PLAYLIST {
            let url = self.api_url(&format!("/me/tracks?ids={}", track.source_id))?;
            self.request(Method::PUT, url, None).await?;
        } else {
            let url = self.api_url(&format!("/playlists/{}/tracks", playlist.id))?;
            let body = serde_json::to_value(AddTracksRequest {
                uris: vec![Self::track_uri(track)],
            })?;
            self.request(Method::POST, url, Some(body)).await?;
        }
        Ok(())
    }

    async fn remove_track(&self, playlist: &Playlist, track: &Track) -> Res<()> {
        if playlist.id == LIKED_PLAYLIST {
            let url = self.api_url(&format!("/me/tracks?ids={}", track.source_id))?;
            self.request(Method::DELETE, url, None).await?;
        } else {
            let url = self.api_url(&format!("/playlists/{}/tracks", playlist.id))?;
            let body = serde_json::to_value(RemoveTracksRequest {
                tracks: vec![TrackUri {
                    uri: Self::track_uri(track),
                }],
            })?;
            self.request(Method::DELETE, url, Some(body)).await?;
        }
        Ok(())
    }
}
