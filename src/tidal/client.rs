use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode, Url, header::ETAG};
use serde::de::DeserializeOwned;
use tokio::sync::{Mutex, OnceCell};
use tokio::time::sleep;

use crate::{
    Res, config,
    management::TokenManager,
    sync::ServiceClient,
    types::{
        LIKED_PLAYLIST, Playlist, Service, TidalFavoriteItem, TidalPage, TidalPlaylist,
        TidalSession, TidalTrack, Track,
    },
    warning,
};

/// Page size for playlist and favorites reads.
const PAGE_LIMIT: u64 = 100;

/// Authenticated Tidal v1 API client.
///
/// The session (user id and country code) is resolved lazily on first use
/// and cached for the lifetime of the client.
pub struct TidalClient {
    http: Client,
    tokens: Mutex<TokenManager>,
    session: OnceCell<TidalSession>,
}

impl TidalClient {
    /// Loads the cached Tidal token. Fails when the user has not run
    /// `syncli auth tidal` yet.
    pub async fn load() -> Result<Self, String> {
        let tokens = TokenManager::load(Service::Tidal).await?;
        Ok(Self {
            http: Client::new(),
            tokens: Mutex::new(tokens),
            session: OnceCell::new(),
        })
    }

    async fn session(&self) -> Res<&TidalSession> {
        self.session
            .get_or_try_init(|| async {
                let url = Url::parse(&format!("{}/sessions", config::tidal_apiurl()))?;
                self.get_json::<TidalSession>(url).await
            })
            .await
    }

    // Sends one API request, riding out 429 (Retry-After) and 502 responses.
    // Tidal's playlist mutations are guarded by an ETag precondition, passed
    // through `etag` as an If-None-Match header.
    async fn request(
        &self,
        method: Method,
        url: Url,
        form: Option<Vec<(String, String)>>,
        etag: Option<String>,
    ) -> Res<reqwest::Response> {
        loop {
            let token = self.tokens.lock().await.get_valid_token().await;
            let mut request = self.http.request(method.clone(), url.clone()).bearer_auth(token);
            if let Some(form) = &form {
                request = request.form(form);
            }
            if let Some(etag) = &etag {
                request = request.header("If-None-Match", etag);
            }

            let response = request.send().await?;

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
        let response = self.request(Method::GET, url, None, None).await?;
        Ok(response.json::<T>().await?)
    }

    fn page_url(&self, path: &str, country_code: &str, offset: u64) -> Res<Url> {
        Ok(Url::parse_with_params(
            &format!("{}{}", config::tidal_apiurl(), path),
            &[
                ("limit", PAGE_LIMIT.to_string()),
                ("offset", offset.to_string()),
                ("countryCode", country_code.to_string()),
            ],
        )?)
    }

    async fn fetch_pages<T: DeserializeOwned>(&self, path: &str) -> Res<Vec<T>> {
        let session = self.session().await?.clone();
        let mut items: Vec<T> = Vec::new();
        let mut offset = 0u64;

        loop {
            let url = self.page_url(path, &session.country_code, offset)?;
            let page: TidalPage<T> = self.get_json(url).await?;
            let received = page.items.len() as u64;
            items.extend(page.items);

            offset += received;
            if received == 0 || offset >= page.total_number_of_items {
                break;
            }
        }

        Ok(items)
    }

    /// Lists the user's playlists, paging through the full collection.
    pub async fn list_playlists(&self) -> Res<Vec<Playlist>> {
        let session = self.session().await?.clone();
        let playlists = self
            .fetch_pages::<TidalPlaylist>(&format!("/users/{}/playlists", session.user_id))
            .await?;

        Ok(playlists
            .into_iter()
            .map(|p| Playlist {
                id: p.uuid,
                name: p.title,
                service: Service::Tidal,
                track_count: p.number_of_tracks,
            })
            .collect())
    }

    /// Finds a playlist by name. The reserved name `liked` resolves to the
    /// user's favorite tracks.
    pub async fn find_playlist(&self, name: &str) -> Res<Option<Playlist>> {
        if name == LIKED_PLAYLIST {
            let session = self.session().await?.clone();
            let url = Url::parse_with_params(
                &format!(
                    "{}/users/{}/favorites/tracks",
                    config::tidal_apiurl(),
                    session.user_id
                ),
                &[("limit", "1"), ("countryCode", session.country_code.as_str())],
            )?;
            let page: TidalPage<TidalFavoriteItem> = self.get_json(url).await?;
            return Ok(Some(Playlist {
                id: LIKED_PLAYLIST.to_string(),
                name: LIKED_PLAYLIST.to_string(),
                service: Service::Tidal,
                track_count: page.total_number_of_items,
            }));
        }

        let playlists = self.list_playlists().await?;
        Ok(playlists.into_iter().find(|p| p.name == name))
    }

    /// Creates a new playlist owned by the session user.
    pub async fn create_playlist(&self, name: &str) -> Res<Playlist> {
        let session = self.session().await?.clone();
        let url = Url::parse(&format!(
            "{}/users/{}/playlists",
            config::tidal_apiurl(),
            session.user_id
        ))?;

        let response = self
            .request(
                Method::POST,
                url,
                Some(vec![
                    ("title".to_string(), name.to_string()),
                    (
                        "description".to_string(),
                        "Synchronized with Spotify by syncli".to_string(),
                    ),
                ]),
                None,
            )
            .await?;
        let created: TidalPlaylist = response.json().await?;

        Ok(Playlist {
            id: created.uuid,
            name: created.title,
            service: Service::Tidal,
            track_count: 0,
        })
    }

    // Playlist mutations require the playlist's current ETag as a
    // precondition; stale tags make the API reject the write.
    async fn playlist_etag(&self, playlist_id: &str) -> Res<String> {
        let session = self.session().await?.clone();
        let url = Url::parse_with_params(
            &format!("{}/playlists/{}", config::tidal_apiurl(), playlist_id),
            &[("countryCode", session.country_code.as_str())],
        )?;

        let response = self.request(Method::GET, url, None, None).await?;
        let etag = response
            .headers()
            .get(ETAG)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        Ok(etag)
    }

    fn to_track(track: TidalTrack) -> Track {
        Track {
            title: track.title,
            artists: track.artists.into_iter().map(|a| a.name).collect(),
            source_id: track.id.to_string(),
            origin: Service::Tidal,
        }
    }
}

#[async_trait]
impl ServiceClient for TidalClient {
    fn service(&self) -> Service {
        Service::Tidal
    }

    async fn fetch_playlist_tracks(&self, playlist: &Playlist) -> Res<Vec<Track>> {
        if playlist.id == LIKED_PLAYLIST {
            let session = self.session().await?.clone();
            let items = self
                .fetch_pages::<TidalFavoriteItem>(&format!(
                    "/users/{}/favorites/tracks",
                    session.user_id
                ))
                .await?;
            Ok(items
                .into_iter()
                .map(|i| Self::to_track(i.item))
                .collect())
        } else {
            let tracks = self
                .fetch_pages::<TidalTrack>(&format!("/playlists/{}/tracks", playlist.id))
                .await?;
            Ok(tracks.into_iter().map(Self::to_track).collect())
        }
    }

    async fn search_tracks(&self, query: &str) -> Res<Vec<Track>> {
        let session = self.session().await?.clone();
        let limit = config::SEARCH_RESULTS_LIMIT.to_string();
        let url = Url::parse_with_params(
            &format!("{}/search/tracks", config::tidal_apiurl()),
            &[
                ("query", query),
                ("limit", limit.as_str()),
                ("countryCode", session.country_code.as_str()),
            ],
        )?;

        let page: TidalPage<TidalTrack> = self.get_json(url).await?;
        Ok(page.items.into_iter().map(Self::to_track).collect())
    }

    async fn add_track(&self, playlist: &Playlist, track: &Track) -> Res<()> {
        if playlist.id == LIKED_PLAYLIST {
            let session = self.session().await?.clone();
            let url = Url::parse_with_params(
                &format!(
                    "{}/users/{}/favorites/tracks",
                    config::tidal_apiurl(),
                    session.user_id
                ),
                &[("countryCode", session.country_code.as_str())],
            )?;
            self.request(
                Method::POST,
                url,
                Some(vec![("trackIds".to_string(), track.source_id.clone())]),
                None,
            )
            .await?;
        } else {
            let etag = self.playlist_etag(&playlist.id).await?;
            let url = Url::parse(&format!(
                "{}/playlists/{}/items",
                config::tidal_apiurl(),
                playlist.id
            ))?;
            self.request(
                Method::POST,
                url,
                Some(vec![
                    ("trackIds".to_string(), track.source_id.clone()),
                    ("onDupes".to_string(), "SKIP".to_string()),
                ]),
                Some(etag),
            )
            .await?;
        }
        Ok(())
    }

    async fn remove_track(&self, playlist: &Playlist, track: &Track) -> Res<()> {
        if playlist.id == LIKED_PLAYLIST {
            let session = self.session().await?.clone();
            let url = Url::parse(&format!(
                "{}/users/{}/favorites/tracks/{}",
                config::tidal_apiurl(),
                session.user_id,
                track.source_id
            ))?;
            self.request(Method::DELETE, url, None, None).await?;
            return Ok(());
        }

        // The API removes playlist items by position, so the track id has to
        // be located in the current listing first.
        let tracks = self
            .fetch_pages::<TidalTrack>(&format!("/playlists/{}/tracks", playlist.id))
            .await?;
        let Some(index) = tracks
            .iter()
            .position(|t| t.id.to_string() == track.source_id)
        else {
            return Err(format!(
                "track {} not found in playlist {}",
                track.source_id, playlist.name
            )
            .into());
        };

        let etag = self.playlist_etag(&playlist.id).await?;
        let url = Url::parse(&format!(
            "{}/playlists/{}/items/{}",
            config::tidal_apiurl(),
            playlist.id,
            index
        ))?;
        self.request(Method::DELETE, url, None, Some(etag)).await?;
        Ok(())
    }
}
