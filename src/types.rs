use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// Reserved playlist name addressing the user's liked tracks
/// (Spotify saved tracks, Tidal favorites).
pub const LIKED_PLAYLIST: &str = "liked";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Service {
    Spotify,
    Tidal,
}

impl std::fmt::Display for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Service::Spotify => write!(f, "spotify"),
            Service::Tidal => write!(f, "tidal"),
        }
    }
}

/// Normalized track record as fetched from one service. Immutable once
/// constructed; re-fetching a playlist produces new records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub title: String,
    pub artists: Vec<String>,
    pub source_id: String,
    pub origin: Service,
}

impl Track {
    pub fn display_name(&self) -> String {
        format!("{} - {}", self.artists.join(", "), self.title)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub service: Service,
    pub track_count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMethod {
    ExactSignature,
    Fuzzy,
    Unmatched,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub track: Track,
    pub candidate: Option<Track>,
    pub confidence: f64,
    pub method: MatchMethod,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncDirection {
    SpotifyToTidal,
    TidalToSpotify,
    Both,
}

impl SyncDirection {
    pub fn includes_spotify_to_tidal(&self) -> bool {
        matches!(self, SyncDirection::SpotifyToTidal | SyncDirection::Both)
    }

    pub fn includes_tidal_to_spotify(&self) -> bool {
        matches!(self, SyncDirection::TidalToSpotify | SyncDirection::Both)
    }
}

#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub direction: SyncDirection,
    pub cleanup: bool,
    pub threshold: f64,
    pub workers: usize,
    pub auto: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            direction: SyncDirection::SpotifyToTidal,
            cleanup: false,
            threshold: crate::config::DEFAULT_MATCH_THRESHOLD,
            workers: crate::config::DEFAULT_SEARCH_WORKERS,
            auto: false,
        }
    }
}

/// The add/remove operations one diff run produced. Tracks in the add list
/// for a destination never appear in its remove list and vice versa.
#[derive(Debug, Clone, Default)]
pub struct SyncPlan {
    pub add_to_spotify: Vec<Track>,
    pub add_to_tidal: Vec<Track>,
    pub remove_from_spotify: Vec<Track>,
    pub remove_from_tidal: Vec<Track>,
}

impl SyncPlan {
    pub fn is_empty(&self) -> bool {
        self.add_to_spotify.is_empty()
            && self.add_to_tidal.is_empty()
            && self.remove_from_spotify.is_empty()
            && self.remove_from_tidal.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct MatchStats {
    pub exact: usize,
    pub fuzzy: usize,
}

#[derive(Debug, Clone)]
pub struct SearchFailure {
    pub track: Track,
    pub reason: String,
}

/// Everything a diff run learned: the plan itself, the fuzzy matches that
/// back its add entries (for confirmation), tracks skipped as ambiguous or
/// confirmed absent, and lookups that failed after retries.
#[derive(Debug, Clone, Default)]
pub struct DiffReport {
    pub plan: SyncPlan,
    pub matched: MatchStats,
    pub fuzzy_adds: Vec<MatchResult>,
    pub ambiguous: Vec<MatchResult>,
    pub failed_searches: Vec<SearchFailure>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    Add,
    Remove,
}

impl std::fmt::Display for SyncAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncAction::Add => write!(f, "add"),
            SyncAction::Remove => write!(f, "remove"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FailedOp {
    pub track: Track,
    pub action: SyncAction,
    pub service: Service,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct SyncSummary {
    pub added_to_spotify: usize,
    pub added_to_tidal: usize,
    pub removed_from_spotify: usize,
    pub removed_from_tidal: usize,
    pub failed: Vec<FailedOp>,
}

#[derive(Tabled)]
pub struct PlaylistTableRow {
    pub name: String,
    pub id: String,
    pub tracks: u64,
}

#[derive(Tabled)]
pub struct SummaryTableRow {
    pub metric: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: String,
    pub scope: String,
    pub expires_in: u64,
    pub obtained_at: u64,
}

#[derive(Debug, Clone)]
pub struct PkceToken {
    pub code_verifier: String,
    pub token: Option<Token>,
}

// --- Spotify Web API wire types ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyArtist {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyTrack {
    pub id: Option<String>,
    pub name: String,
    pub uri: String,
    pub artists: Vec<SpotifyArtist>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyPlaylistItem {
    pub track: Option<SpotifyTrack>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyPlaylistTracksResponse {
    pub items: Vec<SpotifyPlaylistItem>,
    pub next: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifySavedItem {
    pub track: SpotifyTrack,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifySavedTracksResponse {
    pub items: Vec<SpotifySavedItem>,
    pub next: Option<String>,
    pub total: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyTracksRef {
    pub total: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyPlaylist {
    pub id: String,
    pub name: String,
    pub tracks: Option<SpotifyTracksRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyPlaylistsResponse {
    pub items: Vec<SpotifyPlaylist>,
    pub next: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifySearchTracks {
    pub items: Vec<SpotifyTrack>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifySearchResponse {
    pub tracks: SpotifySearchTracks,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
    pub description: String,
    pub public: bool,
    pub collaborative: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTracksRequest {
    pub uris: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackUri {
    pub uri: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveTracksRequest {
    pub tracks: Vec<TrackUri>,
}

// --- Tidal API wire types ---

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TidalSession {
    pub user_id: u64,
    pub country_code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TidalArtist {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TidalTrack {
    pub id: u64,
    pub title: String,
    pub artists: Vec<TidalArtist>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TidalPlaylist {
    pub uuid: String,
    pub title: String,
    pub number_of_tracks: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TidalPage<T> {
    pub items: Vec<T>,
    pub total_number_of_items: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TidalFavoriteItem {
    pub item: TidalTrack,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TidalDeviceAuthResponse {
    pub device_code: String,
    pub user_code: String,
    pub verification_uri_complete: String,
    pub expires_in: u64,
    pub interval: u64,
}
