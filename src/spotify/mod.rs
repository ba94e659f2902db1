//! # Spotify Integration Module
//!
//! Interface to the Spotify Web API: OAuth 2.0 PKCE authentication and the
//! playlist, library and search operations the sync engine consumes. All
//! HTTP communication, rate limiting and pagination for Spotify lives here.
//!
//! ## Modules
//!
//! - [`auth`] - OAuth 2.0 PKCE flow: verifier/challenge generation, browser
//!   launch, local callback server handoff, code exchange and token refresh.
//!   PKCE keeps the flow secure without storing a client secret.
//! - [`client`] - [`SpotifyClient`], the authenticated API client. Implements
//!   the engine's `ServiceClient` capabilities (snapshot fetch, track search,
//!   add/remove) plus playlist listing, lookup and creation for the CLI.
//!
//! ## API coverage
//!
//! - `GET /me/playlists` - playlist listing with pagination
//! - `POST /users/{user_id}/playlists` - playlist creation
//! - `GET /playlists/{id}/tracks` - snapshot reads with pagination
//! - `POST`/`DELETE /playlists/{id}/tracks` - track mutation by URI
//! - `GET /me/tracks`, `PUT`/`DELETE /me/tracks` - liked tracks
//! - `GET /search?type=track` - candidate search
//!
//! ## Error handling
//!
//! 429 responses are retried after the `Retry-After` delay, 502 responses
//! after a fixed pause; other HTTP errors are propagated to the caller.
//! Expired tokens are refreshed transparently through the token manager
//! before each request.

pub mod auth;
pub mod client;

pub use client::SpotifyClient;
