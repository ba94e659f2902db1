use clap::{
    CommandFactory, Parser, Subcommand, ValueEnum,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use syncli::{cli, config, error, types};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Authorize with a streaming service
    Auth(AuthOptions),

    /// List playlists on a streaming service
    Playlists(PlaylistsOptions),

    #[clap(about = "Synchronize a playlist between Spotify and Tidal")]
    Sync(SyncOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum ServiceArg {
    Spotify,
    Tidal,
}

impl From<ServiceArg> for types::Service {
    fn from(service: ServiceArg) -> Self {
        match service {
            ServiceArg::Spotify => types::Service::Spotify,
            ServiceArg::Tidal => types::Service::Tidal,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum DirectionArg {
    SpotifyToTidal,
    TidalToSpotify,
    Both,
}

impl From<DirectionArg> for types::SyncDirection {
    fn from(direction: DirectionArg) -> Self {
        match direction {
            DirectionArg::SpotifyToTidal => types::SyncDirection::SpotifyToTidal,
            DirectionArg::TidalToSpotify => types::SyncDirection::TidalToSpotify,
            DirectionArg::Both => types::SyncDirection::Both,
        }
    }
}

#[derive(Parser, Debug, Clone)]
pub struct AuthOptions {
    /// Service to authorize with
    service: ServiceArg,
}

#[derive(Parser, Debug, Clone)]
pub struct PlaylistsOptions {
    /// Service whose playlists to list
    service: ServiceArg,
}

#[derive(Parser, Debug, Clone)]
pub struct SyncOptions {
    /// Spotify playlist name, or "liked" for saved tracks
    #[clap(long)]
    spotify_playlist: String,

    /// Tidal playlist name, or "liked" for favorites (defaults to the
    /// Spotify playlist name)
    #[clap(long)]
    tidal_playlist: Option<String>,

    /// Sync direction
    #[clap(long, value_enum, default_value_t = DirectionArg::SpotifyToTidal)]
    direction: DirectionArg,

    /// Remove destination tracks that are gone from the source
    #[clap(long)]
    cleanup: bool,

    /// Fuzzy match acceptance threshold (0.0 - 1.0)
    #[clap(long, default_value_t = config::DEFAULT_MATCH_THRESHOLD)]
    threshold: f64,

    /// Number of parallel search workers
    #[clap(long, default_value_t = config::DEFAULT_SEARCH_WORKERS)]
    workers: usize,

    /// Apply only exact and above-threshold matches, without confirmations
    #[clap(long)]
    auto: bool,

    /// Create the destination playlist when it does not exist
    #[clap(long)]
    create_missing: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    match cli.command {
        Command::Auth(opt) => cli::auth(opt.service.into()).await,

        Command::Playlists(opt) => cli::playlists(opt.service.into()).await,

        Command::Sync(opt) => {
            let tidal_playlist = opt
                .tidal_playlist
                .unwrap_or_else(|| opt.spotify_playlist.clone());
            cli::sync(cli::SyncParams {
                spotify_playlist: opt.spotify_playlist,
                tidal_playlist,
                direction: opt.direction.into(),
                cleanup: opt.cleanup,
                threshold: opt.threshold,
                workers: opt.workers,
                auto: opt.auto,
                create_missing: opt.create_missing,
            })
            .await
        }

        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
