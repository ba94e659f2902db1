use tabled::Table;

use crate::{
    error,
    spotify::SpotifyClient,
    tidal::TidalClient,
    types::{Playlist, PlaylistTableRow, Service},
    warning,
};

pub async fn playlists(service: Service) {
    let playlists = match service {
        Service::Spotify => {
            let client = match SpotifyClient::load().await {
                Ok(client) => client,
                Err(e) => {
                    error!(
                        "Failed to load Spotify token. Please run syncli auth spotify\n Error: {}",
                        e
                    );
                }
            };
            client.list_playlists().await
        }
        Service::Tidal => {
            let client = match TidalClient::load().await {
                Ok(client) => client,
                Err(e) => {
                    error!(
                        "Failed to load Tidal token. Please run syncli auth tidal\n Error: {}",
                        e
                    );
                }
            };
            client.list_playlists().await
        }
    };

    match playlists {
        Ok(playlists) => print_table(playlists),
        Err(e) => warning!("Failed to load playlists. Err: {}", e),
    }
}

fn print_table(mut playlists: Vec<Playlist>) {
    playlists.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));

    let rows: Vec<PlaylistTableRow> = playlists
        .into_iter()
        .map(|p| PlaylistTableRow {
            name: p.name,
            id: p.id,
            tracks: p.track_count,
        })
        .collect();

    let table = Table::new(rows);
    println!("{}", table);
}
