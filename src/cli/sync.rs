use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tabled::Table;

use crate::{
    error, info,
    spotify::SpotifyClient,
    success,
    sync::{ServiceClient, diff, executor, pool, validate_options},
    tidal::TidalClient,
    types::{
        DiffReport, Playlist, Service, SummaryTableRow, SyncDirection, SyncOptions, SyncSummary,
        Track,
    },
    utils, warning,
};

/// Maximum characters for a track when rendered in a list or prompt.
const TRACK_DISPLAY_LEN: usize = 57;

/// Maximum number of unresolved tracks listed after the summary table.
const UNRESOLVED_DISPLAY_LIMIT: usize = 10;

#[derive(Debug, Clone)]
pub struct SyncParams {
    pub spotify_playlist: String,
    pub tidal_playlist: String,
    pub direction: SyncDirection,
    pub cleanup: bool,
    pub threshold: f64,
    pub workers: usize,
    pub auto: bool,
    pub create_missing: bool,
}

pub async fn sync(params: SyncParams) {
    let opts = SyncOptions {
        direction: params.direction,
        cleanup: params.cleanup,
        threshold: params.threshold,
        workers: params.workers,
        auto: params.auto,
    };
    if let Err(e) = validate_options(&opts) {
        error!("{}", e);
    }

    let spotify = match SpotifyClient::load().await {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!(
                "Failed to load Spotify token. Please run syncli auth spotify\n Error: {}",
                e
            );
        }
    };
    let tidal = match TidalClient::load().await {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!(
                "Failed to load Tidal token. Please run syncli auth tidal\n Error: {}",
                e
            );
        }
    };

    let spotify_playlist = resolve_spotify_playlist(&spotify, &params).await;
    let tidal_playlist = resolve_tidal_playlist(&tidal, &params).await;

    let pb = spinner("Fetching playlist snapshots...");
    let spotify_tracks = match spotify.fetch_playlist_tracks(&spotify_playlist).await {
        Ok(tracks) => tracks,
        Err(e) => {
            pb.finish_and_clear();
            error!("Failed to fetch Spotify playlist: {}", e);
        }
    };
    let tidal_tracks = match tidal.fetch_playlist_tracks(&tidal_playlist).await {
        Ok(tracks) => tracks,
        Err(e) => {
            pb.finish_and_clear();
            error!("Failed to fetch Tidal playlist: {}", e);
        }
    };
    pb.finish_and_clear();
    info!(
        "Fetched {} Spotify tracks and {} Tidal tracks",
        spotify_tracks.len(),
        tidal_tracks.len()
    );

    // The search bar gets its length lazily: the diff decides how many
    // tracks actually need a live lookup.
    let search_bar = ProgressBar::new(0);
    search_bar.set_style(
        ProgressStyle::with_template("{spinner:.blue} Resolving tracks [{bar:30}] {pos}/{len}")
            .unwrap(),
    );
    let bar = search_bar.clone();
    let progress: pool::ProgressFn = Arc::new(move |completed, total| {
        if bar.length() != Some(total as u64) {
            bar.set_length(total as u64);
        }
        bar.set_position(completed as u64);
    });

    let live = diff::LiveSearch {
        spotify: Arc::clone(&spotify) as Arc<dyn ServiceClient>,
        tidal: Arc::clone(&tidal) as Arc<dyn ServiceClient>,
        progress: Some(progress),
    };

    let mut report =
        match diff::compute_plan(&spotify_tracks, &tidal_tracks, &opts, Some(&live)).await {
            Ok(report) => report,
            Err(e) => {
                search_bar.finish_and_clear();
                error!("{}", e);
            }
        };
    search_bar.finish_and_clear();

    if !params.auto {
        confirm_fuzzy_matches(&mut report);
        confirm_removals(&mut report);
    }

    let summary = if report.plan.is_empty() {
        SyncSummary::default()
    } else {
        executor::execute(
            &report.plan,
            spotify.as_ref(),
            tidal.as_ref(),
            &spotify_playlist,
            &tidal_playlist,
        )
        .await
    };

    print_summary(&params, &report, &summary, &spotify_tracks, &tidal_tracks);
}

async fn resolve_spotify_playlist(client: &SpotifyClient, params: &SyncParams) -> Playlist {
    match client.find_playlist(&params.spotify_playlist).await {
        Ok(Some(playlist)) => playlist,
        Ok(None) => {
            if params.create_missing {
                match client.create_playlist(&params.spotify_playlist).await {
                    Ok(playlist) => {
                        info!("Created Spotify playlist '{}'", playlist.name);
                        playlist
                    }
                    Err(e) => error!("Failed to create Spotify playlist: {}", e),
                }
            } else {
                error!(
                    "Spotify playlist '{}' not found. Pass --create-missing to create it.",
                    params.spotify_playlist
                );
            }
        }
        Err(e) => error!("Failed to look up Spotify playlist: {}", e),
    }
}

async fn resolve_tidal_playlist(client: &TidalClient, params: &SyncParams) -> Playlist {
    match client.find_playlist(&params.tidal_playlist).await {
        Ok(Some(playlist)) => playlist,
        Ok(None) => {
            if params.create_missing {
                match client.create_playlist(&params.tidal_playlist).await {
                    Ok(playlist) => {
                        info!("Created Tidal playlist '{}'", playlist.name);
                        playlist
                    }
                    Err(e) => error!("Failed to create Tidal playlist: {}", e),
                }
            } else {
                error!(
                    "Tidal playlist '{}' not found. Pass --create-missing to create it.",
                    params.tidal_playlist
                );
            }
        }
        Err(e) => error!("Failed to look up Tidal playlist: {}", e),
    }
}

// Lists the fuzzy matches backing add entries and drops them from the plan
// when the user declines; declined matches are reported as ambiguous.
fn confirm_fuzzy_matches(report: &mut DiffReport) {
    if report.fuzzy_adds.is_empty() {
        return;
    }

    info!(
        "{} tracks matched fuzzily and need confirmation:",
        report.fuzzy_adds.len()
    );
    for result in &report.fuzzy_adds {
        let found = result
            .candidate
            .as_ref()
            .map(|c| c.display_name())
            .unwrap_or_default();
        println!(
            "  {} → {} ({:.0}%)",
            utils::truncate_text(&result.track.display_name(), TRACK_DISPLAY_LEN),
            utils::truncate_text(&found, TRACK_DISPLAY_LEN),
            result.confidence * 100.0
        );
    }

    if confirm("Apply these fuzzy matches?", true) {
        return;
    }

    for result in std::mem::take(&mut report.fuzzy_adds) {
        if let Some(candidate) = &result.candidate {
            let adds = match candidate.origin {
                Service::Spotify => &mut report.plan.add_to_spotify,
                Service::Tidal => &mut report.plan.add_to_tidal,
            };
            adds.retain(|t| t.source_id != candidate.source_id);
        }
        report.ambiguous.push(result);
    }
    info!("Fuzzy matches skipped.");
}

fn confirm_removals(report: &mut DiffReport) {
    let removals =
        report.plan.remove_from_spotify.len() + report.plan.remove_from_tidal.len();
    if removals == 0 {
        return;
    }

    info!("{} tracks are no longer present on the other side:", removals);
    for track in report
        .plan
        .remove_from_spotify
        .iter()
        .chain(report.plan.remove_from_tidal.iter())
    {
        println!(
            "  {} ({})",
            utils::truncate_text(&track.display_name(), TRACK_DISPLAY_LEN),
            track.origin
        );
    }

    if !confirm("Remove these tracks?", false) {
        report.plan.remove_from_spotify.clear();
        report.plan.remove_from_tidal.clear();
        info!("Removals skipped.");
    }
}

fn confirm(question: &str, default_yes: bool) -> bool {
    let hint = if default_yes { "[Y/n]" } else { "[y/N]" };
    print!("{} {} ", question, hint);
    let _ = std::io::stdout().flush();

    let mut input = String::new();
    if std::io::stdin().read_line(&mut input).is_err() {
        return false;
    }

    match input.trim().to_lowercase().as_str() {
        "" => default_yes,
        "y" | "yes" => true,
        _ => false,
    }
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb
}

fn print_summary(
    params: &SyncParams,
    report: &DiffReport,
    summary: &SyncSummary,
    spotify_tracks: &[Track],
    tidal_tracks: &[Track],
) {
    let mut rows = vec![
        SummaryTableRow {
            metric: "Spotify tracks".to_string(),
            value: spotify_tracks.len().to_string(),
        },
        SummaryTableRow {
            metric: "Tidal tracks".to_string(),
            value: tidal_tracks.len().to_string(),
        },
        SummaryTableRow {
            metric: "Matched by signature".to_string(),
            value: report.matched.exact.to_string(),
        },
        SummaryTableRow {
            metric: "Matched fuzzily".to_string(),
            value: report.matched.fuzzy.to_string(),
        },
    ];

    if params.direction.includes_spotify_to_tidal() {
        rows.push(SummaryTableRow {
            metric: "Added to Tidal".to_string(),
            value: summary.added_to_tidal.to_string(),
        });
    }
    if params.direction.includes_tidal_to_spotify() {
        rows.push(SummaryTableRow {
            metric: "Added to Spotify".to_string(),
            value: summary.added_to_spotify.to_string(),
        });
    }
    if params.cleanup {
        rows.push(SummaryTableRow {
            metric: "Removed from Tidal".to_string(),
            value: summary.removed_from_tidal.to_string(),
        });
        rows.push(SummaryTableRow {
            metric: "Removed from Spotify".to_string(),
            value: summary.removed_from_spotify.to_string(),
        });
    }

    rows.push(SummaryTableRow {
        metric: "Skipped as ambiguous".to_string(),
        value: report.ambiguous.len().to_string(),
    });
    if !report.failed_searches.is_empty() {
        rows.push(SummaryTableRow {
            metric: "Search errors".to_string(),
            value: report.failed_searches.len().to_string(),
        });
    }
    if !summary.failed.is_empty() {
        rows.push(SummaryTableRow {
            metric: "Failed operations".to_string(),
            value: summary.failed.len().to_string(),
        });
    }

    let table = Table::new(rows);
    println!("{}", table);

    if !report.ambiguous.is_empty() {
        warning!("Not found on the other service:");
        for result in report.ambiguous.iter().take(UNRESOLVED_DISPLAY_LIMIT) {
            println!(
                "  • {}",
                utils::truncate_text(&result.track.display_name(), TRACK_DISPLAY_LEN)
            );
        }
        if report.ambiguous.len() > UNRESOLVED_DISPLAY_LIMIT {
            println!(
                "  ... and {} more",
                report.ambiguous.len() - UNRESOLVED_DISPLAY_LIMIT
            );
        }
    }

    for failure in &report.failed_searches {
        warning!(
            "Search failed for {}: {} (try again later)",
            utils::truncate_text(&failure.track.display_name(), TRACK_DISPLAY_LEN),
            failure.reason
        );
    }
    for op in &summary.failed {
        warning!(
            "Failed to {} {} on {}: {}",
            op.action,
            utils::truncate_text(&op.track.display_name(), TRACK_DISPLAY_LEN),
            op.service,
            op.reason
        );
    }

    success!("Synchronization finished!");
}
