//! Fuzzy track matching against a bounded candidate set.
//!
//! The matcher never talks to the network: callers hand it a candidate list,
//! either the other side's snapshot or the result page of a live search, and
//! it picks the best equivalent track or concludes that none exists.

use std::collections::HashSet;

use crate::{
    sync::normalize,
    types::{MatchMethod, MatchResult, Track},
};

/// Token-set overlap ratio (Jaccard). Robust to word reordering:
/// "quick brown fox" and "brown fox quick" score 1.0.
fn token_similarity(a: &str, b: &str) -> f64 {
    let tokens_a: HashSet<&str> = a.split_whitespace().collect();
    let tokens_b: HashSet<&str> = b.split_whitespace().collect();

    if tokens_a.is_empty() && tokens_b.is_empty() {
        return 1.0;
    }
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }

    let intersection = tokens_a.intersection(&tokens_b).count();
    let union = tokens_a.union(&tokens_b).count();

    intersection as f64 / union as f64
}

/// Combined similarity of two normalized strings: the better of Jaro-Winkler
/// (character-level, catches spelling variants) and the token-set ratio
/// (order-insensitive), with a slight preference for the former.
fn combined_similarity(a: &str, b: &str) -> f64 {
    let jw = strsim::jaro_winkler(a, b);
    let token = token_similarity(a, b);
    jw.max(token * 0.95)
}

/// Scores `track` against each candidate and selects the best equivalent.
///
/// A candidate sharing the track's canonical signature wins immediately with
/// confidence 1.0. Otherwise the candidate with the highest combined
/// similarity is accepted when its score reaches `threshold`; score ties are
/// broken in favor of a candidate whose normalized artist list equals the
/// query's, then by candidate order. An empty candidate list yields
/// `Unmatched` with confidence 0.0. Never fails.
pub fn match_track(track: &Track, candidates: &[Track], threshold: f64) -> MatchResult {
    let track_sig = normalize::track_signature(track);

    for candidate in candidates {
        if normalize::track_signature(candidate) == track_sig {
            return MatchResult {
                track: track.clone(),
                candidate: Some(candidate.clone()),
                confidence: 1.0,
                method: MatchMethod::ExactSignature,
            };
        }
    }

    let query_text = normalize::comparison_text(track);
    let query_artists = normalize::normalize_artists(&track.artists);

    let mut best_score = 0.0_f64;
    let mut best: Option<&Track> = None;
    for candidate in candidates {
        let score = combined_similarity(&query_text, &normalize::comparison_text(candidate));

        let wins = match best {
            None => score > 0.0,
            Some(current) => {
                score > best_score
                    || (score == best_score
                        && normalize::normalize_artists(&candidate.artists) == query_artists
                        && normalize::normalize_artists(&current.artists) != query_artists)
            }
        };

        if wins {
            best_score = score;
            best = Some(candidate);
        }
    }

    match best {
        Some(candidate) if best_score >= threshold => MatchResult {
            track: track.clone(),
            candidate: Some(candidate.clone()),
            confidence: best_score,
            method: MatchMethod::Fuzzy,
        },
        _ => MatchResult {
            track: track.clone(),
            candidate: None,
            confidence: best_score,
            method: MatchMethod::Unmatched,
        },
    }
}
