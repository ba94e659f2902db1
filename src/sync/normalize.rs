//! Canonical track signatures.
//!
//! Services format the same song differently: "Shape of You (Radio Edit)",
//! "shape of you", "Shape Of You - Remastered". The signature computed here
//! folds those differences away so that equality comparison finds the
//! matches cheaply. Signatures are only ever compared, never displayed.

use std::collections::HashSet;

use unicode_normalization::UnicodeNormalization;

use crate::types::Track;

/// Separator between the title part and the artist part of a signature.
const SIGNATURE_SEPARATOR: &str = "::";

/// Tokens that mark a parenthetical annotation or dash suffix as a
/// re-packaging of the same recording rather than a different song.
const STYLISTIC_TOKENS: &[&str] = &[
    "remaster",
    "remastered",
    "remix",
    "mix",
    "version",
    "edit",
    "single",
    "album",
    "radio",
    "live",
    "acoustic",
    "unplugged",
    "mono",
    "stereo",
    "deluxe",
    "bonus",
    "track",
    "demo",
    "instrumental",
    "karaoke",
    "extended",
    "original",
    "explicit",
    "clean",
    "edition",
    "anniversary",
    "expanded",
    "re",
    "recorded",
    "rerecorded",
    "audio",
    "video",
    "official",
    "from",
];

/// Patterns that introduce featuring credits; annotations starting with one
/// of these never distinguish two recordings of the same song.
const FEATURING_TOKENS: &[&str] = &["feat", "feat.", "ft", "ft.", "featuring", "with"];

/// Noise phrases removed from a folded title wherever they appear.
const NOISE_PHRASES: &[&str] = &[
    "official audio",
    "official video",
    "radio edit",
    "album version",
    "single version",
    "original mix",
];

/// Unicode-folds a string for comparison: NFKC normalization, lowercasing,
/// punctuation replaced by spaces (apostrophes dropped so "don't" and "dont"
/// agree), whitespace collapsed.
pub fn fold(text: &str) -> String {
    let normalized: String = text.nfkc().collect();

    normalized
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c.is_whitespace() {
                c
            } else if c == '\'' || c == '’' {
                '\0'
            } else {
                ' '
            }
        })
        .filter(|&c| c != '\0')
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

// Splits a title into the text outside parentheses/brackets and the list of
// annotation contents found inside them. Unbalanced brackets keep their text.
fn split_annotations(title: &str) -> (String, Vec<String>) {
    let mut outside = String::new();
    let mut annotations = Vec::new();
    let mut current = String::new();
    let mut depth = 0u32;

    for c in title.chars() {
        match c {
            '(' | '[' => {
                if depth == 0 {
                    current.clear();
                } else {
                    current.push(c);
                }
                depth += 1;
            }
            ')' | ']' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    if !current.trim().is_empty() {
                        annotations.push(current.trim().to_string());
                    }
                    current.clear();
                } else {
                    current.push(c);
                }
            }
            _ if depth > 0 => current.push(c),
            _ => outside.push(c),
        }
    }

    // Unbalanced opening bracket: whatever followed it is part of the title.
    if !current.trim().is_empty() {
        outside.push(' ');
        outside.push_str(&current);
    }

    (outside.trim().to_string(), annotations)
}

/// Decides whether an annotation is noise ("Remastered 2011", "Radio Edit",
/// "feat. X") or a distinguishing subtitle ("Pt. 2", "Pathétique") that must
/// survive normalization. Annotations made up entirely of stylistic keywords
/// and numbers are noise; anything else is kept.
fn is_noise_annotation(content: &str) -> bool {
    let folded = fold(content);
    let mut tokens = folded.split_whitespace().peekable();

    match tokens.peek() {
        None => return true,
        Some(first) => {
            if FEATURING_TOKENS.contains(first) {
                return true;
            }
        }
    }

    tokens.all(|t| STYLISTIC_TOKENS.contains(&t) || t.chars().all(|c| c.is_ascii_digit()))
}

// Drops " - Remastered 2011"-style dash suffixes while keeping dash segments
// that carry real subtitle text.
fn strip_dash_suffixes(title: &str) -> String {
    let mut segments = title.split(" - ");
    let mut kept = match segments.next() {
        Some(first) => first.to_string(),
        None => return String::new(),
    };

    for segment in segments {
        if !is_noise_annotation(segment) {
            kept.push_str(" - ");
            kept.push_str(segment);
        }
    }

    kept
}

/// Normalizes a title into its signature form: noise annotations and dash
/// suffixes stripped, folded, noise phrases removed.
pub fn normalize_title(title: &str) -> String {
    let (outside, annotations) = split_annotations(title);

    let mut kept = strip_dash_suffixes(&outside);
    for annotation in annotations {
        if !is_noise_annotation(&annotation) {
            kept.push(' ');
            kept.push_str(&annotation);
        }
    }

    let mut folded = fold(&kept);
    for phrase in NOISE_PHRASES {
        if let Some(idx) = folded.find(phrase) {
            folded.replace_range(idx..idx + phrase.len(), "");
        }
    }

    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalizes artist names: folded, empties dropped, sorted lexicographically
/// so that artist ordering differences between services do not break
/// equivalence.
pub fn normalize_artists(artists: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = artists
        .iter()
        .map(|a| fold(a))
        .filter(|a| !a.is_empty())
        .collect();
    normalized.sort();
    normalized.dedup();
    normalized
}

/// Computes the canonical signature for a title and artist list. Pure and
/// total: the same input always produces the same signature, and missing
/// metadata degrades to an empty part instead of failing.
pub fn signature(title: &str, artists: &[String]) -> String {
    format!(
        "{}{}{}",
        normalize_title(title),
        SIGNATURE_SEPARATOR,
        normalize_artists(artists).join(",")
    )
}

/// Signature of a track record.
pub fn track_signature(track: &Track) -> String {
    signature(&track.title, &track.artists)
}

/// Normalized "title artists" text used for similarity scoring.
pub fn comparison_text(track: &Track) -> String {
    let artists = normalize_artists(&track.artists).join(" ");
    let title = normalize_title(&track.title);
    if artists.is_empty() {
        title
    } else {
        format!("{} {}", title, artists)
    }
}

/// Builds the ordered list of query strings used to locate a track on the
/// other service. Starts with the fully specific query and falls back to
/// progressively looser ones; duplicates are dropped while preserving order.
pub fn search_queries(track: &Track) -> Vec<String> {
    let artist_raw = track.artists.join(" ");
    let artist_clean = normalize_artists(&track.artists).join(" ");
    let title_clean = normalize_title(&track.title);

    let mut strategies = vec![
        format!("{} {}", artist_raw, track.title).trim().to_string(),
        format!("{} {}", artist_clean, title_clean).trim().to_string(),
        track.title.clone(),
        title_clean.clone(),
    ];

    // Artist plus leading title word, for heavily annotated titles.
    if let Some(first_word) = title_clean.split_whitespace().next() {
        if !artist_clean.is_empty() {
            strategies.push(format!("{} {}", artist_clean, first_word));
        }
    }

    let mut seen = HashSet::new();
    strategies.retain(|s| !s.is_empty() && seen.insert(s.clone()));
    strategies
}
