use syncli::sync::normalize::*;
use syncli::types::{Service, Track};

// Helper function to create a test track
fn create_test_track(title: &str, artists: &[&str]) -> Track {
    Track {
        title: title.to_string(),
        artists: artists.iter().map(|a| a.to_string()).collect(),
        source_id: "id1".to_string(),
        origin: Service::Spotify,
    }
}

#[test]
fn test_signature_is_deterministic() {
    let artists = vec!["Ed Sheeran".to_string()];

    // Same input must produce the same signature, every time
    let first = signature("Shape of You", &artists);
    let second = signature("Shape of You", &artists);
    assert_eq!(first, second);
}

#[test]
fn test_signature_case_and_punctuation_insensitive() {
    let artists = vec!["The Killers".to_string()];

    assert_eq!(
        signature("Mr. Brightside", &artists),
        signature("mr brightside", &artists)
    );
}

#[test]
fn test_remaster_annotation_is_noise() {
    let artists = vec!["Queen".to_string()];

    // "(Remastered 2011)" does not change song identity
    assert_eq!(
        signature("Song Name (Remastered 2011)", &artists),
        signature("song name", &artists)
    );
}

#[test]
fn test_radio_edit_annotation_is_noise() {
    let artists = vec!["Ed Sheeran".to_string()];

    assert_eq!(
        signature("shape of you (radio edit)", &artists),
        signature("Shape of You", &artists)
    );
}

#[test]
fn test_dash_suffix_is_noise() {
    let artists = vec!["Queen".to_string()];

    assert_eq!(
        signature("Bohemian Rhapsody - Remastered 2011", &artists),
        signature("Bohemian Rhapsody", &artists)
    );
    assert_eq!(
        signature("Bohemian Rhapsody - Live", &artists),
        signature("Bohemian Rhapsody", &artists)
    );
}

#[test]
fn test_featuring_annotation_is_noise() {
    let artists = vec!["Main Artist".to_string()];

    assert_eq!(
        signature("Song (feat. Guest Artist)", &artists),
        signature("Song", &artists)
    );
}

#[test]
fn test_distinguishing_subtitle_is_kept() {
    let artists = vec!["Composer".to_string()];

    // "Pt. 2" is not a stylistic annotation - it names a different piece
    assert_ne!(
        signature("Concerto (Pt. 2)", &artists),
        signature("Concerto", &artists)
    );
}

#[test]
fn test_artist_order_does_not_matter() {
    let ab = vec!["Artist A".to_string(), "Artist B".to_string()];
    let ba = vec!["Artist B".to_string(), "Artist A".to_string()];

    assert_eq!(signature("Duet", &ab), signature("Duet", &ba));
}

#[test]
fn test_empty_inputs_are_safe() {
    // Malformed records degrade to empty-safe signatures, never a panic
    let empty: Vec<String> = Vec::new();
    let sig = signature("", &empty);
    assert!(sig.contains("::"));

    let sig = signature("Title Only", &empty);
    assert!(sig.starts_with("title only"));
}

#[test]
fn test_fold_handles_unicode() {
    // Full-width characters
    assert_eq!(fold("Ｆｕｌｌ　Ｗｉｄｔｈ"), "full width");

    // Apostrophes disappear so "don't" and "dont" agree
    assert_eq!(fold("Don't Stop"), "dont stop");

    assert_eq!(fold("  Multiple   Spaces  "), "multiple spaces");
}

#[test]
fn test_normalize_title_is_idempotent() {
    let noisy = [
        "Song Name (Remastered 2011)",
        "Shape of You - Radio Edit",
        "Track (feat. Somebody) [Live]",
        "Plain Title",
    ];

    for title in noisy {
        let once = normalize_title(title);
        let twice = normalize_title(&once);
        assert_eq!(once, twice, "normalizing '{}' twice changed it", title);
    }
}

#[test]
fn test_search_queries_start_specific() {
    let track = create_test_track("Shape of You (Radio Edit)", &["Ed Sheeran"]);
    let queries = search_queries(&track);

    // Most specific strategy first: raw artist and title
    assert_eq!(queries[0], "Ed Sheeran Shape of You (Radio Edit)");

    // Cleaned and title-only fallbacks follow
    assert!(queries.contains(&"ed sheeran shape of you".to_string()));
    assert!(queries.contains(&"Shape of You (Radio Edit)".to_string()));
}

#[test]
fn test_search_queries_deduplicated() {
    // A clean title produces overlapping strategies; duplicates must go
    let track = create_test_track("Hello", &[]);
    let queries = search_queries(&track);

    let mut unique = queries.clone();
    unique.dedup();
    assert_eq!(queries, unique);

    // No artist: no empty or whitespace-only queries
    assert!(queries.iter().all(|q| !q.trim().is_empty()));
}
