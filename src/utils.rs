use std::future::Future;
use std::time::Duration;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};
use tokio::time::sleep;

use crate::config;

pub fn generate_code_verifier() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(128)
        .map(char::from)
        .collect()
}

pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Truncates text to `max_len` characters, appending an ellipsis when the
/// input was longer.
pub fn truncate_text(text: &str, max_len: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() > max_len {
        let mut out: String = chars[..max_len.saturating_sub(1)].iter().collect();
        out.push('…');
        out
    } else {
        text.to_string()
    }
}

/// Retries an async operation with exponential backoff and jitter.
///
/// Attempts the operation up to `max_attempts` times. Between attempts the
/// delay doubles, starting from `RETRY_BASE_DELAY_MS` and capped at
/// `RETRY_MAX_DELAY_MS`, with a random factor in [0.5, 1.5) so concurrent
/// workers do not retry in lockstep. The last error is returned once the
/// attempts are exhausted.
pub async fn retry_with_backoff<T, E, F, Fut>(max_attempts: u32, op: F) -> Result<T, E>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt: u32 = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                if attempt >= max_attempts {
                    return Err(e);
                }

                let exp = config::RETRY_BASE_DELAY_MS
                    .saturating_mul(1u64 << (attempt - 1))
                    .min(config::RETRY_MAX_DELAY_MS);
                let jitter: f64 = rand::rng().random_range(0.5..1.5);
                sleep(Duration::from_millis((exp as f64 * jitter) as u64)).await;

                attempt += 1;
            }
        }
    }
}
