use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

/// Derives the stable identity of a leave request from the applicant and the
/// normalized interval bounds. Byte-identical inputs always collide, which is
/// what makes duplicate submissions recognizable across attempts.
///
/// SHA-256 over `applicant_id | from_millis | to_millis`, encoded URL-safe so
/// the identity can ride in action-link path segments unescaped.
pub fn fingerprint(applicant_id: &str, from: DateTime<Utc>, to: DateTime<Utc>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(applicant_id.as_bytes());
    hasher.update(b"|");
    hasher.update(from.timestamp_millis().to_string().as_bytes());
    hasher.update(b"|");
    hasher.update(to.timestamp_millis().to_string().as_bytes());
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}
