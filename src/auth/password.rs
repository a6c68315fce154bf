use rand::distributions::Alphanumeric;
use rand::Rng;
use sha256::digest;

use crate::app::AppError;

const SALT_LEN: usize = 16;
const DIGEST_LEN: usize = 64;

/// Hashes a plaintext password with a fresh random salt.
///
/// The stored form is `{salt}${hex digest}`, so two calls with the same
/// plaintext produce different credentials.
///
/// # Example
/// ```
/// let stored = hash_password("my password").unwrap();
/// assert_ne!(stored, "my password");
/// ```
pub fn hash_password(plaintext: &str) -> Result<String, AppError> {
    let salt: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SALT_LEN)
        .map(char::from)
        .collect();
    let hashed = digest(format!("{}{}", salt, plaintext));
    Ok(format!("{}${}", salt, hashed))
}

/// Checks a plaintext password against a stored credential.
///
/// The digest comparison is constant-time. A stored value that does not
/// have the `{salt}${hex digest}` shape fails with a hashing error.
pub fn verify_password(plaintext: &str, stored: &str) -> Result<bool, AppError> {
    let (salt, expected) = stored
        .split_once('$')
        .ok_or_else(|| AppError::Hashing("stored credential has no salt".to_string()))?;
    if expected.len() != DIGEST_LEN {
        return Err(AppError::Hashing(
            "stored credential digest has the wrong length".to_string(),
        ));
    }

    let actual = digest(format!("{}{}", salt, plaintext));
    Ok(constant_time_eq(actual.as_bytes(), expected.as_bytes()))
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
