use crate::error::{AppError, AppResult};

/// Matches the cost the stored hashes were created with.
const BCRYPT_COST: u32 = 10;

/// Hash a password with a randomized per-record salt.
pub fn hash_password(password: &str) -> AppResult<String> {
    bcrypt::hash(password, BCRYPT_COST)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

/// Verify a password against a stored hash - constant-time via bcrypt.
/// A malformed stored hash counts as a mismatch.
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}
