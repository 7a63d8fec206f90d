use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Tokens are valid for two hours from issuance. There is no refresh
/// mechanism; clients log in again.
const TOKEN_TTL_HOURS: i64 = 2;

/// Claims embedded in a session token. Stateless: nothing is persisted,
/// verification is signature + expiry only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub username: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

/// Signs and verifies session tokens (HS256) with a server-held secret.
/// Built once at startup from config and shared through `AppState`.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Issue a signed token embedding id/username/role, expiring in two hours.
    pub fn issue(&self, user_id: &str, username: &str, role: &str) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            role: role.to_string(),
            iat: now,
            exp: now + TOKEN_TTL_HOURS * 3600,
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
    }

    /// Verify signature and expiry, returning the decoded claims.
    /// Any failure (malformed, tampered, expired) is the same 401.
    pub fn verify(&self, token: &str) -> AppResult<Claims> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| AppError::Unauthorized("Invalid token".into()))
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new("test-secret-long-enough-for-hs256")
    }

    #[test]
    fn issued_token_round_trips_claims() {
        let tokens = service();
        let token = tokens.issue("u1", "alice", "admin").unwrap();

        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.sub, "u1");
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.role, "admin");
        assert!(claims.is_admin());
    }

    #[test]
    fn expiry_is_two_hours_out() {
        let tokens = service();
        let token = tokens.issue("u1", "alice", "user").unwrap();
        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.exp - claims.iat, 2 * 3600);
    }

    #[test]
    fn expired_token_fails_verification() {
        let tokens = service();
        let claims = Claims {
            sub: "u1".into(),
            username: "alice".into(),
            role: "user".into(),
            iat: Utc::now().timestamp() - 4 * 3600,
            exp: Utc::now().timestamp() - 2 * 3600,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret-long-enough-for-hs256"),
        )
        .unwrap();

        assert!(tokens.verify(&token).is_err());
    }

    #[test]
    fn garbage_token_fails_verification() {
        let tokens = service();
        assert!(tokens.verify("not.a.token").is_err());
        assert!(tokens.verify("").is_err());
    }

    #[test]
    fn token_signed_with_other_secret_fails() {
        let tokens = service();
        let other = TokenService::new("a-completely-different-secret-key");
        let token = other.issue("u1", "alice", "admin").unwrap();

        assert!(tokens.verify(&token).is_err());
    }

    #[test]
    fn tampered_token_fails_verification() {
        let tokens = service();
        let token = tokens.issue("u1", "alice", "user").unwrap();

        // Flip a character in the payload segment
        let mut parts: Vec<String> = token.split('.').map(String::from).collect();
        let mut payload = parts[1].clone();
        let replacement = if payload.ends_with('A') { "B" } else { "A" };
        payload.truncate(payload.len() - 1);
        payload.push_str(replacement);
        parts[1] = payload;

        assert!(tokens.verify(&parts.join(".")).is_err());
    }
}
