use std::time::Duration;

use anyhow::Context;
use base64ct::{Base64, Encoding};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::debug;

/// Claims carried by every issued token. `sub` is the user's email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// HMAC-SHA256 token service. Built once at startup from the base64-encoded
/// shared secret and a TTL in milliseconds; read-only for the process
/// lifetime, so freely cloned across request tasks.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl JwtKeys {
    pub fn new(secret_base64: &str, ttl_ms: u64) -> anyhow::Result<Self> {
        let secret = Base64::decode_vec(secret_base64)
            .map_err(|e| anyhow::anyhow!("JWT secret is not valid base64: {e}"))?;
        Ok(Self {
            encoding: EncodingKey::from_secret(&secret),
            decoding: DecodingKey::from_secret(&secret),
            ttl: Duration::from_millis(ttl_ms),
        })
    }

    /// Signs a token for `subject` valid from now until now + TTL.
    pub fn issue(&self, subject: &str) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + self.ttl;
        let claims = Claims {
            sub: subject.to_string(),
            iat: now.unix_timestamp(),
            exp: exp.unix_timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .context("failed to sign token")?;
        debug!(subject = %subject, "token issued");
        Ok(token)
    }

    /// Verifies signature and structure, nothing else. Expiry is checked
    /// separately so an expired-but-authentic token is distinguishable from a
    /// forged one in diagnostics.
    fn decode_verified(&self, token: &str) -> anyhow::Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        let data = decode::<Claims>(token, &self.decoding, &validation)
            .context("token signature or structure invalid")?;
        Ok(data.claims)
    }

    /// Errors when the signature does not verify or the token is malformed.
    pub fn subject(&self, token: &str) -> anyhow::Result<String> {
        Ok(self.decode_verified(token)?.sub)
    }

    pub fn expires_at(&self, token: &str) -> anyhow::Result<OffsetDateTime> {
        let claims = self.decode_verified(token)?;
        OffsetDateTime::from_unix_timestamp(claims.exp).context("exp claim out of range")
    }

    /// True iff the verified expiry is strictly before now.
    pub fn is_expired(&self, token: &str) -> anyhow::Result<bool> {
        Ok(self.expires_at(token)? < OffsetDateTime::now_utc())
    }

    /// `Ok(true)` iff the token's subject matches and it has not expired.
    /// Signature/structure failures propagate as errors rather than mapping
    /// to `Ok(false)`; callers pick swallow-or-propagate per call site.
    pub fn validate(&self, token: &str, expected_subject: &str) -> anyhow::Result<bool> {
        let claims = self.decode_verified(token)?;
        let expired = OffsetDateTime::from_unix_timestamp(claims.exp)
            .context("exp claim out of range")?
            < OffsetDateTime::now_utc();
        if expired {
            debug!(subject = %claims.sub, "token expired");
            return Ok(false);
        }
        Ok(claims.sub == expected_subject)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // base64 of "secret-signing-key-thirty-two!"
    const SECRET: &str = "c2VjcmV0LXNpZ25pbmcta2V5LXRoaXJ0eS10d28h";

    fn keys(ttl_ms: u64) -> JwtKeys {
        JwtKeys::new(SECRET, ttl_ms).expect("valid base64 secret")
    }

    #[test]
    fn rejects_non_base64_secret() {
        assert!(JwtKeys::new("not base64 !!!", 1000).is_err());
    }

    #[test]
    fn fresh_token_validates_for_its_subject() {
        let keys = keys(60_000);
        let token = keys.issue("user@x.com").expect("issue");
        assert_eq!(keys.subject(&token).expect("subject"), "user@x.com");
        assert!(!keys.is_expired(&token).expect("expiry check"));
        assert!(keys.validate(&token, "user@x.com").expect("validate"));
    }

    #[test]
    fn subject_mismatch_is_false_not_error() {
        let keys = keys(60_000);
        let token = keys.issue("s1@x.com").expect("issue");
        assert!(!keys.validate(&token, "s2@x.com").expect("validate"));
    }

    #[test]
    fn one_millisecond_ttl_expires_after_a_short_delay() {
        let keys = keys(1);
        let token = keys.issue("user@x.com").expect("issue");
        // exp is stored at second resolution; step past the boundary.
        std::thread::sleep(std::time::Duration::from_millis(1100));
        assert!(keys.is_expired(&token).expect("expiry check"));
        assert!(!keys.validate(&token, "user@x.com").expect("validate"));
    }

    #[test]
    fn tampered_signature_fails_every_claim_extraction() {
        let keys = keys(60_000);
        let token = keys.issue("user@x.com").expect("issue");
        let sig_start = token.rfind('.').expect("compact jwt") + 1;
        let mut corrupted = token[..sig_start].to_string();
        let flipped: String = token[sig_start..]
            .chars()
            .map(|c| if c == 'A' { 'B' } else { 'A' })
            .collect();
        corrupted.push_str(&flipped);
        assert!(keys.subject(&corrupted).is_err());
        assert!(keys.expires_at(&corrupted).is_err());
        assert!(keys.validate(&corrupted, "user@x.com").is_err());
    }

    #[test]
    fn garbage_tokens_error() {
        let keys = keys(60_000);
        assert!(keys.subject("not-a-jwt").is_err());
        assert!(keys.subject("").is_err());
    }

    #[test]
    fn wrong_key_fails_verification() {
        let keys = keys(60_000);
        let other = JwtKeys::new("b3RoZXItc2lnbmluZy1rZXktYnl0ZXMhIQ==", 60_000).expect("keys");
        let token = keys.issue("user@x.com").expect("issue");
        assert!(other.subject(&token).is_err());
    }

    #[test]
    fn expired_token_still_yields_its_subject() {
        // Signature verification is independent of expiry enforcement.
        let keys = keys(1);
        let token = keys.issue("user@x.com").expect("issue");
        std::thread::sleep(std::time::Duration::from_millis(1100));
        assert_eq!(keys.subject(&token).expect("subject"), "user@x.com");
    }
}
