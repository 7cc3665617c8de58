//! Compact HS256 tokens carrying a numeric subject and an expiry.
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::subject::SubjectId;

/// The only algorithm this codec signs with or accepts.
pub const ALGORITHM: Algorithm = Algorithm::HS256;

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("failed to sign token: {0}")]
    SigningFailure(jsonwebtoken::errors::Error),
    #[error("invalid token: {0}")]
    InvalidToken(jsonwebtoken::errors::Error),
}

/// Token claims.
///
/// `sub` is optional on the way in so that a token without a subject is
/// reported as a missing subject rather than as a malformed token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    pub exp: i64,
}

/// Sign a token for `subject` valid until `expires_at`.
pub fn issue(
    secret: &[u8],
    subject: SubjectId,
    expires_at: DateTime<Utc>,
) -> Result<String, CodecError> {
    sign(&EncodingKey::from_secret(secret), subject, expires_at)
}

/// Verify signature, algorithm and expiry, returning the claims.
pub fn verify(token: &str, secret: &[u8]) -> Result<Claims, CodecError> {
    decode(token, &DecodingKey::from_secret(secret), &validation())
}

fn validation() -> Validation {
    let mut validation = Validation::new(ALGORITHM);
    validation.leeway = 0;
    validation.validate_aud = false;
    validation.set_required_spec_claims(&["exp"]);
    validation
}

fn sign(
    key: &EncodingKey,
    subject: SubjectId,
    expires_at: DateTime<Utc>,
) -> Result<String, CodecError> {
    let claims = Claims {
        sub: Some(subject.to_string()),
        exp: expires_at.timestamp(),
    };

    let mut header = Header::new(ALGORITHM);
    header.typ = Some("JWT".to_string());

    jsonwebtoken::encode(&header, &claims, key).map_err(|e| {
        error!(error = %e, "failed to sign token");
        CodecError::SigningFailure(e)
    })
}

fn decode(token: &str, key: &DecodingKey, validation: &Validation) -> Result<Claims, CodecError> {
    jsonwebtoken::decode::<Claims>(token, key, validation)
        .map(|data| data.claims)
        .map_err(CodecError::InvalidToken)
}

/// Read `exp` from the payload segment WITHOUT checking the signature.
///
/// Only for bounding how long an already-verified result may be reused; never
/// for deciding whether a token is valid.
pub fn unverified_expiry(token: &str) -> Option<DateTime<Utc>> {
    #[derive(Deserialize)]
    struct Exp {
        exp: i64,
    }

    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
    let Exp { exp } = serde_json::from_slice(&bytes).ok()?;
    DateTime::from_timestamp(exp, 0)
}

/// Codec with keys built once from the shared secret.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_seconds: u64,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("TokenCodec")
            .field("algorithm", &ALGORITHM)
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

impl TokenCodec {
    pub fn new(secret: &[u8], ttl_seconds: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation: validation(),
            ttl_seconds,
        }
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    /// Issue a token that expires `ttl_seconds` from now.
    pub fn issue(&self, subject: SubjectId) -> Result<String, CodecError> {
        let ttl = i64::try_from(self.ttl_seconds).unwrap_or(i64::MAX);
        let expires_at = Utc::now() + ChronoDuration::seconds(ttl);
        self.issue_until(subject, expires_at)
    }

    pub fn issue_until(
        &self,
        subject: SubjectId,
        expires_at: DateTime<Utc>,
    ) -> Result<String, CodecError> {
        sign(&self.encoding_key, subject, expires_at)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, CodecError> {
        decode(token, &self.decoding_key, &self.validation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"codec-test-secret";

    fn in_an_hour() -> DateTime<Utc> {
        Utc::now() + ChronoDuration::hours(1)
    }

    fn subject(id: i64) -> SubjectId {
        SubjectId::new(id).unwrap()
    }

    #[test]
    fn round_trip_yields_subject() {
        for id in [0, 1, 42, i64::MAX] {
            let token = issue(SECRET, subject(id), in_an_hour()).unwrap();
            let claims = verify(&token, SECRET).unwrap();
            assert_eq!(claims.sub.as_deref(), Some(id.to_string().as_str()));
        }
    }

    #[test]
    fn codec_struct_round_trip() {
        let codec = TokenCodec::new(SECRET, 60);
        let token = codec.issue(subject(7)).unwrap();
        let claims = codec.verify(&token).unwrap();
        assert_eq!(claims.sub.as_deref(), Some("7"));

        // Free functions and the struct agree on the format.
        assert!(verify(&token, SECRET).is_ok());
    }

    #[test]
    fn flipping_any_signature_byte_is_detected() {
        let token = issue(SECRET, subject(42), in_an_hour()).unwrap();
        let (signing_input, signature) = token.rsplit_once('.').unwrap();
        let sig = URL_SAFE_NO_PAD.decode(signature).unwrap();

        for i in 0..sig.len() {
            let mut tampered = sig.clone();
            tampered[i] ^= 0x01;
            let forged = format!("{signing_input}.{}", URL_SAFE_NO_PAD.encode(&tampered));
            assert!(
                matches!(verify(&forged, SECRET), Err(CodecError::InvalidToken(_))),
                "tampered byte {i} was accepted"
            );
        }
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue(SECRET, subject(1), in_an_hour()).unwrap();
        assert!(matches!(
            verify(&token, b"another-secret"),
            Err(CodecError::InvalidToken(_))
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let expired = Utc::now() - ChronoDuration::seconds(5);
        let token = issue(SECRET, subject(1), expired).unwrap();
        assert!(matches!(
            verify(&token, SECRET),
            Err(CodecError::InvalidToken(_))
        ));
    }

    #[test]
    fn other_algorithms_are_rejected() {
        let claims = Claims {
            sub: Some("1".to_string()),
            exp: in_an_hour().timestamp(),
        };
        for alg in [Algorithm::HS384, Algorithm::HS512] {
            let token = jsonwebtoken::encode(
                &Header::new(alg),
                &claims,
                &EncodingKey::from_secret(SECRET),
            )
            .unwrap();
            assert!(
                matches!(verify(&token, SECRET), Err(CodecError::InvalidToken(_))),
                "{alg:?} token was accepted"
            );
        }
    }

    #[test]
    fn unsigned_token_is_rejected() {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(
            format!(r#"{{"sub":"1","exp":{}}}"#, in_an_hour().timestamp()).as_bytes(),
        );
        let token = format!("{header}.{payload}.");
        assert!(verify(&token, SECRET).is_err());
    }

    #[test]
    fn malformed_token_is_rejected() {
        for token in ["", "abc", "a.b", "a.b.c"] {
            assert!(verify(token, SECRET).is_err(), "{token:?} was accepted");
        }
    }

    #[test]
    fn missing_subject_still_verifies() {
        let claims = Claims {
            sub: None,
            exp: in_an_hour().timestamp(),
        };
        let token =
            jsonwebtoken::encode(&Header::new(ALGORITHM), &claims, &EncodingKey::from_secret(SECRET))
                .unwrap();
        assert!(verify(&token, SECRET).unwrap().sub.is_none());
    }

    #[test]
    fn debug_hides_key_material() {
        let codec = TokenCodec::new(SECRET, 60);
        let printed = format!("{codec:?}");
        assert!(!printed.contains("codec-test-secret"));
    }

    #[test]
    fn unverified_expiry_reads_exp_only() {
        let expires_at = in_an_hour();
        let token = issue(b"any-secret", subject(3), expires_at).unwrap();
        assert_eq!(
            unverified_expiry(&token).map(|t| t.timestamp()),
            Some(expires_at.timestamp())
        );

        assert!(unverified_expiry("not-a-token").is_none());
        assert!(unverified_expiry("a.!!!.c").is_none());
        let no_exp = URL_SAFE_NO_PAD.encode(br#"{"sub":"3"}"#);
        assert!(unverified_expiry(&format!("h.{no_exp}.s")).is_none());
    }
}
