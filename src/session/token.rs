//! Token Codec - signed session tokens
//!
//! Sessions are carried as compact HS256 JWTs:
//!
//! ```text
//! base64url({"alg":"HS256","typ":"JWT"}) . base64url({"userId":..,"role":..,"iat":..,"exp":..}) . base64url(hmac)
//! ```
//!
//! The codec only checks integrity. Deciding whether a verified session is
//! still current belongs to [`SessionPolicy`](super::SessionPolicy), so a stale
//! token can be told apart from a forged one.

use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sha2::Sha256;

use super::error::SessionError;
use super::SESSION_TTL_SECONDS;

type HmacSha256 = Hmac<Sha256>;

/// Minimum secret length in bytes (the HS256 key size)
pub const MIN_SECRET_LENGTH: usize = 32;

const SIGNING_ALGORITHM: &str = "HS256";

/// Decoded session claims
///
/// Immutable once constructed; a changed session is a newly issued token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    user_id: String,
    role: String,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl Session {
    /// Create a session issued at `issued_at`, expiring one TTL later
    ///
    /// # Errors
    ///
    /// Returns `SessionError::OutOfRange` if the expiry is not representable.
    pub fn new(
        user_id: &str,
        role: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        let expires_at = issued_at
            .checked_add_signed(Duration::seconds(SESSION_TTL_SECONDS))
            .ok_or(SessionError::OutOfRange)?;

        Ok(Self {
            user_id: user_id.to_owned(),
            role: role.to_owned(),
            issued_at,
            expires_at,
        })
    }

    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    #[must_use]
    pub fn role(&self) -> &str {
        &self.role
    }

    #[must_use]
    pub const fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    #[must_use]
    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// A session is expired once `now` reaches `expires_at`
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Exact, case-sensitive role match
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.role == role
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct TokenHeader {
    alg: String,
    typ: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    #[serde(rename = "userId")]
    user_id: String,
    role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    iat: Option<i64>,
    exp: i64,
}

impl SessionClaims {
    fn from_session(session: &Session) -> Self {
        Self {
            user_id: session.user_id.clone(),
            role: session.role.clone(),
            iat: Some(session.issued_at.timestamp()),
            exp: session.expires_at.timestamp(),
        }
    }

    fn into_session(self) -> Result<Session, SessionError> {
        if self.user_id.is_empty() || self.role.is_empty() {
            return Err(SessionError::InvalidSignature);
        }

        let expires_at =
            DateTime::from_timestamp(self.exp, 0).ok_or(SessionError::InvalidSignature)?;
        let issued_at = match self.iat {
            Some(iat) => DateTime::from_timestamp(iat, 0).ok_or(SessionError::InvalidSignature)?,
            None => expires_at
                .checked_sub_signed(Duration::seconds(SESSION_TTL_SECONDS))
                .ok_or(SessionError::InvalidSignature)?,
        };

        Ok(Session {
            user_id: self.user_id,
            role: self.role,
            issued_at,
            expires_at,
        })
    }
}

/// Signs and verifies session tokens with a symmetric secret
///
/// The secret is injected at construction; nothing here reads the environment.
#[derive(Clone)]
pub struct TokenCodec {
    secret: Vec<u8>,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl TokenCodec {
    /// Create a codec from the process-wide signing secret
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Misconfigured` if the secret is shorter than
    /// [`MIN_SECRET_LENGTH`] bytes.
    pub fn new(secret: &[u8]) -> Result<Self, SessionError> {
        if secret.len() < MIN_SECRET_LENGTH {
            return Err(SessionError::Misconfigured(format!(
                "session secret must be at least {MIN_SECRET_LENGTH} bytes, got {}",
                secret.len()
            )));
        }

        // HMAC accepts any key length, this only surfaces a broken backend early
        <HmacSha256 as Mac>::new_from_slice(secret)
            .map_err(|e| SessionError::Misconfigured(format!("unusable signing key: {e}")))?;

        Ok(Self {
            secret: secret.to_vec(),
        })
    }

    /// Issue a signed token for a freshly created session
    ///
    /// `now` is truncated to whole seconds so the verified session equals the
    /// issued one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::MissingClaim` if `user_id` or `role` is empty,
    /// or `SessionError::OutOfRange` if `now` leaves no room for the TTL.
    pub fn issue(
        &self,
        user_id: &str,
        role: &str,
        now: DateTime<Utc>,
    ) -> Result<String, SessionError> {
        if user_id.is_empty() {
            return Err(SessionError::MissingClaim("userId"));
        }
        if role.is_empty() {
            return Err(SessionError::MissingClaim("role"));
        }

        let issued_at = DateTime::from_timestamp(now.timestamp(), 0).unwrap_or(now);
        self.encode(&Session::new(user_id, role, issued_at)?)
    }

    /// Sign an existing session value
    ///
    /// # Errors
    ///
    /// Returns an error if the claims cannot be serialized.
    pub fn encode(&self, session: &Session) -> Result<String, SessionError> {
        let header = TokenHeader {
            alg: SIGNING_ALGORITHM.to_string(),
            typ: "JWT".to_string(),
        };
        let header_b64 = encode_segment(&header)?;
        let payload_b64 = encode_segment(&SessionClaims::from_session(session))?;

        let mut mac = self.mac()?;
        mac.update(header_b64.as_bytes());
        mac.update(b".");
        mac.update(payload_b64.as_bytes());
        let signature_b64 = general_purpose::URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(format!("{header_b64}.{payload_b64}.{signature_b64}"))
    }

    /// Verify a token and decode its claims
    ///
    /// Expired tokens are returned as long as the signature holds.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidSignature` for any malformed, tampered or
    /// foreign-secret token.
    pub fn verify(&self, token: &str) -> Result<Session, SessionError> {
        let mut segments = token.split('.');
        let (Some(header_b64), Some(payload_b64), Some(signature_b64), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(SessionError::InvalidSignature);
        };

        let signature = general_purpose::URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| SessionError::InvalidSignature)?;

        let mut mac = self.mac()?;
        mac.update(header_b64.as_bytes());
        mac.update(b".");
        mac.update(payload_b64.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| SessionError::InvalidSignature)?;

        let header: TokenHeader = decode_segment(header_b64)?;
        if header.alg != SIGNING_ALGORITHM {
            return Err(SessionError::InvalidSignature);
        }

        decode_segment::<SessionClaims>(payload_b64)?.into_session()
    }

    fn mac(&self) -> Result<HmacSha256, SessionError> {
        <HmacSha256 as Mac>::new_from_slice(&self.secret)
            .map_err(|e| SessionError::Misconfigured(format!("unusable signing key: {e}")))
    }
}

fn encode_segment<T: Serialize>(value: &T) -> Result<String, SessionError> {
    let json = serde_json::to_vec(value)?;
    Ok(general_purpose::URL_SAFE_NO_PAD.encode(json))
}

fn decode_segment<T: DeserializeOwned>(segment: &str) -> Result<T, SessionError> {
    let bytes = general_purpose::URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| SessionError::InvalidSignature)?;
    serde_json::from_slice(&bytes).map_err(|_| SessionError::InvalidSignature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::constants::{OTHER_SESSION_SECRET, TEST_SESSION_SECRET};
    use serde_json::Value;

    fn codec() -> TokenCodec {
        TokenCodec::new(TEST_SESSION_SECRET).unwrap()
    }

    fn fixed_now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn test_issue_then_verify_round_trips() {
        let codec = codec();
        for (user_id, role) in [("u1", "admin"), ("b7c1-44", "editor"), ("ñandú", "user")] {
            let token = codec.issue(user_id, role, fixed_now()).unwrap();
            let session = codec.verify(&token).unwrap();

            assert_eq!(session.user_id(), user_id);
            assert_eq!(session.role(), role);
            assert_eq!(session.issued_at(), fixed_now());
            assert_eq!(
                session.expires_at() - session.issued_at(),
                Duration::seconds(86_400)
            );
        }
    }

    #[test]
    fn test_issue_truncates_to_whole_seconds() {
        let now = DateTime::from_timestamp(1_700_000_000, 750_000_000).unwrap();
        let session = codec().verify(&codec().issue("u1", "admin", now).unwrap()).unwrap();
        assert_eq!(session.issued_at(), fixed_now());
    }

    #[test]
    fn test_token_layout_and_payload_names() {
        let token = codec().issue("u1", "admin", fixed_now()).unwrap();
        let parts: Vec<&str> = token.split('.').collect();
        assert_eq!(parts.len(), 3);

        let header: Value = serde_json::from_slice(
            &general_purpose::URL_SAFE_NO_PAD.decode(parts[0]).unwrap(),
        )
        .unwrap();
        assert_eq!(header["alg"], "HS256");
        assert_eq!(header["typ"], "JWT");

        let payload: Value = serde_json::from_slice(
            &general_purpose::URL_SAFE_NO_PAD.decode(parts[1]).unwrap(),
        )
        .unwrap();
        assert_eq!(payload["userId"], "u1");
        assert_eq!(payload["role"], "admin");
        assert_eq!(payload["iat"], 1_700_000_000);
        assert_eq!(payload["exp"], 1_700_086_400);
    }

    #[test]
    fn test_any_mutated_byte_fails_verification() {
        let codec = codec();
        let token = codec.issue("u1", "admin", fixed_now()).unwrap();

        for index in 0..token.len() {
            let mut bytes = token.clone().into_bytes();
            bytes[index] = if bytes[index] == b'A' { b'B' } else { b'A' };
            let tampered = String::from_utf8(bytes).unwrap();

            assert!(
                matches!(codec.verify(&tampered), Err(SessionError::InvalidSignature)),
                "mutation at byte {index} was accepted"
            );
        }
    }

    #[test]
    fn test_foreign_secret_is_rejected() {
        let token = TokenCodec::new(OTHER_SESSION_SECRET)
            .unwrap()
            .issue("u1", "admin", fixed_now())
            .unwrap();

        assert!(matches!(
            codec().verify(&token),
            Err(SessionError::InvalidSignature)
        ));
    }

    #[test]
    fn test_malformed_tokens_are_rejected() {
        let codec = codec();
        for token in ["", "abc", "a.b", "a.b.c", "a.b.c.d", "...", "not a token at all"] {
            assert!(
                matches!(codec.verify(token), Err(SessionError::InvalidSignature)),
                "{token:?} was accepted"
            );
        }
    }

    #[test]
    fn test_unsigned_token_is_rejected() {
        let header = general_purpose::URL_SAFE_NO_PAD.encode(r#"{"alg":"none","typ":"JWT"}"#);
        let payload = general_purpose::URL_SAFE_NO_PAD
            .encode(r#"{"userId":"u1","role":"admin","exp":4102444800}"#);
        let token = format!("{header}.{payload}.");

        assert!(matches!(
            codec().verify(&token),
            Err(SessionError::InvalidSignature)
        ));
    }

    #[test]
    fn test_verify_does_not_judge_expiry() {
        let codec = codec();
        let long_ago = fixed_now() - Duration::days(30);
        let session = codec
            .verify(&codec.issue("u1", "admin", long_ago).unwrap())
            .unwrap();

        assert!(session.is_expired_at(fixed_now()));
    }

    fn sign_claims(codec: &TokenCodec, claims: &SessionClaims) -> String {
        let header_b64 = encode_segment(&TokenHeader {
            alg: "HS256".to_string(),
            typ: "JWT".to_string(),
        })
        .unwrap();
        let payload_b64 = encode_segment(claims).unwrap();
        let mut mac = codec.mac().unwrap();
        mac.update(format!("{header_b64}.{payload_b64}").as_bytes());
        let signature = general_purpose::URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        format!("{header_b64}.{payload_b64}.{signature}")
    }

    #[test]
    fn test_missing_iat_is_derived_from_exp() {
        let codec = codec();
        let session = Session::new("u1", "admin", fixed_now()).unwrap();
        let claims = SessionClaims {
            iat: None,
            ..SessionClaims::from_session(&session)
        };

        let decoded = codec.verify(&sign_claims(&codec, &claims)).unwrap();
        assert_eq!(decoded, session);
    }

    #[test]
    fn test_earliest_exp_without_iat_is_rejected() {
        let codec = codec();
        let claims = SessionClaims {
            user_id: "u1".to_string(),
            role: "admin".to_string(),
            iat: None,
            exp: DateTime::<Utc>::MIN_UTC.timestamp(),
        };

        assert!(matches!(
            codec.verify(&sign_claims(&codec, &claims)),
            Err(SessionError::InvalidSignature)
        ));
    }

    #[test]
    fn test_issue_at_end_of_time_is_out_of_range() {
        assert!(matches!(
            codec().issue("u1", "admin", DateTime::<Utc>::MAX_UTC),
            Err(SessionError::OutOfRange)
        ));
        assert!(matches!(
            Session::new("u1", "admin", DateTime::<Utc>::MAX_UTC),
            Err(SessionError::OutOfRange)
        ));
    }

    #[test]
    fn test_empty_claims_cannot_be_issued() {
        let codec = codec();
        assert!(matches!(
            codec.issue("", "admin", fixed_now()),
            Err(SessionError::MissingClaim("userId"))
        ));
        assert!(matches!(
            codec.issue("u1", "", fixed_now()),
            Err(SessionError::MissingClaim("role"))
        ));
    }

    #[test]
    fn test_weak_secret_is_misconfiguration() {
        assert!(matches!(
            TokenCodec::new(b""),
            Err(SessionError::Misconfigured(_))
        ));
        assert!(matches!(
            TokenCodec::new(b"short-secret"),
            Err(SessionError::Misconfigured(_))
        ));
        assert!(TokenCodec::new(&[7u8; MIN_SECRET_LENGTH]).is_ok());
    }

    #[test]
    fn test_debug_output_hides_secret() {
        let rendered = format!("{:?}", codec());
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains(std::str::from_utf8(TEST_SESSION_SECRET).unwrap()));
    }

    #[test]
    fn test_session_role_match_is_case_sensitive() {
        let session = Session::new("u1", "admin", fixed_now()).unwrap();
        assert!(session.has_role("admin"));
        assert!(!session.has_role("Admin"));
        assert!(!session.has_role("editor"));
    }
}
