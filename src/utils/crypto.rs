// Secret generation for operators setting up a deployment

use base64::{engine::general_purpose, Engine as _};
use rand::RngCore;

use crate::session::MIN_SECRET_LENGTH;

/// Generate a random session signing secret
///
/// 32 bytes (256 bits) of entropy, base64url encoded (43 characters), so the
/// encoded string itself clears the minimum secret length.
#[must_use]
pub fn generate_session_secret() -> String {
    let mut secret = [0u8; MIN_SECRET_LENGTH];
    rand::rng().fill_bytes(&mut secret);
    general_purpose::URL_SAFE_NO_PAD.encode(secret)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::TokenCodec;

    #[test]
    fn test_generated_secret_is_usable() {
        let secret = generate_session_secret();
        assert_eq!(secret.len(), 43);
        assert!(TokenCodec::new(secret.as_bytes()).is_ok());
    }

    #[test]
    fn test_generated_secrets_differ() {
        assert_ne!(generate_session_secret(), generate_session_secret());
    }
}
