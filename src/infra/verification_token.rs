use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;

use crate::application::use_cases::domain::TokenGenerator;

const TOKEN_ENTROPY_BYTES: usize = 32;

/// Ownership tokens of the form `<prefix>-<43 base64url chars>`, drawn from
/// the OS CSPRNG.
pub struct OsRngTokenGenerator {
    prefix: String,
}

impl OsRngTokenGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl TokenGenerator for OsRngTokenGenerator {
    fn generate(&self) -> String {
        let mut bytes = [0u8; TOKEN_ENTROPY_BYTES];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        format!("{}-{}", self.prefix, URL_SAFE_NO_PAD.encode(bytes))
    }
}
