use serde::Deserialize;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Operator-supplied cold wallet secret.
///
/// Used transiently to sign the funding payment, the cold wallet
/// settings update and currency issuance. The type implements
/// `Deserialize` so it can arrive with the setup request, but
/// deliberately not `Serialize`: it can never end up in the setup
/// result or in the settings store. Memory is wiped on drop.
#[derive(Clone, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct ColdWalletSecret(String);

impl ColdWalletSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        ColdWalletSecret(secret.into())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the raw secret for a signing call.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ColdWalletSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ColdWalletSecret([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_is_redacted() {
        let secret = ColdWalletSecret::new("shDNGLXdHqKHGWA3Hc229Z9QrJBhp");
        let rendered = format!("{:?}", secret);
        assert!(!rendered.contains("shDNG"));
        assert!(rendered.contains("REDACTED"));
    }

    #[test]
    fn deserializes_from_plain_string() {
        let secret: ColdWalletSecret = serde_json::from_str("\"sSECRET\"").unwrap();
        assert_eq!(secret.expose(), "sSECRET");
        assert!(!secret.is_empty());
    }
}
