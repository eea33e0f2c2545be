//! HMAC and digest helpers shared by the gateway clients.

use crate::GatewayError;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

/// Lowercase hex HMAC-SHA256 of `message` under `secret`.
pub fn hmac_sha256_hex(secret: &[u8], message: &[u8]) -> Result<String, GatewayError> {
    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| GatewayError::InvalidInput(format!("hmac key: {e}")))?;
    mac.update(message);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Check a hex HMAC-SHA256 signature in constant time.
///
/// Signatures that are not valid hex never match.
pub fn verify_hmac_sha256_hex(secret: &[u8], message: &[u8], signature: &str) -> bool {
    let Ok(expected) = hex::decode(signature.trim()) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret) else {
        return false;
    };
    mac.update(message);
    mac.verify_slice(&expected).is_ok()
}

/// Lowercase hex SHA-256 digest.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hmac_known_vector() {
        assert_eq!(
            hmac_sha256_hex(b"rzp_secret", b"order_IluGWxBm9U8zJ8|pay_IH4NVgf4Dreq1l").unwrap(),
            "84fa1d8cf38066903201ad15db5ecf15a1e18fb2ae2c4eeab09e61a80b92b90c"
        );
    }

    #[test]
    fn test_verify_rejects_tampering() {
        let sig = hmac_sha256_hex(b"secret", b"payload").unwrap();
        assert!(verify_hmac_sha256_hex(b"secret", b"payload", &sig));
        assert!(verify_hmac_sha256_hex(b"secret", b"payload", &sig.to_uppercase()));
        assert!(!verify_hmac_sha256_hex(b"secret", b"payload!", &sig));
        assert!(!verify_hmac_sha256_hex(b"other", b"payload", &sig));
        assert!(!verify_hmac_sha256_hex(b"secret", b"payload", "zz-not-hex"));
        assert!(!verify_hmac_sha256_hex(b"secret", b"payload", &sig[..32]));
    }
}
