use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

fn mac_for(secret: &str, order_id: &str, payment_id: &str) -> HmacSha256 {
    // HMAC accepts keys of any length, so construction cannot fail.
    let mut mac = <HmacSha256 as Mac>::new_from_slice(secret.as_bytes())
        .unwrap_or_else(|_| unreachable!("hmac accepts any key length"));
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    mac
}

/// Hex-encoded `HMAC-SHA256(secret, "{order_id}|{payment_id}")`.
pub fn sign(secret: &str, order_id: &str, payment_id: &str) -> String {
    hex::encode(mac_for(secret, order_id, payment_id).finalize().into_bytes())
}

/// Constant-time check of a client-supplied callback signature.
pub fn verify_signature(secret: &str, order_id: &str, payment_id: &str, signature: &str) -> bool {
    let Ok(provided) = hex::decode(signature.trim()) else {
        return false;
    };
    mac_for(secret, order_id, payment_id)
        .verify_slice(&provided)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test_secret";

    #[test]
    fn signs_order_and_payment_pair() {
        let sig = sign(SECRET, "order_ABC", "pay_123");
        assert_eq!(sig.len(), 64);
        assert!(sig.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(sig, sign(SECRET, "order_ABC", "pay_123"));
    }

    #[test]
    fn accepts_valid_signature() {
        let sig = sign(SECRET, "order_ABC", "pay_123");
        assert!(verify_signature(SECRET, "order_ABC", "pay_123", &sig));
    }

    #[test]
    fn rejects_tampered_payload() {
        let sig = sign(SECRET, "order_ABC", "pay_123");
        assert!(!verify_signature(SECRET, "order_ABC", "pay_124", &sig));
        assert!(!verify_signature(SECRET, "order_ABD", "pay_123", &sig));
        assert!(!verify_signature("other_secret", "order_ABC", "pay_123", &sig));
    }

    #[test]
    fn rejects_malformed_signature() {
        assert!(!verify_signature(SECRET, "order_ABC", "pay_123", "not-hex"));
        assert!(!verify_signature(SECRET, "order_ABC", "pay_123", ""));
        assert!(!verify_signature(SECRET, "order_ABC", "pay_123", "abcd"));
    }

    #[test]
    fn separator_is_part_of_the_message() {
        // "a|bc" and "ab|c" must not collide.
        assert_ne!(sign(SECRET, "a", "bc"), sign(SECRET, "ab", "c"));
    }
}
