//! Per-submission secret keys.

/// Characters a secret key is drawn from.
const CHARSET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz-";

/// Length of a generated secret key.
pub const SECRET_KEY_LENGTH: usize = 256;

/// Generates the token a workflow's tasks authenticate with when calling
/// back into the record store. The revoke task invalidates it.
pub fn generate_secret_key() -> String {
    (0..SECRET_KEY_LENGTH)
        .map(|_| CHARSET[rand::random_range(0..CHARSET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_key_uses_charset() {
        let secret = generate_secret_key();
        assert_eq!(secret.len(), SECRET_KEY_LENGTH);
        assert!(secret.bytes().all(|b| CHARSET.contains(&b)));
    }

    #[test]
    fn secret_keys_differ() {
        assert_ne!(generate_secret_key(), generate_secret_key());
    }
}
