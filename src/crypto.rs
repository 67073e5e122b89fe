use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    Aes256Gcm, Key,
};
use anyhow::{anyhow, Result};
use base64::{engine::general_purpose::STANDARD, Engine};

const KEY_SIZE: usize = 32;

/// Encrypts calendar OAuth tokens before they reach the database.
///
/// Stored form is `base64(nonce || ciphertext)`.
#[derive(Clone)]
pub struct TokenCrypto {
    cipher: Aes256Gcm,
}

impl std::fmt::Debug for TokenCrypto {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("TokenCrypto(..)")
    }
}

impl TokenCrypto {
    pub fn from_hex_key(key: &str) -> Result<Self> {
        let key_bytes = hex::decode(key.trim())
            .map_err(|_| anyhow!("TOKEN_ENCRYPTION_KEY must be a hex string"))?;

        if key_bytes.len() != KEY_SIZE {
            return Err(anyhow!(
                "TOKEN_ENCRYPTION_KEY must be {} bytes ({} hex characters)",
                KEY_SIZE,
                KEY_SIZE * 2
            ));
        }

        let key = Key::<Aes256Gcm>::from_slice(&key_bytes);
        Ok(Self {
            cipher: Aes256Gcm::new(key),
        })
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|e| anyhow!("Token encryption failed: {}", e))?;

        let mut sealed = nonce.to_vec();
        sealed.extend_from_slice(&ciphertext);
        Ok(STANDARD.encode(&sealed))
    }

    pub fn encrypt_optional(&self, plaintext: Option<&str>) -> Result<Option<String>> {
        plaintext.map(|p| self.encrypt(p)).transpose()
    }
}

// Tokens are only ever read back by the calendar collaborator, outside this
// service.
#[cfg(test)]
impl TokenCrypto {
    const NONCE_SIZE: usize = 12;

    pub fn decrypt(&self, sealed: &str) -> Result<String> {
        use aes_gcm::Nonce;

        let bytes = STANDARD
            .decode(sealed)
            .map_err(|e| anyhow!("Stored token is not base64: {}", e))?;

        if bytes.len() <= Self::NONCE_SIZE {
            return Err(anyhow!("Stored token is truncated"));
        }

        let (nonce_bytes, ciphertext) = bytes.split_at(Self::NONCE_SIZE);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|e| anyhow!("Token decryption failed: {}", e))?;

        String::from_utf8(plaintext).map_err(|e| anyhow!("Decrypted token is not UTF-8: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "00112233445566778899aabbccddeeff00112233445566778899aabbccddeeff";

    #[test]
    fn test_access_token_survives_storage() {
        let crypto = TokenCrypto::from_hex_key(KEY).unwrap();

        let sealed = crypto.encrypt("ya29.a0AfH6SMBexample").unwrap();
        assert!(!sealed.contains("ya29"));
        assert_eq!(crypto.decrypt(&sealed).unwrap(), "ya29.a0AfH6SMBexample");
    }

    #[test]
    fn test_each_seal_uses_fresh_nonce() {
        let crypto = TokenCrypto::from_hex_key(KEY).unwrap();
        let a = crypto.encrypt("refresh-token").unwrap();
        let b = crypto.encrypt("refresh-token").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_optional_refresh_token() {
        let crypto = TokenCrypto::from_hex_key(KEY).unwrap();
        assert_eq!(crypto.encrypt_optional(None).unwrap(), None);
        let sealed = crypto.encrypt_optional(Some("rt")).unwrap().unwrap();
        assert_eq!(crypto.decrypt(&sealed).unwrap(), "rt");
    }

    #[test]
    fn test_rejects_bad_keys_and_tampering() {
        assert!(TokenCrypto::from_hex_key("not-hex").is_err());
        assert!(TokenCrypto::from_hex_key("abcd").is_err());

        let crypto = TokenCrypto::from_hex_key(KEY).unwrap();
        let other = TokenCrypto::from_hex_key(&KEY.replace('0', "1")).unwrap();
        let sealed = crypto.encrypt("secret").unwrap();
        assert!(other.decrypt(&sealed).is_err());
        assert!(crypto.decrypt("AAAA").is_err());
    }
}
