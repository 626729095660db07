//! Age passphrase encryption for journal entries.
//!
//! Entries are encrypted with age's scrypt passphrase recipient and written
//! with ASCII armor, so the ciphertext is a block of text lines that sits
//! safely inside a markdown period file.

use super::Cipher;
use crate::errors::{AppResult, CryptoError};
use age::armor::{ArmoredReader, ArmoredWriter, Format};
use age::secrecy::SecretString;
use age::DecryptError;
use std::io::{Read, Write};
use tracing::debug;
use zeroize::Zeroizing;

/// The age passphrase cipher.
///
/// Each call runs scrypt, which is deliberately slow (around a second).
#[derive(Debug, Default, Clone, Copy)]
pub struct AgeCipher;

impl Cipher for AgeCipher {
    fn name(&self) -> &'static str {
        "age"
    }

    fn encrypt(&self, plaintext: &str, key: &SecretString) -> AppResult<String> {
        let encryptor = age::Encryptor::with_user_passphrase(key.clone());

        let mut armored = Vec::new();
        let armor = ArmoredWriter::wrap_output(&mut armored, Format::AsciiArmor)
            .map_err(CryptoError::Armor)?;
        let mut writer = encryptor
            .wrap_output(armor)
            .map_err(CryptoError::EncryptionFailed)?;
        writer
            .write_all(plaintext.as_bytes())
            .map_err(CryptoError::Armor)?;
        writer
            .finish()
            .and_then(|armor| armor.finish())
            .map_err(CryptoError::Armor)?;

        debug!("Encrypted {} bytes", plaintext.len());
        String::from_utf8(armored).map_err(|_| CryptoError::InvalidText.into())
    }

    fn decrypt(&self, ciphertext: &str, key: &SecretString) -> AppResult<Zeroizing<String>> {
        let reader = ArmoredReader::new(ciphertext.trim().as_bytes());
        let decryptor = match age::Decryptor::new(reader).map_err(map_decrypt_error)? {
            age::Decryptor::Passphrase(d) => d,
            _ => return Err(CryptoError::UnsupportedFormat.into()),
        };

        let mut stream = decryptor.decrypt(key, None).map_err(map_decrypt_error)?;
        let mut bytes = Zeroizing::new(Vec::new());
        stream
            .read_to_end(&mut bytes)
            .map_err(CryptoError::Armor)?;

        let text = std::str::from_utf8(&bytes).map_err(|_| CryptoError::InvalidText)?;
        debug!("Decrypted {} bytes", bytes.len());
        Ok(Zeroizing::new(text.to_string()))
    }
}

fn map_decrypt_error(error: DecryptError) -> CryptoError {
    match error {
        DecryptError::DecryptionFailed | DecryptError::NoMatchingKeys => {
            CryptoError::InvalidPassphrase
        }
        DecryptError::InvalidHeader => CryptoError::UnsupportedFormat,
        other => CryptoError::DecryptionFailed(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let key = SecretString::new("correct horse".to_string());
        let plaintext = "**Worked on**: \nSecret project\n\n";

        let armored = AgeCipher.encrypt(plaintext, &key).expect("encrypt");
        assert!(armored.starts_with("-----BEGIN AGE ENCRYPTED FILE-----"));
        assert!(!armored.contains("Secret project"));

        let decrypted = AgeCipher.decrypt(&armored, &key).expect("decrypt");
        assert_eq!(decrypted.as_str(), plaintext);

        let wrong = SecretString::new("battery staple".to_string());
        assert!(matches!(
            AgeCipher.decrypt(&armored, &wrong),
            Err(AppError::Crypto(CryptoError::InvalidPassphrase))
        ));
        // Armored output stays line-oriented so it can sit in a period file.
        assert!(armored.lines().all(|l| l.len() <= 64));
    }

    #[test]
    fn test_garbage_ciphertext_fails() {
        let key = SecretString::new("k".to_string());
        assert!(AgeCipher.decrypt("not ciphertext at all", &key).is_err());
    }
}
