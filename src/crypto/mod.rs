//! Entry encryption.
//!
//! The store never encrypts anything itself. It talks to a [`Cipher`]
//! collaborator chosen at startup: [`AgeCipher`] for real passphrase-based
//! encryption, or [`NoCipher`] when encryption is unavailable. The
//! [`gate`] module decides what happens around a cipher call: falling back
//! to plaintext when sealing fails, and substituting placeholders when a
//! block cannot be opened.
//!
//! # Module Structure
//!
//! - `age`: the age passphrase cipher with ASCII armor
//! - `gate`: sealing new entries and decrypting files for display
//! - `passphrase`: reading the key from the environment or the terminal
//!
//! # Example
//!
//! ```no_run
//! use devjournal::crypto::{AgeCipher, Cipher};
//! use age::secrecy::SecretString;
//!
//! let key = SecretString::new("my-secret-passphrase".to_string());
//! let cipher = AgeCipher;
//! let armored = cipher.encrypt("**Worked on**: \nSecret project\n", &key)?;
//! let plain = cipher.decrypt(&armored, &key)?;
//! assert!(plain.contains("Secret project"));
//! # Ok::<(), devjournal::AppError>(())
//! ```

pub mod age;
pub mod gate;
pub mod passphrase;

use crate::errors::{AppResult, CryptoError};
use ::age::secrecy::SecretString;
use zeroize::Zeroizing;

pub use self::age::AgeCipher;
pub use self::gate::{EncryptionGate, SealedBlock};
pub use self::passphrase::obtain_passphrase;

/// Symmetric encryption of entry text under a user passphrase.
///
/// Ciphertext must be line-oriented text so it can live inside a period
/// file between the marker line and the record separator.
pub trait Cipher {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Encrypts `plaintext` under `key`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Crypto` if encryption is unavailable or fails.
    fn encrypt(&self, plaintext: &str, key: &SecretString) -> AppResult<String>;

    /// Decrypts text produced by [`Cipher::encrypt`].
    ///
    /// # Errors
    ///
    /// Returns `AppError::Crypto` for a wrong key, corrupted ciphertext, or
    /// when decryption is unavailable.
    fn decrypt(&self, ciphertext: &str, key: &SecretString) -> AppResult<Zeroizing<String>>;
}

/// Cipher used when no encryption backend is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCipher;

impl Cipher for NoCipher {
    fn name(&self) -> &'static str {
        "none"
    }

    fn encrypt(&self, _plaintext: &str, _key: &SecretString) -> AppResult<String> {
        Err(CryptoError::Unavailable("no cipher configured".to_string()).into())
    }

    fn decrypt(&self, _ciphertext: &str, _key: &SecretString) -> AppResult<Zeroizing<String>> {
        Err(CryptoError::Unavailable("no cipher configured".to_string()).into())
    }
}
