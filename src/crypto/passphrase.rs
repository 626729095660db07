//! Reading the entry passphrase.
//!
//! The key is supplied per command and never stored. `DEVJOURNAL_PASSPHRASE`
//! takes precedence so scripts and tests can run without a terminal.

use crate::constants;
use crate::errors::{AppResult, CryptoError};
use age::secrecy::SecretString;
use tracing::debug;
use zeroize::Zeroizing;

/// Returns the passphrase from `DEVJOURNAL_PASSPHRASE`, prompting when unset.
///
/// With `confirm`, a prompted passphrase must be typed twice. Used when
/// sealing a new entry, where a typo would make it unreadable.
///
/// # Errors
///
/// - `CryptoError::EmptyPassphrase` for an empty passphrase
/// - `CryptoError::PassphraseMismatch` if the confirmation differs
/// - `CryptoError::PassphrasePrompt` if the terminal cannot be read
pub fn obtain_passphrase(confirm: bool) -> AppResult<SecretString> {
    if let Ok(value) = std::env::var(constants::ENV_VAR_DEVJOURNAL_PASSPHRASE) {
        debug!(
            "Using passphrase from {}",
            constants::ENV_VAR_DEVJOURNAL_PASSPHRASE
        );
        let value = Zeroizing::new(value);
        return to_secret(&value);
    }

    let passphrase = prompt("Passphrase: ")?;
    if confirm {
        let confirmation = prompt("Confirm passphrase: ")?;
        if *passphrase != *confirmation {
            return Err(CryptoError::PassphraseMismatch.into());
        }
    }
    to_secret(&passphrase)
}

fn prompt(label: &str) -> AppResult<Zeroizing<String>> {
    rpassword::prompt_password(label)
        .map(Zeroizing::new)
        .map_err(|e| CryptoError::PassphrasePrompt(e.to_string()).into())
}

fn to_secret(value: &str) -> AppResult<SecretString> {
    if value.is_empty() {
        return Err(CryptoError::EmptyPassphrase.into());
    }
    Ok(SecretString::new(value.to_string()))
}
