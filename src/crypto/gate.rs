//! The encryption gate between entries and the cipher.
//!
//! Sealing wraps a serialized entry body in ciphertext under the entry's
//! heading. Opening works on a parsed copy of a period file: each encrypted
//! block is decrypted on its own and rendered back as readable fields, or
//! as a placeholder when the key is wrong. The stored file is never
//! rewritten; callers get a display string.

use super::Cipher;
use crate::constants::DECRYPT_FAILED_PLACEHOLDER;
use crate::errors::{AppResult, CryptoError};
use crate::journal_core::format::{self, BlockBody, ParseWarning, ParsedBlock};
use crate::journal_core::EntryRecord;
use age::secrecy::SecretString;
use tracing::{debug, warn};

/// A serialized block ready for the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedBlock {
    /// The block text, heading to separator.
    pub block: String,
    /// Whether the body was encrypted.
    pub encrypted: bool,
    /// Why the block fell back to plaintext, if it did.
    pub warning: Option<String>,
}

/// A period file rendered for display with encrypted blocks opened.
#[derive(Debug, Clone, Default)]
pub struct DecryptedView {
    /// The rendered text. Not meant to be written back.
    pub text: String,
    /// Every readable entry in file order, decrypted ones included.
    pub entries: Vec<EntryRecord>,
    /// Encrypted blocks opened.
    pub decrypted: usize,
    /// Encrypted blocks replaced by the placeholder.
    pub failed: usize,
    /// Parse problems in the file.
    pub warnings: Vec<ParseWarning>,
}

enum Opened {
    Replaced {
        rendered: String,
        record: Option<EntryRecord>,
    },
    Failed {
        rendered: String,
    },
}

/// Applies a [`Cipher`] to entries on their way in and out of the store.
pub struct EncryptionGate<'a> {
    cipher: &'a dyn Cipher,
}

impl<'a> EncryptionGate<'a> {
    /// Creates a gate over `cipher`.
    pub fn new(cipher: &'a dyn Cipher) -> Self {
        EncryptionGate { cipher }
    }

    /// Serializes `record`, encrypting its body when a key is supplied.
    ///
    /// Never fails: without a key, or when the cipher errors, the entry is
    /// serialized in plaintext and the reason is returned as a warning.
    pub fn seal(&self, record: &EntryRecord, key: Option<&SecretString>) -> SealedBlock {
        let Some(key) = key else {
            return plaintext(record, "no passphrase was supplied".to_string());
        };

        match self.cipher.encrypt(&format::serialize_body(record), key) {
            Ok(ciphertext) => {
                debug!("Sealed entry with {} cipher", self.cipher.name());
                SealedBlock {
                    block: format::encrypted_block(record, &ciphertext),
                    encrypted: true,
                    warning: None,
                }
            }
            Err(e) => plaintext(record, e.to_string()),
        }
    }

    /// Renders `text` with every encrypted block opened under `key`.
    ///
    /// Blocks are handled independently: one block failing to decrypt does
    /// not affect the others.
    pub fn decrypt_for_view(&self, text: &str, key: &SecretString) -> DecryptedView {
        let parsed = format::parse_entries(text);
        let mut view = DecryptedView {
            text: parsed.preamble.clone(),
            warnings: parsed.warnings.clone(),
            ..DecryptedView::default()
        };

        for block in &parsed.blocks {
            let BlockBody::Encrypted { ciphertext } = &block.body else {
                view.text.push_str(&block.raw);
                view.entries.extend(block.to_record());
                continue;
            };

            match self.open(block, ciphertext, key) {
                Opened::Replaced { rendered, record } => {
                    view.decrypted += 1;
                    view.text.push_str(&rendered);
                    view.entries.extend(record);
                }
                Opened::Failed { rendered } => {
                    view.failed += 1;
                    view.text.push_str(&rendered);
                }
            }
        }

        debug!(
            "Opened {} encrypted entries, {} failed",
            view.decrypted, view.failed
        );
        view
    }

    fn open(&self, block: &ParsedBlock, ciphertext: &str, key: &SecretString) -> Opened {
        match self.decrypt_block(block, ciphertext, key) {
            Ok((rendered, record)) => Opened::Replaced { rendered, record },
            Err(e) => {
                debug!(
                    "Entry at line {} could not be decrypted: {}",
                    block.start_line + 1,
                    e
                );
                Opened::Failed {
                    rendered: format::redisplay_block(
                        block,
                        &format!("{}\n\n", DECRYPT_FAILED_PLACEHOLDER),
                    ),
                }
            }
        }
    }

    fn decrypt_block(
        &self,
        block: &ParsedBlock,
        ciphertext: &str,
        key: &SecretString,
    ) -> AppResult<(String, Option<EntryRecord>)> {
        let plain = self.cipher.decrypt(ciphertext, key)?;
        let BlockBody::Plain { duration, fields } = format::parse_body_text(plain.as_str()) else {
            return Err(CryptoError::InvalidText.into());
        };

        let body = format::render_body(duration.as_deref(), &fields);
        let record = match (block.kind, block.timestamp) {
            (Some(kind), Some(timestamp)) => {
                let mut record = EntryRecord::from_parts(kind, timestamp, duration, fields);
                record.mark_encrypted();
                Some(record)
            }
            _ => None,
        };
        Ok((format::redisplay_block(block, &body), record))
    }
}

fn plaintext(record: &EntryRecord, reason: String) -> SealedBlock {
    warn!("Storing entry unencrypted: {}", reason);
    SealedBlock {
        block: format::serialize(record),
        encrypted: false,
        warning: Some(format!("Entry stored without encryption: {}", reason)),
    }
}
