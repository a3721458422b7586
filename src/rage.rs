use std::io::{self, Read, Write};

use crate::error::{GitCryptError, Result};
use crate::identity::Identity;
use crate::recipient::Recipient;

use age::secrecy::SecretString;
use age::{Callbacks, DecryptError, Decryptor, EncryptError, Encryptor};
use rpassword::prompt_password;

/// Encrypt everything read from `reader` to `recipients`, streaming the age
/// file into `writer`.
///
/// Every call draws fresh randomness, so equal plaintexts never produce
/// equal ciphertexts.
pub fn encrypt<R: Read, W: Write>(
    recipients: &[Recipient],
    mut reader: R,
    writer: W,
) -> Result<W> {
    let encryptor = Encryptor::with_recipients(recipients.iter().map(Recipient::as_age))
        .map_err(map_encrypt_err)?;

    let mut stream = encryptor.wrap_output(writer)?;
    io::copy(&mut reader, &mut stream)?;
    let mut writer = stream.finish()?;
    writer.flush()?;

    Ok(writer)
}

/// Decrypt an age file from `reader` into `writer`.
pub fn decrypt<R: Read, W: Write>(identity: &Identity, reader: R, mut writer: W) -> Result<W> {
    let decryptor = Decryptor::new(reader).map_err(map_decrypt_err)?;
    let mut stream = decryptor.decrypt(identity.iter()).map_err(map_decrypt_err)?;

    io::copy(&mut stream, &mut writer)?;
    writer.flush()?;

    Ok(writer)
}

/// Decrypt a complete age file held in memory.
///
/// Any failure, including a truncated or tampered payload, is reported as a
/// decryption error.
pub fn decrypt_to_vec(identity: &Identity, ciphertext: &[u8]) -> Result<Vec<u8>> {
    let decryptor = Decryptor::new_buffered(ciphertext).map_err(map_decrypt_err)?;
    let mut stream = decryptor.decrypt(identity.iter()).map_err(map_decrypt_err)?;

    let mut plaintext = Vec::new();
    stream
        .read_to_end(&mut plaintext)
        .map_err(|e| GitCryptError::Decryption(e.to_string()))?;

    Ok(plaintext)
}

fn map_encrypt_err(err: EncryptError) -> GitCryptError {
    GitCryptError::Encryption(format!("age encryption failed: {err}"))
}

fn map_decrypt_err(err: DecryptError) -> GitCryptError {
    GitCryptError::Decryption(format!("age decryption failed: {err}"))
}

/// Terminal prompts for passphrase-protected SSH keys.
#[derive(Clone)]
pub(crate) struct PromptCallbacks {
    identity_label: String,
}

impl PromptCallbacks {
    pub(crate) fn new(identity_label: &str) -> Self {
        Self {
            identity_label: identity_label.to_string(),
        }
    }
}

impl Callbacks for PromptCallbacks {
    fn display_message(&self, message: &str) {
        eprintln!("{message}");
    }

    fn confirm(&self, _: &str, _: &str, _: Option<&str>) -> Option<bool> {
        None
    }

    fn request_public_string(&self, _: &str) -> Option<String> {
        None
    }

    fn request_passphrase(&self, description: &str) -> Option<SecretString> {
        let prompt = if description.is_empty() {
            format!("Passphrase for {}", self.identity_label)
        } else {
            description.to_string()
        };

        match prompt_password(format!("{prompt}: ")) {
            Ok(passphrase) => Some(SecretString::new(passphrase.into())),
            Err(err) => {
                eprintln!("Failed to read passphrase: {err}");
                None
            }
        }
    }
}
