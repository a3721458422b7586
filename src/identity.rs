use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use age::secrecy::{ExposeSecret, SecretString};
use bech32::{ToBase32, Variant};
use sha2::{Digest, Sha512};
use ssh_key::private::KeypairData;

use crate::error::{GitCryptError, Result};
use crate::rage::PromptCallbacks;
use crate::settings::Settings;

const SECRET_KEY_HRP: &str = "age-secret-key-";

/// The invoking user's decryption credentials.
///
/// Loaded once per filter run; every contained identity is offered to the
/// decryptor.
pub struct Identity {
    identities: Vec<Box<dyn age::Identity>>,
}

impl Identity {
    /// Load the SSH key and any age identity files named in `settings`.
    pub fn load(settings: &Settings) -> Result<Self> {
        let ssh_path = settings.ssh_identity_path()?;
        let age_paths = settings.age_identity_paths();
        let mut identities: Vec<Box<dyn age::Identity>> = Vec::new();

        match fs::read(&ssh_path) {
            Ok(bytes) => {
                let label = ssh_path.display().to_string();
                identities.extend(ssh_identities(&bytes, &label, &ssh_path)?);
            }
            Err(e) if e.kind() == ErrorKind::NotFound && age_paths.is_empty() => {
                return Err(GitCryptError::MissingIdentity(ssh_path));
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("no SSH key at {}, using age identities only", ssh_path.display());
            }
            Err(e) => return Err(e.into()),
        }

        for path in &age_paths {
            for identity in read_age_identities(path)? {
                identities.push(Box::new(identity));
            }
        }

        log::debug!("loaded {} identity(ies)", identities.len());
        Ok(Self { identities })
    }

    /// Parse an OpenSSH private key held in memory.
    pub fn from_ssh_buffer(bytes: &[u8], label: &str) -> Result<Self> {
        Ok(Self {
            identities: ssh_identities(bytes, label, Path::new(label))?,
        })
    }

    pub fn from_x25519(identities: Vec<age::x25519::Identity>) -> Self {
        Self {
            identities: identities
                .into_iter()
                .map(|identity| Box::new(identity) as Box<dyn age::Identity>)
                .collect(),
        }
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &dyn age::Identity> {
        self.identities
            .iter()
            .map(|identity| -> &dyn age::Identity { identity.as_ref() })
    }
}

/// The SSH key itself, preceded by its X25519 conversion when it is an
/// unencrypted Ed25519 key. Files encrypted to the converted `age1...`
/// recipient (what `ssh-to-age` prints) decrypt through the latter.
fn ssh_identities(
    bytes: &[u8],
    label: &str,
    path: &Path,
) -> Result<Vec<Box<dyn age::Identity>>> {
    let ssh = ssh_identity(bytes, label, path)?;
    let mut identities: Vec<Box<dyn age::Identity>> = Vec::with_capacity(2);
    if let Some(converted) = ed25519_to_x25519(bytes, path)? {
        identities.push(Box::new(converted));
    }
    identities.push(ssh);
    Ok(identities)
}

fn ssh_identity(bytes: &[u8], label: &str, path: &Path) -> Result<Box<dyn age::Identity>> {
    let identity = age::ssh::Identity::from_buffer(bytes, Some(label.to_string())).map_err(|e| {
        GitCryptError::InvalidIdentity {
            path: path.to_path_buf(),
            reason: format!("Invalid SSH identity: {e}"),
        }
    })?;

    if let age::ssh::Identity::Unsupported(_) = identity {
        return Err(GitCryptError::InvalidIdentity {
            path: path.to_path_buf(),
            reason: "unsupported SSH key type".into(),
        });
    }

    Ok(Box::new(identity.with_callbacks(PromptCallbacks::new(label))))
}

/// Derive the X25519 identity of an Ed25519 key the way `ssh-to-age` does:
/// the clamped first half of SHA-512 over the seed, as an age secret key.
///
/// Encrypted and non-Ed25519 keys have no conversion and yield `None`.
fn ed25519_to_x25519(bytes: &[u8], path: &Path) -> Result<Option<age::x25519::Identity>> {
    let key = match ssh_key::PrivateKey::from_openssh(bytes) {
        Ok(key) => key,
        Err(e) => {
            log::debug!("no X25519 conversion for {}: {e}", path.display());
            return Ok(None);
        }
    };
    if key.is_encrypted() {
        log::debug!("{} is passphrase protected, skipping X25519 conversion", path.display());
        return Ok(None);
    }
    let KeypairData::Ed25519(keypair) = key.key_data() else {
        return Ok(None);
    };

    let seed: &[u8; 32] = keypair.private.as_ref();
    let hash = Sha512::digest(seed);
    let mut scalar = [0u8; 32];
    scalar.copy_from_slice(&hash[..32]);
    scalar[0] &= 248;
    scalar[31] &= 127;
    scalar[31] |= 64;

    let invalid = |reason: String| GitCryptError::InvalidIdentity {
        path: path.to_path_buf(),
        reason,
    };
    let encoded = bech32::encode(SECRET_KEY_HRP, scalar.to_base32(), Variant::Bech32)
        .map(|s| SecretString::new(s.to_uppercase().into()))
        .map_err(|e| invalid(format!("X25519 conversion failed: {e}")))?;
    scalar.fill(0);

    encoded
        .expose_secret()
        .parse::<age::x25519::Identity>()
        .map(Some)
        .map_err(|e| invalid(format!("X25519 conversion failed: {e}")))
}

/// Read `AGE-SECRET-KEY-1...` lines; blank lines and `#` comments are skipped.
fn read_age_identities(path: &Path) -> Result<Vec<age::x25519::Identity>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(GitCryptError::MissingIdentity(path.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };

    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| {
            line.parse::<age::x25519::Identity>()
                .map_err(|e| GitCryptError::InvalidIdentity {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })
        })
        .collect()
}
