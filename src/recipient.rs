use std::fmt;
use std::str::FromStr;

use crate::error::{GitCryptError, Result};

/// A public key authorized to decrypt a path.
///
/// Accepts native age X25519 keys (`age1...`) and SSH public keys
/// (`ssh-ed25519 ...`, `ssh-rsa ...`).
pub struct Recipient {
    key: String,
    kind: RecipientKind,
}

enum RecipientKind {
    X25519(age::x25519::Recipient),
    Ssh(age::ssh::Recipient),
}

impl Recipient {
    /// The key text as written in the rule file.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub(crate) fn as_age(&self) -> &dyn age::Recipient {
        match &self.kind {
            RecipientKind::X25519(recipient) => recipient,
            RecipientKind::Ssh(recipient) => recipient,
        }
    }

    /// Parse a comma separated recipient list, trimming every entry.
    ///
    /// A single bad entry fails the whole list.
    pub fn parse_list(list: &str) -> Result<Vec<Recipient>> {
        list.split(',').map(|entry| entry.trim().parse()).collect()
    }
}

impl FromStr for Recipient {
    type Err = GitCryptError;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim();
        let kind = if key.starts_with("age1") {
            key.parse::<age::x25519::Recipient>()
                .map(RecipientKind::X25519)
                .map_err(|e| GitCryptError::MalformedRecipient {
                    recipient: key.to_string(),
                    reason: e.to_string(),
                })?
        } else {
            key.parse::<age::ssh::Recipient>()
                .map(RecipientKind::Ssh)
                .map_err(|e| GitCryptError::MalformedRecipient {
                    recipient: key.to_string(),
                    reason: format!("invalid SSH recipient: {e:?}"),
                })?
        };

        Ok(Self {
            key: key.to_string(),
            kind,
        })
    }
}

impl fmt::Debug for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Recipient").field(&self.key).finish()
    }
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

impl PartialEq for Recipient {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Recipient {}
