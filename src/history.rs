//! # History Comparison
//!
//! age encryption is randomized, so cleaning the same plaintext twice yields
//! two different ciphertexts and git would see a modification on every
//! `git add`. Before encrypting, the clean filter decrypts the version stored
//! at the history tip and, when the plaintext is unchanged, hands back the
//! stored ciphertext byte for byte.

use std::io::Read;

use crate::error::Result;
use crate::identity::Identity;
use crate::path::PathComponents;
use crate::rage;

/// What the history tip holds for a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeadBlob {
    /// The repository has no commits yet.
    Headless,
    /// The tip commit does not contain the path.
    Absent,
    /// Stored (encrypted) bytes of the path at the tip commit.
    Present(Vec<u8>),
}

/// Read access to the history tip.
pub trait HeadSource {
    fn head_blob(&self, path: &PathComponents) -> Result<HeadBlob>;
}

/// Outcome of comparing new plaintext with the stored version.
#[derive(Debug, PartialEq, Eq)]
pub enum Comparison {
    /// Nothing stored to compare with; the input has not been read.
    HeadMissing,
    /// Same plaintext as stored; carries the stored ciphertext.
    Unchanged { ciphertext: Vec<u8> },
    /// Plaintext differs; carries the input, which has been fully read.
    Changed { plaintext: Vec<u8> },
}

/// Compare `input` with the stored version of `path`.
///
/// `load_identity` runs only when there is a stored version to decrypt. A
/// stored version that fails to decrypt is an error, never "no prior
/// version".
pub fn compare<S, F, R>(
    source: &S,
    path: &PathComponents,
    load_identity: F,
    mut input: R,
) -> Result<Comparison>
where
    S: HeadSource + ?Sized,
    F: FnOnce() -> Result<Identity>,
    R: Read,
{
    let stored = match source.head_blob(path)? {
        HeadBlob::Headless => {
            log::debug!("no commits yet, nothing to compare {path} with");
            return Ok(Comparison::HeadMissing);
        }
        HeadBlob::Absent => {
            log::debug!("{path} is not in the last commit");
            return Ok(Comparison::HeadMissing);
        }
        HeadBlob::Present(stored) => stored,
    };

    let identity = load_identity()?;
    let previous = rage::decrypt_to_vec(&identity, &stored)?;

    let mut plaintext = Vec::new();
    input.read_to_end(&mut plaintext)?;

    // Slice equality rejects on length before touching the bytes.
    if previous == plaintext {
        Ok(Comparison::Unchanged { ciphertext: stored })
    } else {
        Ok(Comparison::Changed { plaintext })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GitCryptError;
    use crate::recipient::Recipient;
    use std::cell::Cell;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MemoryHead {
        commits: bool,
        files: HashMap<String, Vec<u8>>,
    }

    impl HeadSource for MemoryHead {
        fn head_blob(&self, path: &PathComponents) -> Result<HeadBlob> {
            if !self.commits {
                return Ok(HeadBlob::Headless);
            }
            Ok(self
                .files
                .get(&path.relative())
                .cloned()
                .map_or(HeadBlob::Absent, HeadBlob::Present))
        }
    }

    struct Fixture {
        secret: age::x25519::Identity,
        recipient: Recipient,
    }

    impl Fixture {
        fn new() -> Self {
            let secret = age::x25519::Identity::generate();
            let recipient = secret.to_public().to_string().parse().unwrap();
            Self { secret, recipient }
        }

        fn identity(&self) -> Result<Identity> {
            Ok(Identity::from_x25519(vec![self.secret.clone()]))
        }

        fn head_with(&self, path: &str, plaintext: &[u8]) -> (MemoryHead, Vec<u8>) {
            let ciphertext =
                rage::encrypt(std::slice::from_ref(&self.recipient), plaintext, Vec::new())
                    .unwrap();
            let mut head = MemoryHead {
                commits: true,
                ..MemoryHead::default()
            };
            head.files.insert(path.to_string(), ciphertext.clone());
            (head, ciphertext)
        }
    }

    #[test]
    fn headless_repository_skips_decryption() {
        let head = MemoryHead::default();
        let loaded = Cell::new(false);
        let result = compare(
            &head,
            &PathComponents::split("secret.txt"),
            || {
                loaded.set(true);
                Err(GitCryptError::NotInitialized)
            },
            &b"data"[..],
        )
        .unwrap();

        assert_eq!(result, Comparison::HeadMissing);
        assert!(!loaded.get());
    }

    #[test]
    fn new_file_is_head_missing() {
        let fixture = Fixture::new();
        let (head, _) = fixture.head_with("other.txt", b"x");
        let result = compare(
            &head,
            &PathComponents::split("secret.txt"),
            || Err(GitCryptError::NotInitialized),
            &b"data"[..],
        )
        .unwrap();
        assert_eq!(result, Comparison::HeadMissing);
    }

    #[test]
    fn identical_plaintext_returns_stored_ciphertext() {
        let fixture = Fixture::new();
        let (head, stored) = fixture.head_with("a/secret.txt", b"password=hunter2\n");

        let result = compare(
            &head,
            &PathComponents::split("a/secret.txt"),
            || fixture.identity(),
            &b"password=hunter2\n"[..],
        )
        .unwrap();
        assert_eq!(result, Comparison::Unchanged { ciphertext: stored });
    }

    #[test]
    fn one_byte_difference_is_changed() {
        let fixture = Fixture::new();
        let (head, _) = fixture.head_with("secret.txt", b"password=hunter2\n");

        let result = compare(
            &head,
            &PathComponents::split("secret.txt"),
            || fixture.identity(),
            &b"password=hunter3\n"[..],
        )
        .unwrap();
        assert_eq!(
            result,
            Comparison::Changed {
                plaintext: b"password=hunter3\n".to_vec()
            }
        );
    }

    #[test]
    fn length_difference_is_changed() {
        let fixture = Fixture::new();
        let (head, _) = fixture.head_with("secret.txt", b"abc");

        let result = compare(
            &head,
            &PathComponents::split("secret.txt"),
            || fixture.identity(),
            &b"abcd"[..],
        )
        .unwrap();
        assert!(matches!(result, Comparison::Changed { .. }));
    }

    #[test]
    fn undecryptable_history_is_fatal() {
        let fixture = Fixture::new();
        let stranger = Fixture::new();
        let (head, _) = fixture.head_with("secret.txt", b"abc");

        let err = compare(
            &head,
            &PathComponents::split("secret.txt"),
            || stranger.identity(),
            &b"abc"[..],
        )
        .unwrap_err();
        assert!(matches!(err, GitCryptError::Decryption(_)));
    }

    #[test]
    fn plaintext_in_history_is_fatal() {
        let mut head = MemoryHead {
            commits: true,
            ..MemoryHead::default()
        };
        head.files.insert("secret.txt".into(), b"committed before encryption".to_vec());
        let fixture = Fixture::new();

        let err = compare(
            &head,
            &PathComponents::split("secret.txt"),
            || fixture.identity(),
            &b"abc"[..],
        )
        .unwrap_err();
        assert!(matches!(err, GitCryptError::Decryption(_)));
    }

    #[test]
    fn identity_failure_propagates() {
        let fixture = Fixture::new();
        let (head, _) = fixture.head_with("secret.txt", b"abc");

        let err = compare(
            &head,
            &PathComponents::split("secret.txt"),
            || Err(GitCryptError::MissingIdentity("id_ed25519".into())),
            &b"abc"[..],
        )
        .unwrap_err();
        assert!(matches!(err, GitCryptError::MissingIdentity(_)));
    }
}
