//! # Filter Engine
//!
//! The three filter protocols git drives through this crate:
//!
//! - **clean** (`git add`): plaintext in, age ciphertext out
//! - **smudge** (`git checkout`): age ciphertext in, plaintext out
//! - **textconv** (`git diff`, `git show`): file contents copied verbatim
//!
//! Each call is a single pass with no retry. On error the output may hold a
//! partial result and must be discarded by the caller.

use std::fs::File;
use std::io::{self, Cursor, Read, Write};
use std::path::Path;

use crate::error::Result;
use crate::history::{self, Comparison, HeadSource};
use crate::identity::Identity;
use crate::path::PathComponents;
use crate::rage;
use crate::resolver::RecipientResolver;

/// Encrypt `input` for the recipients of `path`.
///
/// When the plaintext equals the version at the history tip, the stored
/// ciphertext is written instead so that re-adding an untouched file does not
/// produce a new blob.
pub fn clean<S, F, R, W>(
    source: &S,
    resolver: &RecipientResolver,
    path: &PathComponents,
    load_identity: F,
    mut input: R,
    mut output: W,
) -> Result<()>
where
    S: HeadSource + ?Sized,
    F: FnOnce() -> Result<Identity>,
    R: Read,
    W: Write,
{
    match history::compare(source, path, load_identity, &mut input)? {
        Comparison::Unchanged { ciphertext } => {
            log::info!("no changes found while cleaning {path}");
            output.write_all(&ciphertext)?;
            output.flush()?;
        }
        Comparison::Changed { plaintext } => {
            log::info!("found changes while cleaning {path}");
            let recipients = resolver.resolve(path)?;
            rage::encrypt(&recipients, Cursor::new(plaintext), output)?;
        }
        Comparison::HeadMissing => {
            log::info!("encrypting new file {path}");
            let recipients = resolver.resolve(path)?;
            rage::encrypt(&recipients, input, output)?;
        }
    }

    Ok(())
}

/// Decrypt `input` with the user's identity.
pub fn smudge<R: Read, W: Write>(identity: &Identity, input: R, output: W) -> Result<()> {
    rage::decrypt(identity, input, output)?;
    Ok(())
}

/// Copy the file at `path` to `output` unchanged.
pub fn textconv<W: Write>(path: &Path, mut output: W) -> Result<()> {
    let mut file = File::open(path)?;
    io::copy(&mut file, &mut output)?;
    output.flush()?;
    Ok(())
}
