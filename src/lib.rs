//! # git-crypt-agessh
//!
//! Transparent, path-scoped encryption of files in a git repository using
//! [age](https://age-encryption.org), with recipients declared right next to
//! the patterns they protect in `.gitattributes`.
//!
//! ## Quick Start
//!
//! ```bash
//! # Install the filter and diff drivers in the current repository
//! git-crypt-agessh init
//!
//! # Declare who may read what
//! cat >> .gitattributes << 'EOF'
//! # ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAA... alice, age1ql3z7hjy54pw3hyww5ayyfg7zqgvc7w3j2elw8zmrj2kg5sfn9aqmcac8p
//! secrets/** filter=git-crypt-agessh diff=git-crypt-agessh
//! EOF
//! git add .gitattributes secrets/
//! git commit -m "Add encrypted secrets"
//! ```
//!
//! The comment line directly above a pattern lists the recipients for the
//! files it matches. Rule files are consulted from the repository root down
//! to the file's own directory and their recipients add up; see
//! [`attributes`] and [`resolver`].
//!
//! ## How It Works
//!
//! 1. **Clean filter** (`git add`): resolves the recipients of the path and
//!    encrypts stdin to them. If the plaintext is identical to the version in
//!    the last commit, the committed ciphertext is emitted unchanged instead
//!    (see [`history`]), so untouched files never show up as modified.
//! 2. **Smudge filter** (`git checkout`): decrypts stdin with the user's SSH
//!    key, `~/.ssh/id_ed25519` by default (see [`settings`]).
//! 3. **Textconv** (`git diff`): prints the working copy file as is.
//!
//! ### Data Flow
//!
//! ```text
//! clean:  stdin → history comparison → recipient resolution → age encrypt → stdout
//! smudge: stdin → age decrypt → stdout
//! ```
//!
//! ## Module Overview
//!
//! - [`path`] - Repository-relative path splitting
//! - [`attributes`] - Rule file parsing and pattern matching
//! - [`resolver`] - Recipient resolution across directories
//! - [`history`] - Comparison with the last committed version
//! - [`filter`] - clean/smudge/textconv protocols
//! - [`rage`] - age encryption and decryption
//! - [`identity`] - Loading the user's decryption identity
//! - [`settings`] - Per-user configuration
//! - [`git`] - Repository access and driver installation
//! - [`error`] - Error types and unified error handling

pub mod attributes;
pub mod commands;
pub mod error;
pub mod filter;
pub mod git;
pub mod history;
pub mod identity;
pub mod path;
pub mod rage;
pub mod recipient;
pub mod resolver;
pub mod settings;

// Re-export commonly used types
pub use error::{GitCryptError, Result};
pub use git::GitRepo;
pub use identity::Identity;
pub use path::PathComponents;
pub use recipient::Recipient;
pub use resolver::RecipientResolver;
