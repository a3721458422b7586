use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::attributes::{self, RULE_FILE};
use crate::error::Result;
use crate::path::PathComponents;
use crate::recipient::Recipient;

/// Collects the recipients of a path from the rule files of its ancestors.
pub struct RecipientResolver {
    root: PathBuf,
}

impl RecipientResolver {
    /// `root` is the repository working directory.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Walk from the repository root down to the file's own directory and
    /// gather every recipient whose rule matches `target`.
    ///
    /// Recipients come out root first, then in file order. Deeper rules add
    /// to shallower ones, nothing is overridden or deduplicated.
    pub fn resolve(&self, target: &PathComponents) -> Result<Vec<Recipient>> {
        let mut recipients = Vec::new();

        for domain in target.ancestors() {
            let rule_file = self.rule_file(domain);
            let bytes = match fs::read(&rule_file) {
                Ok(bytes) => bytes,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            // git does not require rule files to be UTF-8.
            let contents = String::from_utf8_lossy(&bytes);

            let found = attributes::scan(&contents, domain, target, &rule_file)?;
            log::debug!(
                "{}: {} recipient(s) for {}",
                rule_file.display(),
                found.len(),
                target
            );
            recipients.extend(found);
        }

        Ok(recipients)
    }

    fn rule_file(&self, domain: &[String]) -> PathBuf {
        let mut path = self.root.clone();
        path.extend(&domain[1..]);
        path.join(RULE_FILE)
    }
}
