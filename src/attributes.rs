//! # Rule Files
//!
//! Recipients are declared in ordinary `.gitattributes` files. The comment
//! line directly above a pattern carries the comma separated list of keys
//! allowed to read the files that pattern matches:
//!
//! ```text
//! # age1ql3z7hjy54pw3hyww5ayyfg7zqgvc7w3j2elw8zmrj2kg5sfn9aqmcac8p, ssh-ed25519 AAAA... bob
//! secrets/** filter=git-crypt-agessh diff=git-crypt-agessh
//! ```
//!
//! A pattern without such a comment never contributes recipients, and a
//! comment only ever applies to the first rule line below it. Blank lines
//! between the two are ignored. Nothing carries over from one rule file to
//! the next.

use std::path::Path;

use glob::{MatchOptions, Pattern};
use thiserror::Error;

use crate::error::{GitCryptError, Result};
use crate::path::PathComponents;
use crate::recipient::Recipient;

/// Name of the per-directory rule file.
pub const RULE_FILE: &str = ".gitattributes";

const COMMENT: char = '#';
const MACRO_PREFIX: &str = "[attr]";

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

#[derive(Error, Debug)]
pub enum PatternError {
    #[error("negative patterns are not allowed: {0}")]
    Negated(String),

    #[error("unfinished escape at the end of {0:?}")]
    TrailingEscape(String),

    #[error("invalid glob {pattern:?}: {source}")]
    Glob {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}

/// One pattern line of a rule file, bound to the directory owning the file.
#[derive(Debug, Clone)]
pub struct AttributeRule {
    pattern: String,
    domain: Vec<String>,
    glob: Pattern,
    basename_only: bool,
    directory_only: bool,
}

impl AttributeRule {
    /// Parse a rule line. Returns `None` for lines that define no pattern
    /// (blank lines and `[attr]` macro definitions). Attributes after the
    /// pattern are not interpreted.
    pub fn parse(
        line: &str,
        domain: &[String],
    ) -> std::result::Result<Option<Self>, PatternError> {
        let Some(pattern) = line.split_whitespace().next() else {
            return Ok(None);
        };
        if pattern.starts_with(MACRO_PREFIX) {
            return Ok(None);
        }
        if pattern.starts_with('!') {
            return Err(PatternError::Negated(pattern.to_string()));
        }

        let directory_only = pattern.ends_with('/');
        let trimmed = pattern.trim_end_matches('/');
        let basename_only = !trimmed.contains('/');
        let source = trimmed.trim_start_matches('/');
        let glob = Pattern::new(&to_glob(source)?).map_err(|source| PatternError::Glob {
            pattern: pattern.to_string(),
            source,
        })?;

        Ok(Some(Self {
            pattern: pattern.to_string(),
            domain: domain.to_vec(),
            glob,
            basename_only,
            directory_only,
        }))
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Test the rule against a full target path.
    ///
    /// Patterns without a `/` match the file name at any depth below the
    /// owning directory; all others are anchored to it.
    pub fn matches(&self, target: &PathComponents) -> bool {
        let path = target.as_slice();
        if self.directory_only || path.len() <= self.domain.len() {
            return false;
        }
        if path[..self.domain.len()] != self.domain[..] {
            return false;
        }

        let below = &path[self.domain.len()..];
        if self.basename_only {
            below
                .last()
                .is_some_and(|name| self.glob.matches_with(name, MATCH_OPTIONS))
        } else {
            self.glob.matches_with(&below.join("/"), MATCH_OPTIONS)
        }
    }
}

/// Scan one rule file and return the recipients of every annotated rule
/// matching `target`, in file order.
///
/// `domain` is the directory owning the file as a prefix of `target`;
/// `origin` is only used in error messages.
pub fn scan(
    contents: &str,
    domain: &[String],
    target: &PathComponents,
    origin: &Path,
) -> Result<Vec<Recipient>> {
    // The pending comment lives only inside this fold, so it is dropped at
    // the end of the file.
    let (_pending, recipients) = contents.lines().enumerate().try_fold(
        (None::<&str>, Vec::new()),
        |(pending, mut found), (index, line)| -> Result<_> {
            if line.starts_with(COMMENT) {
                return Ok((comment_body(line), found));
            }
            if line.trim().is_empty() {
                return Ok((pending, found));
            }
            let Some(comment) = pending else {
                return Ok((None, found));
            };

            let rule = AttributeRule::parse(line, domain).map_err(|source| {
                GitCryptError::MalformedPattern {
                    file: origin.to_path_buf(),
                    line: index + 1,
                    source,
                }
            })?;
            if let Some(rule) = rule.filter(|rule| rule.matches(target)) {
                log::debug!(
                    "{}:{}: {} matches {}",
                    origin.display(),
                    index + 1,
                    rule.pattern(),
                    target
                );
                found.extend(Recipient::parse_list(comment)?);
            }
            Ok((None, found))
        },
    )?;

    Ok(recipients)
}

/// Rewrite git's wildmatch escapes into `glob` syntax. `\x` matches `x`
/// literally and `[^...]` is the same negated class as `[!...]`.
fn to_glob(pattern: &str) -> std::result::Result<String, PatternError> {
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars().peekable();
    let mut in_class = false;

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                let escaped = chars
                    .next()
                    .ok_or_else(|| PatternError::TrailingEscape(pattern.to_string()))?;
                match escaped {
                    '*' | '?' | '[' | ']' if !in_class => {
                        out.push('[');
                        out.push(escaped);
                        out.push(']');
                    }
                    _ => out.push(escaped),
                }
            }
            '[' if !in_class => {
                in_class = true;
                out.push('[');
                if chars.next_if(|&c| c == '^' || c == '!').is_some() {
                    out.push('!');
                }
                // A `]` right after the opening bracket is a member.
                if chars.next_if_eq(&']').is_some() {
                    out.push(']');
                }
            }
            ']' if in_class => {
                in_class = false;
                out.push(']');
            }
            _ => out.push(c),
        }
    }

    Ok(out)
}

fn comment_body(line: &str) -> Option<&str> {
    let body = line[COMMENT.len_utf8()..].trim();
    (!body.is_empty()).then_some(body)
}
