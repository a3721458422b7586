use std::io;
use std::path::Path;

use crate::error::Result;
use crate::filter;
use crate::git::GitRepo;
use crate::identity::Identity;
use crate::resolver::RecipientResolver;
use crate::settings::Settings;

/// Clean filter implementation (called by git during add/commit)
///
/// `path` only names the file for rule and history lookup; the content comes
/// from stdin.
pub fn clean(path: &Path) -> Result<()> {
    let repo = GitRepo::open(".")?;
    let target = repo.components(path)?;
    let resolver = RecipientResolver::new(repo.workdir()?);
    log::debug!("cleaning {target}");

    filter::clean(
        &repo,
        &resolver,
        &target,
        load_identity,
        io::stdin().lock(),
        io::stdout().lock(),
    )
}

/// Smudge filter implementation (called by git during checkout)
pub fn smudge(path: &Path) -> Result<()> {
    log::info!("smudging {}", path.display());

    let identity = load_identity()?;
    filter::smudge(&identity, io::stdin().lock(), io::stdout().lock())
}

/// Diff textconv implementation (called by git during diff/show)
pub fn textconv(path: &Path) -> Result<()> {
    filter::textconv(path, io::stdout().lock())
}

fn load_identity() -> Result<Identity> {
    let settings = Settings::load()?;
    Identity::load(&settings)
}
