use crate::error::Result;
use crate::git::GitRepo;

/// Remove the filter and diff drivers from the current repository
pub fn de_init() -> Result<()> {
    let repo = GitRepo::open(".")?;
    repo.remove_filters()?;

    println!("Removed git-crypt-agessh filters");
    println!("\nFiles already checked out stay decrypted; committed files stay encrypted.");

    Ok(())
}
