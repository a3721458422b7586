use crate::error::Result;
use crate::git::GitRepo;

/// Install the filter and diff drivers in the current repository
pub fn init(verbose: bool) -> Result<()> {
    let repo = GitRepo::open(".")?;
    repo.install_filters(verbose)?;

    println!("Configured git-crypt-agessh filters");
    println!("\nNext steps:");
    println!("1. Put the recipients' public keys in a comment right above a pattern in .gitattributes");
    println!("   Example:");
    println!("     # ssh-ed25519 AAAA... alice, age1...");
    println!("     secrets/** filter=git-crypt-agessh diff=git-crypt-agessh");
    println!("2. Commit the .gitattributes file");

    Ok(())
}
