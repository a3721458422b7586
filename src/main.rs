use clap::{Parser, Subcommand};
use git_crypt_agessh::commands;
use git_crypt_agessh::error::Result;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "git-crypt-agessh")]
#[command(version)]
#[command(about = "Transparent age encryption of files in git, keyed by SSH recipients in .gitattributes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Install git-crypt-agessh configuration in the current repository
    Init {
        /// Install filters with verbose flags
        #[arg(short, long)]
        verbose: bool,
    },

    /// Remove git-crypt-agessh configuration from the current repository
    DeInit,

    /// Smudge (decrypt) files
    #[command(hide = true)]
    Smudge {
        /// Path being smudged, the content is read from stdin
        path: PathBuf,

        /// Output additional info to stderr
        #[arg(short, long)]
        verbose: bool,
    },

    /// Clean (encrypt) files
    #[command(hide = true)]
    Clean {
        /// Path being cleaned, the content is read from stdin
        path: PathBuf,

        /// Output additional info to stderr
        #[arg(short, long)]
        verbose: bool,
    },

    /// Convert (decrypt) encrypted files into a readable format
    #[command(hide = true)]
    Textconv {
        /// Path to convert
        path: PathBuf,
    },
}

impl Commands {
    fn verbose(&self) -> bool {
        match self {
            Commands::Smudge { verbose, .. } | Commands::Clean { verbose, .. } => *verbose,
            _ => false,
        }
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("git-crypt-agessh: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.command.verbose() { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();

    match cli.command {
        Commands::Init { verbose } => commands::init(verbose),
        Commands::DeInit => commands::de_init(),
        Commands::Smudge { path, .. } => commands::smudge(&path),
        Commands::Clean { path, .. } => commands::clean(&path),
        Commands::Textconv { path } => commands::textconv(&path),
    }
}
