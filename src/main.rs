use clap::{Parser, Subcommand};
use versionstamp::{
    cli::{
        self,
        commands::{SignatureCommands, VersionInfoCommands},
    },
    error::Result,
};

#[derive(Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Version info generation and bundle stamping
    VersionInfo {
        #[command(subcommand)]
        command: VersionInfoCommands,
    },
    /// Signature inspection commands
    Signature {
        #[command(subcommand)]
        command: SignatureCommands,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    versionstamp::init_logging()?;

    // Parse command line arguments
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::VersionInfo { command } => cli::handlers::handle_version_info_command(command),
        Commands::Signature { command } => cli::handlers::handle_signature_command(command),
    };

    // Format and display any errors
    if let Err(ref e) = result {
        eprintln!("{}", cli::format_error(e));
    }

    result
}
