//! CLI binary entry point for passport-cli

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use memory_passport::cli::commands::compose::{
    ComposeArgs, handle_compose, handle_sample_config,
};
#[cfg(feature = "cli")]
use memory_passport::cli::error::CliError;
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "passport-cli")]
#[command(about = "Compose memory passports as PDF documents")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Compose a passport PDF from a JSON or YAML input file
    Compose {
        /// Input file (.json, .yaml) or '-' for stdin
        input: String,
        /// Output file or directory (default: current directory, derived filename)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Directory containing .passport.toml (default: current directory)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Overwrite existing files without prompting
        #[arg(short, long)]
        force: bool,
        /// Footer branding text
        #[arg(long)]
        brand_text: Option<String>,
        /// Brand color in hex format, e.g., "#5B3FD9"
        #[arg(long)]
        brand_color: Option<String>,
        /// Skip loading the avatar image
        #[arg(long)]
        no_avatar: bool,
    },
    /// Print or write a commented sample .passport.toml
    SampleConfig {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Overwrite existing files without prompting
        #[arg(short, long)]
        force: bool,
    },
}

#[cfg(feature = "cli")]
fn run_compose(args: ComposeArgs) -> Result<(), CliError> {
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::IoError(format!("Failed to start runtime: {}", e)))?;
    runtime.block_on(handle_compose(&args)).map(|_| ())
}

#[cfg(feature = "cli")]
fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Compose {
            input,
            output,
            config,
            force,
            brand_text,
            brand_color,
            no_avatar,
        } => run_compose(ComposeArgs {
            input,
            output,
            config_dir: config,
            force,
            brand_text,
            brand_color,
            no_avatar,
        }),
        Commands::SampleConfig { output, force } => handle_sample_config(output.as_deref(), force),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature is not enabled. Build with --features cli");
    std::process::exit(1);
}
