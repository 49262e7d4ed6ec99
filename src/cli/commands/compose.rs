//! Compose command handlers

use crate::cli::error::CliError;
use crate::config::{PassportConfig, sample_config};
use crate::models::PassportInput;
use crate::passport::{PassportArtifact, PassportComposer};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::info;

/// Arguments for the compose command
#[derive(Debug, Clone, Default)]
pub struct ComposeArgs {
    /// Passport input file (.json, .yaml) or '-' for stdin
    pub input: String,
    /// Output file or directory; defaults to the current directory
    pub output: Option<PathBuf>,
    /// Directory holding `.passport.toml`
    pub config_dir: Option<PathBuf>,
    pub force: bool,
    pub brand_text: Option<String>,
    pub brand_color: Option<String>,
    pub no_avatar: bool,
}

/// Load input content from file or stdin
fn load_input(input: &str) -> Result<String, CliError> {
    if input == "-" {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .map_err(|e| CliError::InvalidArgument(format!("Failed to read stdin: {}", e)))?;
        Ok(content)
    } else {
        let path = PathBuf::from(input);
        if !path.exists() {
            return Err(CliError::FileNotFound(path));
        }
        std::fs::read_to_string(&path).map_err(|e| CliError::FileReadError(path, e.to_string()))
    }
}

/// Parse passport input as JSON or YAML
///
/// YAML is chosen by a `.yaml`/`.yml` extension; stdin and other files are
/// sniffed by their first non-blank character.
pub fn parse_passport_input(input: &str, content: &str) -> Result<PassportInput, CliError> {
    let lower = input.to_lowercase();
    let is_yaml = lower.ends_with(".yaml")
        || lower.ends_with(".yml")
        || (input == "-" && !content.trim_start().starts_with('{'));

    let parsed = if is_yaml {
        PassportInput::from_yaml(content)
    } else {
        PassportInput::from_json(content)
    };
    parsed.map_err(|e| CliError::InputParseError(e.to_string()))
}

/// Configuration from `.passport.toml`, environment, then command-line flags
pub fn resolve_config(args: &ComposeArgs) -> Result<PassportConfig, CliError> {
    let dir = match &args.config_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()?,
    };
    let mut config = PassportConfig::load(&dir)?;

    if let Some(text) = &args.brand_text {
        config.branding.brand_text = text.clone();
    }
    if let Some(color) = &args.brand_color {
        config.branding.brand_color = color.clone();
    }
    if args.no_avatar {
        config.avatar.enabled = false;
    }

    config.validate()?;
    Ok(config)
}

/// Check if file exists and handle overwrite
pub fn check_file_overwrite(output_path: &Path, force: bool) -> Result<(), CliError> {
    if output_path.exists() && !force {
        return Err(CliError::InvalidArgument(format!(
            "Output file exists: {}. Use --force to overwrite.",
            output_path.display()
        )));
    }
    Ok(())
}

/// Where the artifact lands for a given `--output`
pub fn output_path(
    output: Option<&Path>,
    artifact: &PassportArtifact,
) -> Result<PathBuf, CliError> {
    match output {
        Some(path) if path.is_dir() => Ok(path.join(&artifact.filename)),
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(std::env::current_dir()?.join(&artifact.filename)),
    }
}

fn write_output(path: &Path, bytes: &[u8]) -> Result<(), CliError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| {
            CliError::FileWriteError(
                path.to_path_buf(),
                format!("Failed to create directory: {}", e),
            )
        })?;
    }

    std::fs::write(path, bytes)
        .map_err(|e| CliError::FileWriteError(path.to_path_buf(), e.to_string()))
}

/// Handle the compose command, returning the written path
pub async fn handle_compose(args: &ComposeArgs) -> Result<PathBuf, CliError> {
    let content = load_input(&args.input)?;
    let input = parse_passport_input(&args.input, &content)?;
    let config = resolve_config(args)?;

    let artifact = PassportComposer::with_config(config).compose(&input).await?;

    let path = output_path(args.output.as_deref(), &artifact)?;
    check_file_overwrite(&path, args.force)?;
    write_output(&path, &artifact.bytes)?;

    info!("Wrote {}", path.display());
    println!(
        "Composed {} ({} pages) -> {}",
        artifact.title,
        artifact.page_count,
        path.display()
    );
    Ok(path)
}

/// Handle the sample-config command
///
/// Prints the commented sample when no output is given.
pub fn handle_sample_config(output: Option<&Path>, force: bool) -> Result<(), CliError> {
    match output {
        Some(path) => {
            check_file_overwrite(path, force)?;
            write_output(path, sample_config().as_bytes())?;
            println!("Wrote sample configuration to {}", path.display());
        }
        None => print!("{}", sample_config()),
    }
    Ok(())
}
