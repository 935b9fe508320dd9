//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// pkgcheck - Build and run a consumer example against a packaged library
#[derive(Parser)]
#[command(name = "pkgcheck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Extra configuration file (overrides pkgcheck.toml)
    #[arg(long, global = true, env = "PKGCHECK_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full pipeline: imports, build, test
    Verify(VerifyArgs),

    /// Copy the dependency's shared libraries into the run directory
    Imports(StepArgs),

    /// Configure and build the example with CMake
    Build(StepArgs),

    /// Run the built example (skipped when cross building)
    Test(StepArgs),

    /// Show the resolved settings
    Settings(SettingsArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Settings axes.
#[derive(Args, Debug, Clone, Default)]
pub struct SettingsFlags {
    /// Target operating system (Linux, Windows, Macos, ...)
    #[arg(long)]
    pub os: Option<String>,

    /// Compiler (gcc, clang, apple-clang, Visual Studio, ...)
    #[arg(long)]
    pub compiler: Option<String>,

    /// Compiler version
    #[arg(long)]
    pub compiler_version: Option<String>,

    /// Build type (Release, Debug, ...)
    #[arg(long)]
    pub build_type: Option<String>,

    /// Target architecture (x86_64, armv8, ...)
    #[arg(long)]
    pub arch: Option<String>,

    /// Operating system of the build machine (defaults to the host)
    #[arg(long)]
    pub os_build: Option<String>,

    /// Architecture of the build machine (defaults to the host)
    #[arg(long)]
    pub arch_build: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct StepArgs {
    #[command(flatten)]
    pub settings: SettingsFlags,

    /// The dependency's package folder (containing bin/ and lib/)
    #[arg(long, env = "PKGCHECK_PACKAGE_FOLDER")]
    pub package_folder: Option<PathBuf>,

    /// Directory holding the example's CMakeLists.txt (defaults to the current directory)
    #[arg(long)]
    pub source_dir: Option<PathBuf>,

    /// Build directory (defaults to <source-dir>/build)
    #[arg(long)]
    pub build_dir: Option<PathBuf>,

    /// CMake generator
    #[arg(short = 'G', long)]
    pub generator: Option<String>,

    /// Extra CMake cache definition
    #[arg(short = 'D', value_name = "KEY=VALUE", value_parser = parse_definition)]
    pub define: Vec<(String, String)>,

    /// Only import artifacts for the target platform
    #[arg(long)]
    pub filter_host: bool,
}

#[derive(Args)]
pub struct VerifyArgs {
    #[command(flatten)]
    pub step: StepArgs,

    /// Output format (human, json, github)
    #[arg(long, default_value = "human")]
    pub output_format: String,
}

#[derive(Args)]
pub struct SettingsArgs {
    #[command(flatten)]
    pub settings: SettingsFlags,

    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: Shell,
}

fn parse_definition(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got `{}`", s)),
    }
}
