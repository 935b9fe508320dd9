//! `pkgcheck verify` command

use std::path::Path;

use anyhow::{Context, Result};

use crate::cli::VerifyArgs;
use pkgcheck::ops::verify::{format_result_for_output, verify, OutputFormat};
use pkgcheck::util::process::SystemRunner;

pub fn execute(args: VerifyArgs, config_path: Option<&Path>, verbose: bool) -> Result<()> {
    let output_format: OutputFormat = args
        .output_format
        .parse()
        .with_context(|| format!("invalid output format: {}", args.output_format))?;

    super::require_package_folder(&args.step)?;
    let config = super::load(config_path)?;
    let options = super::resolve_options(&config, &args.step)?;

    let result = verify(options, &SystemRunner);

    print!("{}", format_result_for_output(&result, output_format, verbose));

    // Exit with error code if verification failed
    if !result.passed {
        std::process::exit(1);
    }

    Ok(())
}
