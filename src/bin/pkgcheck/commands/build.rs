//! `pkgcheck build` command

use std::path::Path;

use anyhow::Result;

use crate::cli::StepArgs;
use pkgcheck::ops::verify::build_example;
use pkgcheck::util::process::SystemRunner;

pub fn execute(args: StepArgs, config_path: Option<&Path>) -> Result<()> {
    let config = super::load(config_path)?;
    let options = super::resolve_options(&config, &args)?;

    let result = build_example(&options.build, &options.settings, &SystemRunner)?;
    tracing::debug!("Built with `{}`", result.build_command);

    println!("Built example in {}", options.build.build_dir.display());
    Ok(())
}
