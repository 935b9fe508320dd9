//! `pkgcheck imports` command

use std::path::Path;

use anyhow::Result;

use crate::cli::StepArgs;
use pkgcheck::ops::verify::import_artifacts;

pub fn execute(args: StepArgs, config_path: Option<&Path>) -> Result<()> {
    super::require_package_folder(&args)?;
    let config = super::load(config_path)?;
    let options = super::resolve_options(&config, &args)?;

    let report = import_artifacts(&options.imports, &options.settings)?;

    for path in &report.copied {
        println!("{}", path.display());
    }
    Ok(())
}
