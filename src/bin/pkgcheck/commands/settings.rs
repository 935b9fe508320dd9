//! `pkgcheck settings` command

use std::path::Path;

use anyhow::Result;

use crate::cli::SettingsArgs;

pub fn execute(args: SettingsArgs, config_path: Option<&Path>) -> Result<()> {
    let config = super::load(config_path)?;
    let settings = super::resolve_settings(&config, &args.settings);

    if args.json {
        let mut value = serde_json::to_value(&settings)?;
        value["cross_building"] = serde_json::Value::Bool(settings.is_cross_building());
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("os={}", settings.os);
    println!("compiler={}", settings.compiler);
    if let Some(version) = &settings.compiler_version {
        println!("compiler.version={}", version);
    }
    println!("build_type={}", settings.build_type);
    println!("arch={}", settings.arch);
    println!("os_build={}", settings.build_os());
    println!("arch_build={}", settings.build_arch());
    println!("cross_building={}", settings.is_cross_building());
    Ok(())
}
