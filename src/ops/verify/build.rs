//! CMake configure and build of the consumer example.

use std::path::{Path, PathBuf};

use super::types::{BuildOptions, BuildResult};
use crate::core::settings::{normalize_arch, Settings};
use crate::util::errors::VerifyError;
use crate::util::process::{combined_output, find_cmake, CommandRunner, ProcessBuilder};

/// CMake driver for the example project.
pub struct CMakeExample<'a> {
    settings: &'a Settings,
    options: &'a BuildOptions,
    cmake: PathBuf,
}

impl<'a> CMakeExample<'a> {
    pub fn new(settings: &'a Settings, options: &'a BuildOptions) -> Self {
        let cmake = options
            .cmake
            .clone()
            .or_else(find_cmake)
            .unwrap_or_else(|| PathBuf::from("cmake"));

        CMakeExample {
            settings,
            options,
            cmake,
        }
    }

    /// Generator to request, if the platform needs a specific one.
    pub fn generator(&self) -> Option<String> {
        if let Some(generator) = &self.options.generator {
            return Some(generator.clone());
        }

        let compiler = self.settings.compiler.to_lowercase();
        if self.settings.is_windows() && matches!(compiler.as_str(), "gcc" | "clang") {
            return Some("MinGW Makefiles".to_string());
        }

        None
    }

    /// Whether the generator builds several configurations from one tree.
    pub fn is_multi_config(&self) -> bool {
        match self.generator() {
            Some(generator) => {
                generator.starts_with("Visual Studio")
                    || generator == "Xcode"
                    || generator == "Ninja Multi-Config"
            }
            None => self.settings.is_msvc(),
        }
    }

    /// `-A` platform argument for Visual Studio generators.
    ///
    /// Other generators (Ninja, NMake) reject a platform specification.
    fn vs_platform(&self) -> Option<&'static str> {
        if !self.settings.is_msvc() {
            return None;
        }
        if let Some(generator) = self.generator() {
            if !generator.starts_with("Visual Studio") {
                return None;
            }
        }
        match normalize_arch(&self.settings.arch).as_str() {
            "x86_64" => Some("x64"),
            "x86" => Some("Win32"),
            "armv8" => Some("ARM64"),
            "armv7" => Some("ARM"),
            _ => None,
        }
    }

    /// Cache definitions bound to the settings.
    pub fn definitions(&self) -> Vec<(String, String)> {
        let build_dir = cmake_path(&self.options.build_dir);
        let mut defs = vec![
            ("CONAN_EXPORTED".to_string(), "1".to_string()),
            ("CONAN_IN_LOCAL_CACHE".to_string(), "OFF".to_string()),
            ("CONAN_COMPILER".to_string(), self.settings.compiler.clone()),
        ];

        if let Some(version) = &self.settings.compiler_version {
            defs.push(("CONAN_COMPILER_VERSION".to_string(), version.clone()));
        }

        if !self.is_multi_config() {
            defs.push((
                "CMAKE_BUILD_TYPE".to_string(),
                self.settings.build_type.clone(),
            ));
        }

        defs.push((
            "CMAKE_EXPORT_NO_PACKAGE_REGISTRY".to_string(),
            "ON".to_string(),
        ));
        // Package config files generated for the dependency live in the build dir.
        defs.push(("CMAKE_PREFIX_PATH".to_string(), build_dir.clone()));
        defs.push(("CMAKE_MODULE_PATH".to_string(), build_dir));

        defs.extend(self.options.definitions.iter().cloned());
        defs
    }

    /// The configure command.
    pub fn configure_command(&self) -> ProcessBuilder {
        let mut cmd = ProcessBuilder::new(&self.cmake)
            .cwd(&self.options.build_dir)
            .arg("-S")
            .arg(&self.options.source_dir)
            .arg("-B")
            .arg(&self.options.build_dir);

        if let Some(generator) = self.generator() {
            cmd = cmd.arg("-G").arg(generator);
        }

        if let Some(platform) = self.vs_platform() {
            cmd = cmd.arg("-A").arg(platform);
        }

        for (key, value) in self.definitions() {
            cmd = cmd.arg(format!("-D{}={}", key, value));
        }

        cmd
    }

    /// The build command.
    pub fn build_command(&self) -> ProcessBuilder {
        let mut cmd = ProcessBuilder::new(&self.cmake)
            .cwd(&self.options.build_dir)
            .arg("--build")
            .arg(&self.options.build_dir);

        if self.is_multi_config() {
            cmd = cmd.arg("--config").arg(&self.settings.build_type);
        }

        cmd
    }

    /// Configure, then build. The first failing step ends the build.
    pub fn build(&self, runner: &dyn CommandRunner) -> Result<BuildResult, VerifyError> {
        std::fs::create_dir_all(&self.options.build_dir)
            .map_err(|e| VerifyError::filesystem(&self.options.build_dir, e))?;

        let configure = self.configure_command();
        tracing::info!("Configuring example ({})", self.settings);
        run_checked(runner, &configure)?;

        let build = self.build_command();
        tracing::info!("Building example");
        run_checked(runner, &build)?;

        Ok(BuildResult {
            configure_command: configure.display_command(),
            build_command: build.display_command(),
        })
    }
}

/// Path in the form CMake expects inside `-D` values, with `/` separators.
fn cmake_path(path: &Path) -> String {
    path.display().to_string().replace('\\', "/")
}

fn run_checked(runner: &dyn CommandRunner, cmd: &ProcessBuilder) -> Result<(), VerifyError> {
    let command = cmd.display_command();
    tracing::debug!("Running `{}`", command);

    let output = runner.run(cmd).map_err(|e| VerifyError::Build {
        command: command.clone(),
        code: None,
        output: format!("{:#}", e),
    })?;

    if !output.status.success() {
        return Err(VerifyError::Build {
            command,
            code: output.status.code(),
            output: combined_output(&output),
        });
    }

    Ok(())
}

/// Build the example for the given settings.
pub fn build_example(
    options: &BuildOptions,
    settings: &Settings,
    runner: &dyn CommandRunner,
) -> Result<BuildResult, VerifyError> {
    CMakeExample::new(settings, options).build(runner)
}
