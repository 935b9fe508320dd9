//! Binary-compatibility settings.
//!
//! A [`Settings`] value identifies the configuration a consumer example is
//! built for: operating system, compiler, build type and architecture. The
//! optional `os_build` / `arch_build` axes describe the machine doing the
//! build; when absent the running host is assumed.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Resolved settings for one verification run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    /// Target operating system (Linux, Windows, Macos, ...)
    pub os: String,

    /// Compiler family (gcc, clang, apple-clang, Visual Studio, msvc, ...)
    pub compiler: String,

    /// Compiler version, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compiler_version: Option<String>,

    /// Build configuration (Release, Debug, RelWithDebInfo, MinSizeRel)
    pub build_type: String,

    /// Target architecture (x86_64, x86, armv8, ...)
    pub arch: String,

    /// Operating system of the build machine
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os_build: Option<String>,

    /// Architecture of the build machine
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arch_build: Option<String>,
}

/// Partial settings, as found in config files and on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsOverrides {
    pub os: Option<String>,
    pub compiler: Option<String>,
    pub compiler_version: Option<String>,
    pub build_type: Option<String>,
    pub arch: Option<String>,
    pub os_build: Option<String>,
    pub arch_build: Option<String>,
}

impl SettingsOverrides {
    /// Merge another set of overrides into this one (other takes precedence).
    pub fn merge(&mut self, other: SettingsOverrides) {
        fn take(slot: &mut Option<String>, value: Option<String>) {
            if value.is_some() {
                *slot = value;
            }
        }

        take(&mut self.os, other.os);
        take(&mut self.compiler, other.compiler);
        take(&mut self.compiler_version, other.compiler_version);
        take(&mut self.build_type, other.build_type);
        take(&mut self.arch, other.arch);
        take(&mut self.os_build, other.os_build);
        take(&mut self.arch_build, other.arch_build);
    }
}

impl Settings {
    /// Settings describing the running host with a Release build.
    pub fn detect() -> Self {
        Settings {
            os: host_os().to_string(),
            compiler: default_compiler(host_os()).to_string(),
            compiler_version: None,
            build_type: "Release".to_string(),
            arch: host_arch().to_string(),
            os_build: None,
            arch_build: None,
        }
    }

    /// Build a settings tuple from explicit axes.
    pub fn new(os: &str, compiler: &str, build_type: &str, arch: &str) -> Self {
        Settings {
            os: os.to_string(),
            compiler: compiler.to_string(),
            compiler_version: None,
            build_type: build_type.to_string(),
            arch: arch.to_string(),
            os_build: None,
            arch_build: None,
        }
    }

    /// Pin the build machine axes instead of detecting them.
    pub fn with_build_machine(mut self, os_build: &str, arch_build: &str) -> Self {
        self.os_build = Some(os_build.to_string());
        self.arch_build = Some(arch_build.to_string());
        self
    }

    /// Apply overrides on top of these settings.
    ///
    /// Overriding the target `os` without a `compiler` also switches the
    /// compiler to that platform's default.
    pub fn apply(mut self, overrides: &SettingsOverrides) -> Self {
        if let Some(os) = &overrides.os {
            if overrides.compiler.is_none() && normalize_os(os) != normalize_os(&self.os) {
                self.compiler = default_compiler(os).to_string();
            }
            self.os = os.clone();
        }
        if let Some(compiler) = &overrides.compiler {
            self.compiler = compiler.clone();
        }
        if overrides.compiler_version.is_some() {
            self.compiler_version = overrides.compiler_version.clone();
        }
        if let Some(build_type) = &overrides.build_type {
            self.build_type = build_type.clone();
        }
        if let Some(arch) = &overrides.arch {
            self.arch = arch.clone();
        }
        if overrides.os_build.is_some() {
            self.os_build = overrides.os_build.clone();
        }
        if overrides.arch_build.is_some() {
            self.arch_build = overrides.arch_build.clone();
        }
        self
    }

    /// Operating system of the build machine (normalized).
    pub fn build_os(&self) -> String {
        normalize_os(self.os_build.as_deref().unwrap_or(host_os()))
    }

    /// Architecture of the build machine (normalized).
    pub fn build_arch(&self) -> String {
        normalize_arch(self.arch_build.as_deref().unwrap_or(host_arch()))
    }

    /// Whether binaries produced with these settings cannot run on the build
    /// machine.
    pub fn is_cross_building(&self) -> bool {
        let os_differs = !self.os.is_empty() && normalize_os(&self.os) != self.build_os();
        let arch_differs = !self.arch.is_empty() && normalize_arch(&self.arch) != self.build_arch();
        os_differs || arch_differs
    }

    /// Whether the target is a Windows flavour.
    pub fn is_windows(&self) -> bool {
        normalize_os(&self.os) == "windows"
    }

    /// Whether the compiler is Microsoft's (multi-config Visual Studio builds).
    pub fn is_msvc(&self) -> bool {
        matches!(self.compiler.to_lowercase().as_str(), "visual studio" | "msvc")
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "os={} compiler={}", self.os, self.compiler)?;
        if let Some(version) = &self.compiler_version {
            write!(f, " compiler.version={}", version)?;
        }
        write!(f, " build_type={} arch={}", self.build_type, self.arch)
    }
}

/// Is cross building for the given settings?
pub fn is_cross_building(settings: &Settings) -> bool {
    settings.is_cross_building()
}

/// Settings-style name of the running operating system.
pub fn host_os() -> &'static str {
    match std::env::consts::OS {
        "linux" => "Linux",
        "windows" => "Windows",
        "macos" => "Macos",
        "freebsd" => "FreeBSD",
        "solaris" | "illumos" => "SunOS",
        "android" => "Android",
        "ios" => "iOS",
        other => other,
    }
}

/// Settings-style name of the running architecture.
pub fn host_arch() -> &'static str {
    match std::env::consts::ARCH {
        "x86_64" => "x86_64",
        "x86" => "x86",
        "aarch64" => "armv8",
        "arm" => "armv7",
        "powerpc64" => "ppc64",
        "s390x" => "s390x",
        other => other,
    }
}

fn default_compiler(os: &str) -> &'static str {
    match normalize_os(os).as_str() {
        "windows" => "Visual Studio",
        "macos" | "ios" => "apple-clang",
        "freebsd" => "clang",
        _ => "gcc",
    }
}

/// Normalize an operating system name for comparison.
pub fn normalize_os(os: &str) -> String {
    let lower = os.trim().to_lowercase();
    match lower.as_str() {
        "macos" | "macosx" | "darwin" | "osx" => "macos".to_string(),
        "windows" | "win32" | "win64" | "windowsstore" | "windowsce" => "windows".to_string(),
        "sunos" | "solaris" | "illumos" => "sunos".to_string(),
        _ => lower,
    }
}

/// Normalize an architecture name for comparison.
pub fn normalize_arch(arch: &str) -> String {
    let lower = arch.trim().to_lowercase();
    match lower.as_str() {
        "x86_64" | "amd64" | "x64" => "x86_64".to_string(),
        "x86" | "i386" | "i686" | "win32" => "x86".to_string(),
        "armv8" | "aarch64" | "arm64" => "armv8".to_string(),
        "armv7" | "arm" | "armv7l" => "armv7".to_string(),
        "ppc64" | "powerpc64" => "ppc64".to_string(),
        _ => lower,
    }
}
