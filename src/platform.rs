//! Platform detection and the platform-specific pieces of a hook registration.
use std::fmt;
use std::path::{Path, PathBuf};

/// Hook script deployed on Unix-family hosts.
pub const UNIX_SCRIPT: &str = "agentdeck-hook.sh";

/// Hook script deployed on Windows hosts.
pub const WINDOWS_SCRIPT: &str = "agentdeck-hook.ps1";

/// Operating system family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
    /// Linux, macOS and other Unix-like systems.
    Unix,
    /// Microsoft Windows.
    Windows,
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unix => write!(f, "unix"),
            Self::Windows => write!(f, "windows"),
        }
    }
}

/// Platform information for the current system.
///
/// Supplies script filenames, the command a host application runs to invoke
/// a deployed script, and the message-queue directory the script writes to.
#[derive(Debug, Clone)]
pub struct Platform {
    /// Operating system family.
    pub os: Os,
    temp_dir: PathBuf,
}

impl Platform {
    /// Detect the current platform.
    #[must_use]
    pub fn detect() -> Self {
        let os = if cfg!(target_os = "windows") {
            Os::Windows
        } else {
            Os::Unix
        };
        Self {
            os,
            temp_dir: std::env::temp_dir(),
        }
    }

    /// Create a platform with explicit values.
    #[must_use]
    pub fn new(os: Os, temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            os,
            temp_dir: temp_dir.into(),
        }
    }

    /// Returns `true` on Windows.
    #[must_use]
    pub fn is_windows(&self) -> bool {
        self.os == Os::Windows
    }

    /// Both candidate script filenames, regardless of the current platform.
    ///
    /// Removal and backup look at both so that a home directory shared
    /// between systems is handled.
    #[must_use]
    pub const fn script_candidates() -> [&'static str; 2] {
        [UNIX_SCRIPT, WINDOWS_SCRIPT]
    }

    /// Script filename deployed on this platform.
    #[must_use]
    pub const fn script_name(&self) -> &'static str {
        match self.os {
            Os::Unix => UNIX_SCRIPT,
            Os::Windows => WINDOWS_SCRIPT,
        }
    }

    /// Command string a host application runs to invoke `script`.
    #[must_use]
    pub fn hook_command(&self, script: &Path) -> String {
        match self.os {
            Os::Unix => format!("bash \"{}\"", script.display()),
            Os::Windows => format!(
                "powershell -NoProfile -ExecutionPolicy Bypass -File \"{}\"",
                script.display()
            ),
        }
    }

    /// Directory the hook script drops queued events into.
    #[must_use]
    pub fn queue_dir(&self) -> PathBuf {
        self.temp_dir.join("agentdeck-queue")
    }
}
