//! Shell selection
//!
//! Maps the configured shell mode and host platform to a concrete shell
//! binary plus the preamble that forces UTF-8 output on Windows shells.

use serde::{Deserialize, Serialize};

/// Configured shell preference. `Auto` picks PowerShell on Windows and
/// `/bin/sh` everywhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ShellMode {
    #[default]
    Auto,
    Sh,
    Cmd,
    Powershell,
}

/// The concrete shell a command will run under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellKind {
    Posix,
    Cmd,
    Powershell,
}

impl ShellKind {
    /// Shell binary to invoke.
    pub fn program(&self) -> &'static str {
        match self {
            ShellKind::Posix => "/bin/sh",
            ShellKind::Cmd => "cmd.exe",
            ShellKind::Powershell => "powershell.exe",
        }
    }

    /// Flag that makes the shell run the following argument as a script.
    pub fn script_flag(&self) -> &'static str {
        match self {
            ShellKind::Posix => "-c",
            ShellKind::Cmd => "/C",
            ShellKind::Powershell => "-Command",
        }
    }

    /// Wrap a command with the shell-specific UTF-8 preamble.
    ///
    /// POSIX shells pass the command through unmodified; cmd.exe switches the
    /// code page, PowerShell sets the console output encoding.
    pub fn wrap(&self, command: &str) -> String {
        match self {
            ShellKind::Posix => command.to_string(),
            ShellKind::Cmd => format!("chcp 65001 >nul && {}", command),
            ShellKind::Powershell => format!(
                "[Console]::OutputEncoding = [System.Text.Encoding]::UTF8; {}",
                command
            ),
        }
    }
}

/// Select the shell for a given mode and host platform. Total function, no
/// error conditions.
pub fn select_shell(mode: ShellMode, host_is_windows: bool) -> ShellKind {
    match mode {
        ShellMode::Sh => ShellKind::Posix,
        ShellMode::Cmd => ShellKind::Cmd,
        ShellMode::Powershell => ShellKind::Powershell,
        ShellMode::Auto => {
            if host_is_windows {
                ShellKind::Powershell
            } else {
                ShellKind::Posix
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_is_powershell_on_windows() {
        assert_eq!(select_shell(ShellMode::Auto, true), ShellKind::Powershell);
    }

    #[test]
    fn auto_is_posix_elsewhere() {
        assert_eq!(select_shell(ShellMode::Auto, false), ShellKind::Posix);
    }

    #[test]
    fn explicit_modes_ignore_platform() {
        assert_eq!(select_shell(ShellMode::Cmd, false), ShellKind::Cmd);
        assert_eq!(select_shell(ShellMode::Sh, true), ShellKind::Posix);
        assert_eq!(select_shell(ShellMode::Powershell, false), ShellKind::Powershell);
    }

    #[test]
    fn posix_wrap_is_identity() {
        assert_eq!(ShellKind::Posix.wrap("ls -la"), "ls -la");
    }

    #[test]
    fn cmd_wrap_forces_utf8_code_page() {
        assert_eq!(ShellKind::Cmd.wrap("dir"), "chcp 65001 >nul && dir");
    }

    #[test]
    fn powershell_wrap_sets_output_encoding() {
        let wrapped = ShellKind::Powershell.wrap("Get-ChildItem");
        assert!(wrapped.starts_with("[Console]::OutputEncoding"));
        assert!(wrapped.ends_with("Get-ChildItem"));
    }
}
