//! Command classification
//!
//! Incoming command text is matched against an ordered chain of pattern
//! matchers. Order is part of the contract: a volume switch is recognized
//! before `cd`, and `cd` before anything else falls through to an ordinary
//! command.

/// Tagged classification of one command string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandKind {
    /// A bare drive letter followed by a colon, e.g. `D:`.
    VolumeSwitch { drive: char },
    /// A `cd <target>` form; `target` has surrounding quotes stripped.
    ChangeDir { target: String },
    /// Anything else, handed to the execution shell verbatim.
    Ordinary,
}

type Matcher = fn(&str) -> Option<CommandKind>;

/// Ordered matcher chain. First match wins.
const MATCHERS: &[Matcher] = &[match_volume_switch, match_change_dir];

/// Classify one command string. Never fails; unmatched input is `Ordinary`.
pub fn classify(command: &str) -> CommandKind {
    let trimmed = command.trim();
    for matcher in MATCHERS {
        if let Some(kind) = matcher(trimmed) {
            return kind;
        }
    }
    CommandKind::Ordinary
}

/// Exactly one ASCII letter followed by `:`, nothing else.
fn match_volume_switch(command: &str) -> Option<CommandKind> {
    let mut chars = command.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some(letter), Some(':'), None) if letter.is_ascii_alphabetic() => {
            Some(CommandKind::VolumeSwitch {
                drive: letter.to_ascii_uppercase(),
            })
        }
        _ => None,
    }
}

/// `cd <target>` (case-insensitive) with a non-empty target.
fn match_change_dir(command: &str) -> Option<CommandKind> {
    let rest = command
        .strip_prefix("cd")
        .or_else(|| command.strip_prefix("CD"))
        .or_else(|| command.strip_prefix("Cd"))
        .or_else(|| command.strip_prefix("cD"))?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let target = strip_quotes(rest.trim());
    if target.is_empty() {
        return None;
    }
    Some(CommandKind::ChangeDir {
        target: target.to_string(),
    })
}

/// Strip a single matching pair of leading/trailing quote characters.
/// Nested or unmatched quotes are left alone.
fn strip_quotes(target: &str) -> &str {
    let bytes = target.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'"' || first == b'\'') {
            return &target[1..target.len() - 1];
        }
    }
    target
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drive_letter_is_volume_switch() {
        assert_eq!(classify("D:"), CommandKind::VolumeSwitch { drive: 'D' });
        assert_eq!(classify("c:"), CommandKind::VolumeSwitch { drive: 'C' });
    }

    #[test]
    fn volume_switch_never_falls_through() {
        for drive in ["A:", "z:", "Q:"] {
            assert!(matches!(classify(drive), CommandKind::VolumeSwitch { .. }));
        }
    }

    #[test]
    fn drive_with_trailing_path_is_not_volume_switch() {
        assert_eq!(classify("D:\\tmp"), CommandKind::Ordinary);
        assert_eq!(classify("dd:"), CommandKind::Ordinary);
    }

    #[test]
    fn cd_with_target_is_change_dir() {
        assert_eq!(
            classify("cd /tmp"),
            CommandKind::ChangeDir {
                target: "/tmp".to_string()
            }
        );
    }

    #[test]
    fn cd_is_case_insensitive() {
        assert_eq!(
            classify("CD ..\\projects"),
            CommandKind::ChangeDir {
                target: "..\\projects".to_string()
            }
        );
    }

    #[test]
    fn cd_strips_one_quote_pair() {
        assert_eq!(
            classify("cd \"My Files\""),
            CommandKind::ChangeDir {
                target: "My Files".to_string()
            }
        );
        assert_eq!(
            classify("cd 'a b'"),
            CommandKind::ChangeDir {
                target: "a b".to_string()
            }
        );
    }

    #[test]
    fn cd_does_not_strip_nested_quotes() {
        assert_eq!(
            classify("cd \"\"x\"\""),
            CommandKind::ChangeDir {
                target: "\"x\"".to_string()
            }
        );
    }

    #[test]
    fn bare_cd_is_ordinary() {
        assert_eq!(classify("cd"), CommandKind::Ordinary);
        assert_eq!(classify("cdx /tmp"), CommandKind::Ordinary);
    }

    #[test]
    fn anything_else_is_ordinary() {
        assert_eq!(classify("ls -la"), CommandKind::Ordinary);
        assert_eq!(classify("echo cd /tmp"), CommandKind::Ordinary);
    }
}
