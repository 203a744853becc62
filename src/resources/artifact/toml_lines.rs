//! Line-oriented view of a TOML configuration file.
//!
//! The file is validated as TOML but edited as plain lines, so comments,
//! spacing and key order survive untouched.
use std::path::Path;

use crate::error::ArtifactError;

/// The lines of a TOML artifact, split on `\n`.
///
/// Joining the lines back with `\n` reproduces the original text exactly,
/// including a trailing newline and any `\r` before it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLines {
    lines: Vec<String>,
}

impl ConfigLines {
    /// Split `text` read from `path` into lines after checking it parses as TOML.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError::Parse`] if `text` is not valid TOML.
    pub fn parse(path: &Path, text: &str) -> Result<Self, ArtifactError> {
        toml::from_str::<toml::Table>(text).map_err(|e| ArtifactError::Parse {
            path: path.to_path_buf(),
            message: e.to_string().trim_end().to_string(),
        })?;
        Ok(Self {
            lines: text.split('\n').map(String::from).collect(),
        })
    }

    /// Drop every line matching `owned`, returning how many were dropped.
    pub fn remove_where(&mut self, owned: impl Fn(&str) -> bool) -> usize {
        let before = self.lines.len();
        self.lines.retain(|line| !owned(line));
        before - self.lines.len()
    }

    /// Number of lines with non-whitespace content.
    #[must_use]
    pub fn non_blank_count(&self) -> usize {
        self.lines.iter().filter(|l| !l.trim().is_empty()).count()
    }

    /// Rejoin the lines.
    #[must_use]
    pub fn render(&self) -> String {
        self.lines.join("\n")
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn parse(text: &str) -> ConfigLines {
        ConfigLines::parse(Path::new("config.toml"), text).unwrap()
    }

    #[test]
    fn render_is_identity() {
        for text in ["", "a = 1", "a = 1\n", "a = 1\r\n\n# c\r\nb = 2\n"] {
            assert_eq!(parse(text).render(), text);
        }
    }

    #[test]
    fn invalid_toml_is_rejected() {
        let result = ConfigLines::parse(Path::new("config.toml"), "model = ");
        assert!(matches!(result, Err(ArtifactError::Parse { .. })));
    }

    #[test]
    fn remove_where_counts_and_keeps_order() {
        let mut lines = parse("a = 1\nnotify = [\"x\"]\nb = 2\n");
        let removed = lines.remove_where(|l| l.starts_with("notify"));
        assert_eq!(removed, 1);
        assert_eq!(lines.render(), "a = 1\nb = 2\n");
    }

    #[test]
    fn non_blank_count_ignores_whitespace_lines() {
        let lines = parse("a = 1\n\n   \n# note\n");
        assert_eq!(lines.non_blank_count(), 2);
    }
}
