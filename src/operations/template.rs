//! Source content collaborators: plain reads and handlebars rendering.
use anyhow::{Context as _, Result};
use handlebars::Handlebars;
use std::fmt;
use std::path::Path;

use super::{ContentReader, ContentRenderer};

/// Reads source files from the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsContentReader;

impl ContentReader for FsContentReader {
    fn read(&self, source: &Path) -> Result<Vec<u8>> {
        std::fs::read(source)
            .with_context(|| format!("could not locate file in lookup: {}", source.display()))
    }
}

/// Renders template source files with [`Handlebars`].
///
/// Strict mode is on, so a reference to an undefined variable fails the
/// render instead of producing an empty string.  Output is not HTML-escaped.
pub struct HandlebarsRenderer {
    registry: Handlebars<'static>,
}

impl HandlebarsRenderer {
    /// Create a renderer with strict mode enabled and escaping disabled.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry.register_escape_fn(handlebars::no_escape);
        Self { registry }
    }
}

impl Default for HandlebarsRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HandlebarsRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlebarsRenderer")
            .field("strict_mode", &self.registry.strict_mode())
            .finish()
    }
}

impl ContentRenderer for HandlebarsRenderer {
    fn render(&self, source: &Path, vars: &serde_json::Value) -> Result<String> {
        let template = std::fs::read_to_string(source)
            .with_context(|| format!("could not locate file in lookup: {}", source.display()))?;
        self.registry
            .render_template(&template, vars)
            .with_context(|| format!("render {}", source.display()))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reader_returns_raw_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("blob");
        std::fs::write(&file, [0u8, 1, 2, 255]).unwrap();
        assert_eq!(FsContentReader.read(&file).unwrap(), vec![0u8, 1, 2, 255]);
    }

    #[test]
    fn reader_missing_file_message() {
        let dir = tempfile::tempdir().unwrap();
        let err = FsContentReader.read(&dir.path().join("nope")).unwrap_err();
        assert!(
            err.to_string().starts_with("could not locate file in lookup:"),
            "unexpected message: {err}"
        );
    }

    #[test]
    fn renders_variables_without_escaping() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("config.yml.j2");
        std::fs::write(&file, "url: {{url}}\nport: {{port}}\n").unwrap();

        let out = HandlebarsRenderer::new()
            .render(&file, &json!({"url": "http://a/?x=1&y=2", "port": 8080}))
            .unwrap();
        assert_eq!(out, "url: http://a/?x=1&y=2\nport: 8080\n");
    }

    #[test]
    fn undefined_variable_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("t.j2");
        std::fs::write(&file, "{{missing}}").unwrap();
        assert!(HandlebarsRenderer::new().render(&file, &json!({})).is_err());
    }

    #[test]
    fn debug_shows_strict_mode() {
        assert_eq!(
            format!("{:?}", HandlebarsRenderer::default()),
            "HandlebarsRenderer { strict_mode: true }"
        );
    }
}
