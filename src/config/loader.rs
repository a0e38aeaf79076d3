/*!
 * Configuration Loading
 * Format detection and file loading
 */

use super::document::ConfigDocument;
use super::text::parse_text;
use crate::core::errors::ConfigError;
use crate::state::MatrixState;
use std::path::Path;
use tracing::info;

/// Encoding of a configuration source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// Line-oriented textual format
    Text,
    /// [`ConfigDocument`] as JSON
    Json,
}

impl ConfigFormat {
    /// `.json` files are documents, everything else is text
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ConfigFormat::Json,
            _ => ConfigFormat::Text,
        }
    }
}

/// Parse `input` in the given format into a validated state
pub fn parse(input: &str, format: ConfigFormat) -> Result<MatrixState, ConfigError> {
    match format {
        ConfigFormat::Text => parse_text(input),
        ConfigFormat::Json => ConfigDocument::from_json(input)?.to_state(),
    }
}

/// Read and validate a configuration file
pub fn load_file(path: impl AsRef<Path>) -> Result<MatrixState, ConfigError> {
    let path = path.as_ref();
    let format = ConfigFormat::from_path(path);
    let input = std::fs::read_to_string(path)?;
    let state = parse(&input, format)?;

    info!(
        path = %path.display(),
        format = ?format,
        processes = state.process_count(),
        resources = state.resource_count(),
        "configuration loaded"
    );
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(ConfigFormat::from_path(Path::new("state.json")), ConfigFormat::Json);
        assert_eq!(ConfigFormat::from_path(Path::new("STATE.JSON")), ConfigFormat::Json);
        assert_eq!(ConfigFormat::from_path(Path::new("state.txt")), ConfigFormat::Text);
        assert_eq!(ConfigFormat::from_path(Path::new("state")), ConfigFormat::Text);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        assert!(matches!(
            load_file("/nonexistent/banker/state.txt"),
            Err(ConfigError::Io(_))
        ));
    }
}
