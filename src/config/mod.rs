/*!
 * Configuration Loader
 *
 * Turns external input into a validated allocation state and back:
 * - Textual line format (human-editable)
 * - Structured JSON documents
 * - Process settings from the environment
 */

mod defaults;
mod document;
mod loader;
mod settings;
mod text;

pub use defaults::{classic_document, classic_state};
pub use document::ConfigDocument;
pub use loader::{load_file, parse, ConfigFormat};
pub use settings::Settings;
pub use text::{parse_text, to_text};
