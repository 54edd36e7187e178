pub mod applicator;
pub mod loader;
pub mod schema;

pub use applicator::{apply_script, resolve_script, ApplicationError};
pub use loader::{
    load_config_from_path, load_config_from_str, load_script_from_path, load_script_from_str,
    ConfigError,
};
pub use schema::{
    parse_path, EditScript, EditorConfig, ScriptEdit, ValidationError, ValidationIssue,
    MIN_PRETTY_WIDTH,
};
