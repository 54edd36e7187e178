use crate::ast::Pos;
use serde::Deserialize;
use std::fmt;

pub const MIN_PRETTY_WIDTH: usize = 10;

/// Session settings.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct EditorConfig {
    /// Target line width for reprinted nodes.
    pub pretty_width: usize,
    /// Undo levels kept (0 = unlimited).
    pub history_limit: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            pretty_width: 80,
            history_limit: 100,
        }
    }
}

impl EditorConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();
        if self.pretty_width < MIN_PRETTY_WIDTH {
            issues.push(ValidationIssue::InvalidValue {
                field: "pretty_width",
                message: format!(
                    "must be at least {MIN_PRETTY_WIDTH}, got {}",
                    self.pretty_width
                ),
            });
        }
        ValidationError::from_issues(issues)
    }
}

/// A batch of structural edits applied as one transaction.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct EditScript {
    #[serde(default)]
    pub edits: Vec<ScriptEdit>,
}

/// One edit in a script. Nodes are addressed by dotted child-index paths
/// (`"0.2.1"`: third child of the first root, then its second child).
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ScriptEdit {
    Insert {
        /// Omitted for a root-level insertion.
        #[serde(default)]
        parent: Option<String>,
        #[serde(default)]
        field: Option<String>,
        index: usize,
        text: String,
    },
    Delete {
        target: String,
    },
    Replace {
        target: String,
        text: String,
    },
    Overwrite {
        from: Pos,
        to: Pos,
        #[serde(default)]
        text: String,
    },
    Drop {
        source: String,
        #[serde(default)]
        parent: Option<String>,
        #[serde(default)]
        field: Option<String>,
        index: usize,
    },
}

/// Parse a dotted node path such as `"0.2.1"`.
pub fn parse_path(path: &str) -> Option<Vec<usize>> {
    if path.trim().is_empty() {
        return None;
    }
    path.split('.').map(|part| part.trim().parse().ok()).collect()
}

impl EditScript {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.edits.is_empty() {
            issues.push(ValidationIssue::EmptyScript);
        }

        for (idx, edit) in self.edits.iter().enumerate() {
            let mut check_path = |path: &str| {
                if parse_path(path).is_none() {
                    issues.push(ValidationIssue::InvalidPath {
                        edit: idx,
                        path: path.to_string(),
                    });
                }
            };

            match edit {
                ScriptEdit::Insert {
                    parent,
                    field,
                    text,
                    ..
                } => {
                    if let Some(parent) = parent {
                        check_path(parent);
                    }
                    if text.trim().is_empty() {
                        issues.push(ValidationIssue::MissingField { edit: idx, field: "text" });
                    }
                    if parent.is_some() && field.is_none() {
                        issues.push(ValidationIssue::MissingField { edit: idx, field: "field" });
                    }
                }
                ScriptEdit::Delete { target } | ScriptEdit::Replace { target, .. } => {
                    check_path(target);
                }
                ScriptEdit::Overwrite { from, to, .. } => {
                    if from > to {
                        issues.push(ValidationIssue::InvalidCombo {
                            edit: idx,
                            message: format!("`from` {from} is after `to` {to}"),
                        });
                    }
                }
                ScriptEdit::Drop {
                    source,
                    parent,
                    field,
                    ..
                } => {
                    check_path(source);
                    if let Some(parent) = parent {
                        check_path(parent);
                    }
                    if parent.is_some() && field.is_none() {
                        issues.push(ValidationIssue::MissingField { edit: idx, field: "field" });
                    }
                }
            }
        }

        ValidationError::from_issues(issues)
    }
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationError {
    fn from_issues(issues: Vec<ValidationIssue>) -> Result<(), ValidationError> {
        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    EmptyScript,
    MissingField { edit: usize, field: &'static str },
    InvalidPath { edit: usize, path: String },
    InvalidCombo { edit: usize, message: String },
    InvalidValue { field: &'static str, message: String },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::EmptyScript => write!(f, "edit script contains no edits"),
            ValidationIssue::MissingField { edit, field } => {
                write!(f, "edit #{edit} missing required field '{field}'")
            }
            ValidationIssue::InvalidPath { edit, path } => {
                write!(f, "edit #{edit} has malformed node path '{path}'")
            }
            ValidationIssue::InvalidCombo { edit, message } => {
                write!(f, "edit #{edit} has invalid configuration: {message}")
            }
            ValidationIssue::InvalidValue { field, message } => {
                write!(f, "invalid value for '{field}': {message}")
            }
        }
    }
}
