use thiserror::Error;

/// Template errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TemplateError {
    /// Malformed template source
    #[error("template: {name}: {message}")]
    Parse { name: String, message: String },

    /// Failure while rendering a well-formed template
    #[error("template: {name}: executing: {message}")]
    Exec { name: String, message: String },
}

impl TemplateError {
    pub(crate) fn parse(name: &str, message: impl ToString) -> Self {
        TemplateError::Parse {
            name: name.to_string(),
            message: message.to_string(),
        }
    }

    pub(crate) fn exec(name: &str, message: impl ToString) -> Self {
        TemplateError::Exec {
            name: name.to_string(),
            message: message.to_string(),
        }
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, TemplateError::Parse { .. })
    }
}

pub type TemplateResult<T> = Result<T, TemplateError>;
