//! Domain error types.

/// Top-level error type for iiti.
#[derive(Debug, thiserror::Error)]
pub enum IitiError {
    #[error("invalid granularity: {digits} digits (code width is {code_width}, expected 1..={code_width})")]
    InvalidGranularity { digits: u32, code_width: u32 },

    #[error("resolution mismatch: export table has {left} digits, import table has {right}")]
    ResolutionMismatch { left: u32, right: u32 },

    #[error("invalid top_n {top_n}: must be at least 1")]
    InvalidTopN { top_n: usize },

    #[error("input error: {reason}")]
    Input { reason: String },

    #[error("output error: {reason}")]
    Output { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl IitiError {
    pub(crate) fn config_invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        IitiError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&IitiError> for std::process::ExitCode {
    fn from(err: &IitiError) -> Self {
        let code: u8 = match err {
            IitiError::Io(_) => 1,
            IitiError::ConfigParse { .. }
            | IitiError::ConfigMissing { .. }
            | IitiError::ConfigInvalid { .. } => 2,
            IitiError::Input { .. } => 3,
            IitiError::InvalidGranularity { .. }
            | IitiError::ResolutionMismatch { .. }
            | IitiError::InvalidTopN { .. } => 4,
            IitiError::Output { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
