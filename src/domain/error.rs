//! Domain error types.

/// A parse error with position information for text rules.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("parse error at position {position}: {message}")]
pub struct ParseError {
    pub message: String,
    pub position: usize,
}

impl ParseError {
    /// Format the error with a caret pointing at the error position in the input.
    pub fn display_with_context(&self, input: &str) -> String {
        let caret = " ".repeat(self.position) + "^";
        format!(
            "{input}\n{caret}\n{err}",
            input = input,
            caret = caret,
            err = self
        )
    }
}

/// Top-level error type for tidescan.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("missing column {column}")]
    MissingColumn { column: String },

    #[error("computation of {name} failed: {reason}")]
    Computation { name: String, reason: String },

    #[error("no data for {symbol} at {interval}: {reason}")]
    DataUnavailable {
        symbol: String,
        interval: String,
        reason: String,
    },

    #[error("no timeframe returned data for {symbol}")]
    NoData { symbol: String },

    #[error("scan cancelled before {symbol} was processed")]
    Cancelled { symbol: String },

    #[error("scan of {symbol} panicked: {reason}")]
    SymbolPanicked { symbol: String, reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("unknown setup: {name}")]
    UnknownSetup { name: String },

    #[error(transparent)]
    RuleParse(#[from] ParseError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ScanError {
    pub fn computation(name: &str, reason: impl Into<String>) -> Self {
        ScanError::Computation {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&ScanError> for std::process::ExitCode {
    fn from(err: &ScanError) -> Self {
        let code: u8 = match err {
            ScanError::Io(_) => 1,
            ScanError::ConfigParse { .. }
            | ScanError::ConfigInvalid { .. }
            | ScanError::UnknownSetup { .. } => 2,
            ScanError::DataUnavailable { .. } | ScanError::NoData { .. } => 3,
            ScanError::RuleParse(_) => 4,
            ScanError::MissingColumn { .. } | ScanError::Computation { .. } => 5,
            ScanError::Cancelled { .. } | ScanError::SymbolPanicked { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}
