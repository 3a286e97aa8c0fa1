use thiserror::Error;

/// Everything that can go wrong while expanding a grammar, interpreting a
/// sequence, or loading presets. Configuration problems abort before any
/// geometry is produced; structural problems abort the interpretation run.
#[derive(Debug, Error)]
pub enum LsystemError {
    #[error("rule for '{symbol}' has invalid weight {weight}")]
    InvalidWeight { symbol: char, weight: f64 },

    #[error("{requested} iterations requested, cap is {max}")]
    IterationCap { requested: u32, max: u32 },

    #[error("sequence exceeded {max} symbols during pass {pass}")]
    SequenceCap { pass: u32, max: usize },

    #[error("{name} must be finite, got {value}")]
    NonFinite { name: &'static str, value: f64 },

    #[error("unbalanced ']' at symbol {position}: branch stack is empty")]
    UnbalancedPop { position: usize },

    #[error("preset error: {0}")]
    Preset(String),

    #[error("io error: {0}")]
    Io(String),
}

impl From<serde_json::Error> for LsystemError {
    fn from(e: serde_json::Error) -> Self {
        Self::Preset(e.to_string())
    }
}

impl From<std::io::Error> for LsystemError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl From<image::ImageError> for LsystemError {
    fn from(e: image::ImageError) -> Self {
        Self::Io(e.to_string())
    }
}
