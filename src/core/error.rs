use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectionError {
    #[error("retirement age ({retirement_age}) must be greater than current age ({current_age})")]
    InvalidPeriod {
        current_age: u32,
        retirement_age: u32,
    },

    #[error("savings rate must be between 0 and 100, got {0}")]
    InvalidSavingsRate(f64),

    /// Raised by the boundary layer only; the engines never range-check ages or income.
    #[error("{field}: {message}")]
    InvalidRange {
        field: &'static str,
        message: String,
    },

    #[error("invalid solver configuration: {0}")]
    InvalidSolveConfig(String),

    #[error("projected amounts exceed the representable range at age {age}")]
    AmountOverflow { age: u32 },
}

impl ProjectionError {
    pub fn range(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidRange {
            field,
            message: message.into(),
        }
    }
}
