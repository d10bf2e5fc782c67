//! Formula error types

use thiserror::Error;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Errors that can occur while defining, instantiating or evaluating formulas
#[derive(Debug, Error)]
pub enum FormulaError {
    /// A standard formula was declared without a required field
    #[error("formula '{formula}' is missing required field '{field}'")]
    Definition {
        formula: String,
        field: &'static str,
    },

    /// An extension declaration is not a usable binding
    #[error("'{0}' is not a valid extension")]
    InvalidExtension(String),

    /// A required keyword argument was not supplied
    #[error("{0} is not given")]
    MissingParameter(String),

    /// A bundle was asked for an accessor it cannot resolve
    #[error("'{bundle}' object has no attribute '{accessor}'")]
    UnknownAccessor { bundle: String, accessor: String },

    /// The definition cannot be represented as a JSON record
    #[error("cannot serialize formula '{formula}': {reason}")]
    SerializationUnsupported { formula: String, reason: String },

    /// Expression parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Expression evaluation error
    #[error("Evaluation error: {0}")]
    Evaluation(String),

    /// A name in the expression is not bound in the scope
    #[error("name '{0}' is not defined")]
    UnknownName(String),

    /// A call targets a name that is not a bound function
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    /// Wrong number of arguments passed to an extension function
    #[error("Wrong number of arguments for {function}: expected {expected}, got {actual}")]
    ArgumentCount {
        function: String,
        expected: String,
        actual: usize,
    },

    /// No formula with this name is known
    #[error("Unknown formula: {0}")]
    UnknownFormula(String),

    /// Malformed JSON text
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FormulaError {
    /// Whether this error came out of parsing or evaluating an expression
    pub fn is_evaluation_fault(&self) -> bool {
        matches!(
            self,
            FormulaError::Parse(_)
                | FormulaError::Evaluation(_)
                | FormulaError::UnknownName(_)
                | FormulaError::UnknownFunction(_)
                | FormulaError::ArgumentCount { .. }
        )
    }
}
