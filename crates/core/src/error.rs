/// Errors raised while loading a fee schedule declaration document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeclError {
    /// The document JSON is not shaped like a fee schedule.
    #[error("invalid schedule: {0}")]
    InvalidDocument(String),

    /// A declaration is missing a required field.
    #[error("missing field '{field}' in {construct}")]
    MissingField { construct: String, field: String },

    /// An input declares a kind the verifier has no domain for.
    #[error("unsupported input type '{kind}' for input '{name}'")]
    UnsupportedInputType { name: String, kind: String },

    /// A date bound is not an ISO `YYYY-MM-DD` date.
    #[error("invalid date '{value}' in input '{name}'")]
    InvalidDate { name: String, value: String },

    /// Two inputs share a name.
    #[error("duplicate input '{0}'")]
    DuplicateInput(String),
}
