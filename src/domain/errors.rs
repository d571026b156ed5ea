/// Error returned by a submission endpoint.
///
/// Carries a human-readable message suitable for direct display in the
/// wizard's status line. The wizard engine never inspects the message
/// beyond surfacing it.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionError {
    pub message: String,
}

impl SubmissionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for SubmissionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for SubmissionError {}

#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// A gateway receipt was missing a field the dashboard needs.
    MalformedRecord(String),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DomainError::MalformedRecord(detail) => {
                write!(f, "Malformed record: {}", detail)
            }
        }
    }
}

impl std::error::Error for DomainError {}

pub type DomainResult<T> = Result<T, DomainError>;
