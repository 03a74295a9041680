/// Failure categories surfaced by the pipeline.
///
/// Every error is reported to the caller immediately; there is no internal
/// recovery and no silent downgrade to a default value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed configuration (boundary list, parameter box, CLI input).
    Configuration,
    /// Failed file access or an unreadable table/model file.
    Io,
    /// A segment's sample subset is empty; the segment cannot be fitted.
    InsufficientData,
    /// An error-metric band contains no samples.
    EmptyRange,
    /// The least-squares solve failed to converge within its bounds.
    FitDivergence,
}

impl ErrorKind {
    /// Stable process exit code for this failure category.
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::Configuration | ErrorKind::Io => 2,
            ErrorKind::InsufficientData | ErrorKind::EmptyRange => 3,
            ErrorKind::FitDivergence => 4,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    kind: ErrorKind,
    message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io, message)
    }

    pub fn insufficient_data(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InsufficientData, message)
    }

    pub fn empty_range(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::EmptyRange, message)
    }

    pub fn divergence(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::FitDivergence, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn exit_code(&self) -> u8 {
        self.kind.exit_code()
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_stable() {
        assert_eq!(AppError::config("x").exit_code(), 2);
        assert_eq!(AppError::io("x").exit_code(), 2);
        assert_eq!(AppError::insufficient_data("x").exit_code(), 3);
        assert_eq!(AppError::empty_range("x").exit_code(), 3);
        assert_eq!(AppError::divergence("x").exit_code(), 4);
    }
}
