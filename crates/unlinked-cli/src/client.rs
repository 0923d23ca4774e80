//! CLI error type separating validation problems from operational failures.

use std::fmt::{self, Display, Formatter};

use unlinked_config::ConfigError;
use unlinked_core::TransportError;

/// CLI-level error type to distinguish validation from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    /// Settings that cannot be resolved abort the run before anything is attempted.
    pub(crate) fn config(error: ConfigError) -> Self {
        Self::Validation(format!("{:#}", anyhow::Error::new(error)))
    }

    /// No session could be established with the daemon.
    pub(crate) fn connection(error: TransportError) -> Self {
        Self::Validation(format!("{:#}", anyhow::Error::new(error)))
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::PathBuf;

    #[test]
    fn configuration_problems_exit_with_two() {
        let err = CliError::config(ConfigError::Io {
            operation: "read",
            path: PathBuf::from("/etc/transmission/settings.json"),
            source: io::Error::from(io::ErrorKind::NotFound),
        });
        assert_eq!(err.exit_code(), 2);
        assert!(
            err.display_message()
                .starts_with("failed to read /etc/transmission/settings.json: ")
        );

        let err = CliError::connection(TransportError::connection("session-get", "refused"));
        assert_eq!(err.exit_code(), 2);
        assert!(err.display_message().contains("refused"));
    }

    #[test]
    fn operational_failures_exit_with_three() {
        let err = CliError::failure(anyhow::anyhow!("1 removal failed"));
        assert_eq!(err.exit_code(), 3);
        assert_eq!(err.display_message(), "1 removal failed");
        assert_eq!(CliError::validation("bad").display_message(), "bad");
    }
}
