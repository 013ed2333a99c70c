//! Per-item fetch status

use std::fmt;

/// Progress of a single cached fetch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Status {
    /// No fetch has been requested for this key.
    #[default]
    NotStarted,
    /// A fetch is running.
    InProgress,
    /// The body is cached.
    Finished,
    /// The last fetch failed.
    Error(String),
}

impl Status {
    /// Whether the status is final for the current attempt.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Finished | Self::Error(_))
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotStarted => write!(f, "not started"),
            Self::InProgress => write!(f, "in progress"),
            Self::Finished => write!(f, "finished"),
            Self::Error(message) => write!(f, "error: {message}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Status::NotStarted, "not started")]
    #[case(Status::InProgress, "in progress")]
    #[case(Status::Finished, "finished")]
    #[case(Status::Error("timed out after 5ms".into()), "error: timed out after 5ms")]
    fn display_matches_host_strings(#[case] status: Status, #[case] expected: &str) {
        assert_eq!(status.to_string(), expected);
    }

    #[test]
    fn only_terminal_states_are_settled() {
        assert!(!Status::NotStarted.is_settled());
        assert!(!Status::InProgress.is_settled());
        assert!(Status::Finished.is_settled());
        assert!(Status::Error(String::new()).is_settled());
    }
}
