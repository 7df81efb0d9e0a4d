use reqwest::StatusCode;

/// Message shown to the end user for any failure that is not theirs to fix.
pub const GENERIC_FAILURE: &str = "An unexpected error occurred. Please try again later.";

/// Weather provider errors: transport, timeout or a response we could not decode.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Request to weather provider timed out")]
    Timeout,
    #[error("Network error: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("Provider returned status {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("Failed to decode provider response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Provider returned no {0} data")]
    Empty(&'static str),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout
        } else {
            ProviderError::Transport(err)
        }
    }
}

/// A daily forecast entry that lacks one of the fields we require.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Daily forecast entry is missing field `{field}`")]
pub struct MalformedRecord {
    pub field: &'static str,
}

/// Everything that can stop a route submission from producing an aggregate.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error("Invalid route request: {0}")]
    Validation(String),

    #[error("Route point not found: {city}")]
    NotFound { city: String },

    #[error("{context}")]
    Provider {
        context: String,
        #[source]
        source: ProviderError,
    },

    #[error("Malformed forecast for {city} (day {index})")]
    Malformed {
        city: String,
        index: usize,
        #[source]
        source: MalformedRecord,
    },
}

impl RouteError {
    pub(crate) fn provider(context: impl Into<String>, source: ProviderError) -> Self {
        RouteError::Provider { context: context.into(), source }
    }

    /// Not-found and validation failures are reported to the user as-is;
    /// everything else collapses into [`GENERIC_FAILURE`].
    pub fn is_user_recoverable(&self) -> bool {
        matches!(self, RouteError::NotFound { .. } | RouteError::Validation(_))
    }

    pub fn user_message(&self) -> String {
        match self {
            RouteError::NotFound { city } => {
                format!("Could not find route point: {city}. Try another city.")
            }
            RouteError::Validation(msg) => msg.clone(),
            RouteError::Provider { .. } | RouteError::Malformed { .. } => {
                GENERIC_FAILURE.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_the_city() {
        let err = RouteError::NotFound { city: "Atlantis".into() };
        assert!(err.is_user_recoverable());
        assert_eq!(err.user_message(), "Could not find route point: Atlantis. Try another city.");
    }

    #[test]
    fn provider_failures_collapse_to_generic_notice() {
        let err = RouteError::provider("daily forecast for Paris", ProviderError::Timeout);
        assert!(!err.is_user_recoverable());
        assert_eq!(err.user_message(), GENERIC_FAILURE);

        let err = RouteError::Malformed {
            city: "Paris".into(),
            index: 2,
            source: MalformedRecord { field: "Day.IconPhrase" },
        };
        assert_eq!(err.user_message(), GENERIC_FAILURE);
        assert!(err.to_string().contains("day 2"));
    }

    #[test]
    fn provider_error_keeps_source_chain() {
        let err = RouteError::provider("current conditions for Paris", ProviderError::Empty("current"));
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("Provider returned no current data"));
    }
}
