use std::fmt;

/// Message shown for every transport-level failure.
pub const NETWORK_ERROR_MESSAGE: &str = "Error connecting to server";

/// Message shown when the server rejects a request without an `error` field.
pub const GENERIC_SERVER_ERROR: &str = "Server error";

/// Client-side error types.
///
/// `Validation` and `CommandParse` are raised before any network call is made;
/// `Network` and `Server` come out of the prediction client.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientError {
    /// Input rejected locally (e.g. an OCR upload without any document).
    Validation(String),
    /// A `predict:` chat command whose payload could not be decoded.
    CommandParse {
        /// Example payload shown back to the user.
        hint: String,
        /// Decoder message, kept for logs only.
        detail: String,
    },
    /// Transport failure: connection refused, unreadable or malformed body.
    Network(String),
    /// Non-success HTTP status, with the server-provided message when present.
    Server {
        /// HTTP status code returned by the server.
        status: u16,
        /// Value of the `error` field of the response body, if any.
        message: Option<String>,
    },
}

impl ClientError {
    /// Text to surface to the user, either inline on a form or as a bot turn.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Validation(msg) => msg.clone(),
            ClientError::CommandParse { hint, .. } => hint.clone(),
            ClientError::Network(_) => NETWORK_ERROR_MESSAGE.to_string(),
            ClientError::Server { message, .. } => message
                .clone()
                .unwrap_or_else(|| GENERIC_SERVER_ERROR.to_string()),
        }
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Validation(msg) => write!(f, "Validation error: {}", msg),
            ClientError::CommandParse { detail, .. } => {
                write!(f, "Command parse error: {}", detail)
            }
            ClientError::Network(msg) => write!(f, "Network error: {}", msg),
            ClientError::Server {
                status,
                message: Some(msg),
            } => write!(f, "Server error ({}): {}", status, msg),
            ClientError::Server {
                status,
                message: None,
            } => write!(f, "Server error ({})", status),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<reqwest::Error> for ClientError {
    /// Converts a `reqwest::Error` into a `ClientError`.
    fn from(err: reqwest::Error) -> Self {
        ClientError::Network(err.to_string())
    }
}
