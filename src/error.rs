use crate::{Response, StatusCode, TransportError};
use serde_derive::Deserialize;

/// Everything that can go wrong while talking to the users API.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request never got a response.
    #[error("Unable to reach the server")]
    Transport(#[from] TransportError),
    /// The server understood the request and said no.
    #[error("The server rejected the request ({}): {}", status, message)]
    Rejected { status: StatusCode, message: String },
    /// The access token expired and couldn't be refreshed. The local session
    /// has already been cleared.
    #[error("Unauthorized")]
    Unauthorized,
    /// The response body wasn't what we expected.
    #[error("Unable to parse the response")]
    Decode(#[from] serde_json::Error),
    /// The input was rejected before anything was sent.
    #[error("Invalid {}: {}", field, reason)]
    Validation {
        field: &'static str,
        reason: &'static str,
    },
}

impl Error {
    /// Turn an unsuccessful response into an [`Error::Rejected`], using the
    /// message the server sent back when there is one.
    pub(crate) fn rejected(response: &Response) -> Self {
        let message = response
            .json::<ErrorBody>()
            .ok()
            .and_then(ErrorBody::into_message)
            .unwrap_or_else(|| {
                response
                    .status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string()
            });

        log::error!("Request failed with {}: {}", response.status, message);

        Error::Rejected {
            status: response.status,
            message,
        }
    }

    /// The message to show the user.
    pub fn user_message(&self) -> String {
        match self {
            Error::Rejected { message, .. } => message.clone(),
            Error::Unauthorized => {
                String::from("Your session has expired, please log in again")
            },
            other => other.to_string(),
        }
    }
}

/// The users service answers with `{error, details}`, older builds used
/// `{message}`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

impl ErrorBody {
    fn into_message(self) -> Option<String> {
        self.message
            .or(self.error)
            .filter(|message| !message.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_comes_from_the_error_field() {
        let response = Response::new(
            StatusCode::BAD_REQUEST,
            r#"{"error":"Email already in use: ana@example.com"}"#,
        );

        match Error::rejected(&response) {
            Error::Rejected { status, message } => {
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert_eq!(message, "Email already in use: ana@example.com");
            },
            other => panic!("Unexpected error: {:?}", other),
        }
    }

    #[test]
    fn message_field_takes_precedence() {
        let response = Response::new(
            StatusCode::BAD_REQUEST,
            r#"{"message":"Failed to login","error":"ignored"}"#,
        );

        let got = Error::rejected(&response).user_message();

        assert_eq!(got, "Failed to login");
    }

    #[test]
    fn fall_back_to_the_status_reason() {
        let response = Response::new(StatusCode::NOT_FOUND, "<html></html>");

        let got = Error::rejected(&response).user_message();

        assert_eq!(got, "Not Found");
    }
}
