//! The users API's endpoints.
//!
//! Each function performs a single request. Endpoints which hand out tokens
//! also write them to the client's [`CredentialProvider`], so they're
//! available even when the transport doesn't process `Set-Cookie` headers.
//!
//! [`CredentialProvider`]: crate::CredentialProvider

mod change_password;
mod current_user;
mod login;
mod logout;
mod refresh;
mod register;

pub use change_password::change_password;
pub use current_user::{current_user, UserProfile};
pub use login::login;
pub use logout::logout;
pub use refresh::refresh;
pub use register::register;

use crate::{
    credentials::{ACCESS_TOKEN, REFRESH_TOKEN},
    AuthenticatedClient, Error, Response,
};
use serde_derive::{Deserialize, Serialize};

/// The pair of credentials handed out by login, registration and password
/// changes.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Tokens {
    pub access_token: String,
    pub refresh_token: String,
}

impl std::fmt::Debug for Tokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tokens").finish_non_exhaustive()
    }
}

/// Turn anything other than a 2xx into an [`Error::Rejected`].
fn ensure_success(response: Response) -> Result<Response, Error> {
    if response.is_success() {
        Ok(response)
    } else {
        Err(Error::rejected(&response))
    }
}

/// Read a [`Tokens`] body and remember both credentials.
fn store_tokens(
    client: &AuthenticatedClient,
    response: &Response,
) -> Result<Tokens, Error> {
    let tokens: Tokens = response.json()?;

    client.credentials().set(ACCESS_TOKEN, &tokens.access_token);
    client.credentials().set(REFRESH_TOKEN, &tokens.refresh_token);

    Ok(tokens)
}
