use super::Tokens;
use crate::{AuthenticatedClient, Error, Request};
use serde_json::json;

/// Authenticate with the users service.
///
/// A `401` here means the password was wrong, so this never goes through the
/// refresh dance.
pub async fn login(
    client: &AuthenticatedClient,
    email: &str,
    password: &str,
) -> Result<Tokens, Error> {
    let request = Request::post("users/login").json(json!({
        "email": email,
        "password": password,
    }));

    log::debug!("Logging in as {}", email);
    let response = super::ensure_success(client.send_anonymous(&request).await?)?;

    super::store_tokens(client, &response)
}
