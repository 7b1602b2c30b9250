use super::Tokens;
use crate::{AuthenticatedClient, Error, Request};
use serde_json::json;

/// Create a new account. The new user is logged in straight away.
pub async fn register(
    client: &AuthenticatedClient,
    name: &str,
    email: &str,
    password: &str,
) -> Result<Tokens, Error> {
    let request = Request::post("users/register").json(json!({
        "name": name,
        "email": email,
        "password": password,
    }));

    log::debug!("Registering {}", email);
    let response = super::ensure_success(client.send_anonymous(&request).await?)?;

    super::store_tokens(client, &response)
}
