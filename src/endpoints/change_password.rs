use super::Tokens;
use crate::{AuthenticatedClient, Error, Request};
use serde_json::json;

/// Change the current user's password.
///
/// The server revokes the old tokens and hands out a fresh pair.
pub async fn change_password(
    client: &AuthenticatedClient,
    current_password: &str,
    new_password: &str,
) -> Result<Tokens, Error> {
    let request = Request::post("users/changepassword").json(json!({
        "current_password": current_password,
        "new_password": new_password,
    }));

    let response = super::ensure_success(client.fetch(&request).await?)?;

    super::store_tokens(client, &response)
}
