use crate::{
    client::REFRESH_PATH, credentials::ACCESS_TOKEN, AuthenticatedClient,
    Error, Request,
};
use serde_derive::Deserialize;

/// Trade the refresh token for a new access token.
pub async fn refresh(client: &AuthenticatedClient) -> Result<String, Error> {
    let response = client.send_anonymous(&Request::post(REFRESH_PATH)).await?;
    let response = super::ensure_success(response)?;

    let RefreshResponse { access_token } = response.json()?;
    client.credentials().set(ACCESS_TOKEN, &access_token);

    Ok(access_token)
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
}
