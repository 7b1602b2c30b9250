use crate::{AuthenticatedClient, Error, Request};
use serde_derive::{Deserialize, Serialize};

/// The user's profile, as reported by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub uuid: String,
    pub name: String,
    pub email: String,
    /// Older deployments don't know about subscriptions yet.
    #[serde(default)]
    pub premium: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Ask the server who the current credentials belong to.
pub async fn current_user(
    client: &AuthenticatedClient,
) -> Result<UserProfile, Error> {
    let response = client.fetch(&Request::get("users/me")).await?;
    let response = super::ensure_success(response)?;

    let profile: UserProfile = response.json()?;
    log::trace!("Current user: {:#?}", profile);

    Ok(profile)
}
