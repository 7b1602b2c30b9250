use crate::{AuthenticatedClient, Error, Request};

/// Tell the server to invalidate the user's tokens.
///
/// Local credentials are dropped whether or not the server agreed.
pub async fn logout(client: &AuthenticatedClient) -> Result<(), Error> {
    let result = client
        .send_anonymous(&Request::post("users/logout"))
        .await
        .and_then(super::ensure_success);

    client.credentials().clear();

    result.map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        credentials::{ACCESS_TOKEN, REFRESH_TOKEN},
        test_utils::{Harness, ScriptedTransport},
        CredentialProvider, StatusCode,
    };
    use serde_json::json;

    #[tokio::test]
    async fn logging_out_clears_credentials() {
        let harness = Harness::logged_in(vec![ScriptedTransport::reply(
            StatusCode::OK,
            json!({ "uuid": "u-1", "name": "Ana", "email": "ana@example.com" }),
        )]);

        logout(&harness.client).await.unwrap();

        assert_eq!(harness.transport.paths(), vec!["users/logout"]);
        assert_eq!(harness.credentials.get(ACCESS_TOKEN), None);
        assert_eq!(harness.credentials.get(REFRESH_TOKEN), None);
    }

    #[tokio::test]
    async fn credentials_are_cleared_even_when_the_server_fails() {
        let harness = Harness::logged_in(vec![ScriptedTransport::unreachable()]);

        let got = logout(&harness.client).await;

        assert!(matches!(got, Err(Error::Transport(_))));
        assert_eq!(harness.credentials.get(REFRESH_TOKEN), None);
    }
}
