use crate::{
    endpoints::{self, UserProfile},
    AuthenticatedClient, Config, CookieJar, Error, HttpTransport, Navigation,
    Navigator, Route, Session, SessionStore,
};
use std::sync::Arc;

/// The high-level operations a UI needs: register, log in and out, change
/// the password, and keep the [`SessionStore`] in sync with the server.
#[derive(Debug, Clone)]
pub struct Auth {
    client: Arc<AuthenticatedClient>,
}

impl Auth {
    pub fn new(client: Arc<AuthenticatedClient>) -> Self { Auth { client } }

    /// Wire everything up from a [`Config`], persisting the session and
    /// credentials under its state directory.
    pub fn from_config(
        config: &Config,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, Error> {
        let storage = Arc::new(config.storage());
        let cookies = Arc::new(CookieJar::persistent(storage.clone()));
        let transport = HttpTransport::new(
            config.base_url.clone(),
            &config.user_agent,
            cookies.clone(),
        )?;
        let store = Arc::new(SessionStore::open(storage));

        let client = AuthenticatedClient::new(
            Arc::new(transport),
            cookies,
            store,
            navigator,
        );

        Ok(Auth::new(Arc::new(client)))
    }

    pub fn client(&self) -> &Arc<AuthenticatedClient> { &self.client }

    pub fn store(&self) -> &Arc<SessionStore> { self.client.store() }

    pub fn session(&self) -> Session { self.store().session() }

    pub fn logged_in(&self) -> bool { self.store().logged_in() }

    /// Check whether the user may visit `route`, following any redirect the
    /// guard asks for.
    pub fn visit(&self, route: Route) -> Navigation {
        let navigation = crate::guard(route, self.store());

        if let Navigation::Redirect(target) = navigation {
            self.client.navigator().navigate(target);
        }

        navigation
    }

    /// Create an account and log straight into it.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Session, Error> {
        validate_name(name)?;
        validate_email(email)?;
        validate_password("password", password)?;

        endpoints::register(&self.client, name, email, password).await?;
        let session = self.refresh_profile().await?;

        self.client.navigator().navigate(Route::Projects);
        Ok(session)
    }

    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, Error> {
        validate_email(email)?;
        if password.is_empty() {
            return Err(Error::Validation {
                field: "password",
                reason: "must not be empty",
            });
        }

        endpoints::login(&self.client, email, password).await?;
        let session = self.refresh_profile().await?;

        self.client.navigator().navigate(Route::Projects);
        Ok(session)
    }

    /// Ask the server who we are and store the answer.
    pub async fn refresh_profile(&self) -> Result<Session, Error> {
        let UserProfile {
            name,
            email,
            premium,
            uuid,
            ..
        } = endpoints::current_user(&self.client).await?;

        self.store().login(name, email, premium, uuid);

        Ok(self.session())
    }

    pub async fn change_password(
        &self,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), Error> {
        validate_password("new password", new_password)?;

        endpoints::change_password(&self.client, current_password, new_password)
            .await?;
        log::info!("Password changed");

        Ok(())
    }

    /// Log out, locally and on the server.
    ///
    /// The local session is always cleared. If the server couldn't be told,
    /// the error is returned after the fact.
    pub async fn logout(&self) -> Result<(), Error> {
        let result = endpoints::logout(&self.client).await;

        if let Err(e) = &result {
            log::warn!("The server didn't acknowledge the logout: {}", e);
        }

        self.store().logout();
        self.client.credentials().clear();
        self.client.navigator().navigate(Route::Login);

        result
    }
}

fn validate_name(name: &str) -> Result<(), Error> {
    let length = name.chars().count();

    if length < 3 || length > 50 {
        return Err(Error::Validation {
            field: "name",
            reason: "must be between 3 and 50 characters",
        });
    }

    Ok(())
}

fn validate_email(email: &str) -> Result<(), Error> {
    let valid = match email.split_once('@') {
        Some((user, domain)) => !user.is_empty() && !domain.is_empty(),
        None => false,
    };

    if !valid {
        return Err(Error::Validation {
            field: "email",
            reason: "must be an email address",
        });
    }

    Ok(())
}

fn validate_password(field: &'static str, password: &str) -> Result<(), Error> {
    let length = password.chars().count();

    if length < 8 || length > 50 {
        return Err(Error::Validation {
            field,
            reason: "must be between 8 and 50 characters",
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        credentials::{ACCESS_TOKEN, REFRESH_TOKEN},
        test_utils::{Harness, ScriptedTransport},
        CredentialProvider, StatusCode, Storage, SESSION_KEY,
    };
    use serde_json::json;

    fn profile() -> serde_json::Value {
        json!({
            "uuid": "u-1",
            "name": "Ana",
            "email": "ana@example.com",
            "premium": true,
            "created_at": "2024-01-01T00:00:00Z",
        })
    }

    fn tokens() -> serde_json::Value {
        json!({ "access_token": "a", "refresh_token": "r" })
    }

    #[tokio::test]
    async fn login_populates_the_session() {
        let harness = Harness::logged_out(vec![
            ScriptedTransport::reply(StatusCode::OK, tokens()),
            ScriptedTransport::reply(StatusCode::OK, profile()),
        ]);
        let auth = Auth::new(harness.client.clone());

        let got = auth.login("ana@example.com", "hunter22").await.unwrap();

        assert_eq!(got, Session::new("Ana", "ana@example.com", true, "u-1"));
        assert!(auth.logged_in());
        assert_eq!(harness.transport.paths(), vec!["users/login", "users/me"]);
        assert!(harness.storage.get(SESSION_KEY).unwrap().is_some());
        assert_eq!(harness.navigations(), vec![Route::Projects]);
    }

    #[tokio::test]
    async fn failed_logins_leave_the_session_alone() {
        let harness = Harness::logged_out(vec![ScriptedTransport::reply(
            StatusCode::NOT_FOUND,
            json!({ "error": "Email not found: ana@example.com" }),
        )]);
        let auth = Auth::new(harness.client.clone());

        let got = auth.login("ana@example.com", "hunter22").await;

        assert_eq!(
            got.unwrap_err().user_message(),
            "Email not found: ana@example.com"
        );
        assert!(!auth.logged_in());
        assert!(harness.navigations().is_empty());
    }

    #[tokio::test]
    async fn register_then_fetch_the_profile() {
        let harness = Harness::logged_out(vec![
            ScriptedTransport::reply(StatusCode::OK, tokens()),
            ScriptedTransport::reply(StatusCode::OK, profile()),
        ]);
        let auth = Auth::new(harness.client.clone());

        let got = auth
            .register("Ana", "ana@example.com", "hunter22")
            .await
            .unwrap();

        assert!(got.is_logged_in());
        assert_eq!(
            harness.transport.paths(),
            vec!["users/register", "users/me"]
        );
    }

    #[tokio::test]
    async fn bad_input_never_reaches_the_server() {
        let harness = Harness::logged_out(Vec::new());
        let auth = Auth::new(harness.client.clone());

        let short_name = auth.register("An", "ana@example.com", "hunter22").await;
        let bad_email = auth.register("Ana", "ana.example.com", "hunter22").await;
        let short_password = auth.register("Ana", "ana@example.com", "short").await;
        let empty_password = auth.login("ana@example.com", "").await;

        for result in [short_name, bad_email, short_password, empty_password]
            .iter()
        {
            assert!(matches!(result, Err(Error::Validation { .. })));
        }
        assert_eq!(harness.transport.calls(), 0);
    }

    #[tokio::test]
    async fn logout_clears_everything() {
        let harness = Harness::logged_in(vec![ScriptedTransport::reply(
            StatusCode::OK,
            profile(),
        )]);
        let auth = Auth::new(harness.client.clone());

        auth.logout().await.unwrap();

        assert!(!auth.logged_in());
        assert_eq!(harness.storage.get(SESSION_KEY).unwrap(), None);
        assert_eq!(harness.credentials.get(ACCESS_TOKEN), None);
        assert_eq!(harness.credentials.get(REFRESH_TOKEN), None);
        assert_eq!(harness.navigations(), vec![Route::Login]);
    }

    #[tokio::test]
    async fn logout_still_happens_when_the_server_is_down() {
        let harness =
            Harness::logged_in(vec![ScriptedTransport::unreachable()]);
        let auth = Auth::new(harness.client.clone());

        let got = auth.logout().await;

        assert!(matches!(got, Err(Error::Transport(_))));
        assert!(!auth.logged_in());
    }

    #[tokio::test]
    async fn refresh_profile_picks_up_premium_changes() {
        let harness = Harness::logged_in(vec![ScriptedTransport::reply(
            StatusCode::OK,
            profile(),
        )]);
        let auth = Auth::new(harness.client.clone());
        assert!(!auth.session().premium);

        let got = auth.refresh_profile().await.unwrap();

        assert!(got.premium);
    }

    #[tokio::test]
    async fn change_password_validates_the_new_password() {
        let harness = Harness::logged_in(Vec::new());
        let auth = Auth::new(harness.client.clone());

        let got = auth.change_password("hunter22", "short").await;

        assert!(matches!(
            got,
            Err(Error::Validation {
                field: "new password",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn change_password_rotates_tokens() {
        let harness = Harness::logged_in(vec![ScriptedTransport::reply(
            StatusCode::OK,
            json!({ "access_token": "a2", "refresh_token": "r2" }),
        )]);
        let auth = Auth::new(harness.client.clone());

        auth.change_password("hunter22", "hunter23").await.unwrap();

        assert_eq!(
            harness.credentials.get(REFRESH_TOKEN).as_deref(),
            Some("r2")
        );
        assert!(auth.logged_in());
    }

    #[test]
    fn visiting_a_protected_route_while_logged_out_redirects() {
        let harness = Harness::logged_out(Vec::new());
        let auth = Auth::new(harness.client.clone());

        let got = auth.visit(Route::Settings);

        assert_eq!(got, Navigation::Redirect(Route::Login));
        assert_eq!(harness.navigations(), vec![Route::Login]);
    }

    #[test]
    fn names_are_measured_in_characters() {
        assert!(validate_name("Zé").is_err());
        assert!(validate_name("Zé!").is_ok());
    }
}
