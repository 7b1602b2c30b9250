use serde::de::Error as _;
use serde_derive::{Deserialize, Serialize};
use serde_json::Value;

/// The client-held record of the currently authenticated user.
///
/// Credentials are deliberately absent, they travel through the
/// [`CredentialProvider`](crate::CredentialProvider) instead.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Session {
    pub name: String,
    pub email: String,
    pub premium: bool,
    /// Opaque account identifier.
    pub uuid: String,
}

impl Session {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        premium: bool,
        uuid: impl Into<String>,
    ) -> Self {
        Session {
            name: name.into(),
            email: email.into(),
            premium,
            uuid: uuid.into(),
        }
    }

    /// A session counts as logged in when every identity field is populated.
    pub fn is_logged_in(&self) -> bool {
        !self.name.is_empty() && !self.email.is_empty() && !self.uuid.is_empty()
    }

    pub fn to_json(&self) -> Value {
        serde_json::json!({
            "name": self.name,
            "email": self.email,
            "premium": self.premium,
            "uuid": self.uuid,
        })
    }

    /// Rebuild a session from a plain record.
    ///
    /// Records written by an older schema may be missing fields, those are
    /// left at their defaults. Anything other than a JSON object is an error.
    pub fn from_json(record: &Value) -> Result<Self, serde_json::Error> {
        if !record.is_object() {
            return Err(serde_json::Error::custom("expected an object"));
        }

        serde_json::from_value(record.clone())
    }
}
