//! Append-only audit events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Error;
use super::text_enum::string_enum;

/// Recorded action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
pub enum EventName {
    /// A user account was created.
    #[serde(rename = "User.create")]
    UserCreate,
    /// A user account was changed.
    #[serde(rename = "User.update")]
    UserUpdate,
    /// A user account was removed.
    #[serde(rename = "User.delete")]
    UserDelete,
    /// Someone signed in.
    #[serde(rename = "Login.success")]
    LoginSuccess,
}

string_enum!(EventName, "event name", {
    UserCreate => "User.create",
    UserUpdate => "User.update",
    UserDelete => "User.delete",
    LoginSuccess => "Login.success",
});

/// Event about to be stored.
///
/// The actor is kept as an e-mail address rather than a user reference so the
/// trail survives deletion of the account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewEvent {
    /// Acting user's e-mail; empty for system actions.
    pub user_email: String,
    /// What happened.
    pub name: EventName,
    /// Free-form details.
    pub context: Value,
}

/// Stored event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct Event {
    /// Identifier.
    pub id: i32,
    /// When it was recorded.
    pub timestamp: DateTime<Utc>,
    /// Acting user's e-mail.
    pub user_email: String,
    /// What happened.
    pub name: EventName,
    /// Free-form details.
    #[schema(value_type = Object)]
    pub context: Value,
}

impl NewEvent {
    /// Event with an empty context.
    #[must_use]
    pub fn new(user_email: impl Into<String>, name: EventName) -> Self {
        Self {
            user_email: user_email.into(),
            name,
            context: Value::Object(serde_json::Map::new()),
        }
    }

    /// Attach details.
    #[must_use]
    pub fn with_context(mut self, context: Value) -> Self {
        self.context = context;
        self
    }

    /// Build from a textual name, rejecting anything unsupported.
    ///
    /// # Errors
    /// Returns [`Error::invalid_request`] for unknown names.
    ///
    /// # Examples
    /// ```
    /// use wies::domain::NewEvent;
    ///
    /// assert!(NewEvent::named("admin@rijksoverheid.nl", "User.create").is_ok());
    /// assert!(NewEvent::named("admin@rijksoverheid.nl", "User.rename").is_err());
    /// ```
    pub fn named(user_email: impl Into<String>, name: &str) -> Result<Self, Error> {
        let parsed: EventName = name
            .parse()
            .map_err(|_| Error::invalid_request(format!("Unsupported event name: {name}")))?;
        Ok(Self::new(user_email, parsed))
    }
}
