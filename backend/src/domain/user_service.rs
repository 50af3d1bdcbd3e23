//! User administration, development login and the audit trail.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::ports::{
    EventRepository, EventRepositoryError, UserRepository, UserRepositoryError,
};
use crate::domain::{
    AllowedEmailDomains, Error, EventName, NewEvent, Permission, User, UserDraft, UserId,
    UserListQuery,
};

/// Users per page in the admin list.
pub const USER_PAGE_SIZE: usize = 50;

/// The signed-in user as returned by `GET /me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct UserProfile {
    /// Stored user.
    #[serde(flatten)]
    pub user: User,
    /// First and last name.
    pub full_name: String,
    /// Effective permissions.
    pub permissions: BTreeSet<Permission>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            full_name: user.full_name(),
            permissions: user.permissions(),
            user,
        }
    }
}

/// One page of the user list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct UserPage {
    /// Users on this page.
    pub users: Vec<User>,
    /// Matching users over all pages.
    pub total: usize,
    /// Current page, 1-based.
    pub page: usize,
    /// Following page when there is one.
    pub next_page: Option<usize>,
}

/// User service.
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
    events: Arc<dyn EventRepository>,
    domains: AllowedEmailDomains,
}

fn map_user_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserRepositoryError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserRepositoryError::Conflict { message } => Error::conflict(message),
        UserRepositoryError::InvalidReference { message } => Error::invalid_request(message),
    }
}

fn map_event_error(error: EventRepositoryError) -> Error {
    match error {
        EventRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("event repository unavailable: {message}"))
        }
        EventRepositoryError::Query { message } => {
            Error::internal(format!("event repository error: {message}"))
        }
    }
}

impl UserService {
    /// Create the service; new and edited e-mail addresses must match
    /// `domains`.
    pub fn new(
        users: Arc<dyn UserRepository>,
        events: Arc<dyn EventRepository>,
        domains: AllowedEmailDomains,
    ) -> Self {
        Self {
            users,
            events,
            domains,
        }
    }

    /// Configured e-mail allow list.
    #[must_use]
    pub const fn allowed_domains(&self) -> &AllowedEmailDomains {
        &self.domains
    }

    async fn record(&self, actor: &str, name: EventName, context: serde_json::Value) -> Result<(), Error> {
        self.events
            .record(&NewEvent::new(actor, name).with_context(context))
            .await
            .map_err(map_event_error)
    }

    /// Resolve the user stored in a session.
    ///
    /// # Errors
    /// Unknown ids are unauthorised.
    pub async fn current(&self, id: UserId) -> Result<User, Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    /// Development login: sign in as the user with `email`.
    ///
    /// # Errors
    /// Unknown addresses are unauthorised.
    pub async fn login(&self, email: &str) -> Result<User, Error> {
        let Some(user) = self
            .users
            .find_by_email(email.trim())
            .await
            .map_err(map_user_error)?
        else {
            warn!("login attempt for unknown e-mail");
            return Err(Error::unauthorized("unknown user"));
        };
        self.record(&user.email, EventName::LoginSuccess, json!({}))
            .await?;
        info!(id = user.id, "user logged in");
        Ok(user)
    }

    /// Listed users matching `query`.
    ///
    /// # Errors
    /// Requires `view_user`.
    pub async fn list(&self, viewer: &User, query: &UserListQuery) -> Result<UserPage, Error> {
        viewer.require(Permission::ViewUser)?;
        let matching: Vec<User> = self
            .users
            .list()
            .await
            .map_err(map_user_error)?
            .into_iter()
            .filter(|user| query.matches(user))
            .collect();
        let total = matching.len();
        let page = query.page.unwrap_or(1).max(1);
        let users: Vec<User> = matching
            .into_iter()
            .skip((page - 1).saturating_mul(USER_PAGE_SIZE))
            .take(USER_PAGE_SIZE)
            .collect();
        let shown = (page - 1).saturating_mul(USER_PAGE_SIZE) + users.len();
        Ok(UserPage {
            users,
            total,
            page,
            next_page: (shown < total).then_some(page + 1),
        })
    }

    /// Create a user.
    ///
    /// # Errors
    /// Requires `add_user`; duplicate e-mail addresses conflict.
    pub async fn create(&self, actor: &User, draft: UserDraft) -> Result<User, Error> {
        actor.require(Permission::AddUser)?;
        let draft = draft.normalised(&self.domains)?;
        self.ensure_email_free(&draft.email, None).await?;
        let user = self
            .users
            .create(&draft, false)
            .await
            .map_err(map_user_error)?;
        self.record(
            &actor.email,
            EventName::UserCreate,
            json!({"user_id": user.id, "email": user.email}),
        )
        .await?;
        info!(id = user.id, "created user");
        Ok(user)
    }

    /// Replace a user's names, e-mail, labels and roles.
    ///
    /// # Errors
    /// Requires `change_user`; unknown ids are not found.
    pub async fn update(&self, actor: &User, id: UserId, draft: UserDraft) -> Result<User, Error> {
        actor.require(Permission::ChangeUser)?;
        let draft = draft.normalised(&self.domains)?;
        self.ensure_email_free(&draft.email, Some(id)).await?;
        let user = self
            .users
            .update(id, &draft)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found(format!("user {id} not found")))?;
        self.record(
            &actor.email,
            EventName::UserUpdate,
            json!({"user_id": user.id, "email": user.email}),
        )
        .await?;
        info!(id, "updated user");
        Ok(user)
    }

    /// Delete a user.
    ///
    /// # Errors
    /// Requires `delete_user`; unknown ids are not found.
    pub async fn delete(&self, actor: &User, id: UserId) -> Result<(), Error> {
        actor.require(Permission::DeleteUser)?;
        if !self.users.delete(id).await.map_err(map_user_error)? {
            return Err(Error::not_found(format!("user {id} not found")));
        }
        self.record(&actor.email, EventName::UserDelete, json!({"user_id": id}))
            .await?;
        info!(id, "deleted user");
        Ok(())
    }

    /// Create a superuser for local development unless the e-mail exists.
    /// Returns the user and whether it was created.
    ///
    /// # Errors
    /// Propagates repository failures.
    pub async fn add_developer_user(
        &self,
        email: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<(User, bool), Error> {
        if let Some(existing) = self
            .users
            .find_by_email(email)
            .await
            .map_err(map_user_error)?
        {
            return Ok((existing, false));
        }
        let draft = UserDraft {
            first_name: first_name.to_owned(),
            last_name: last_name.to_owned(),
            email: email.to_owned(),
            label_ids: BTreeSet::new(),
            roles: BTreeSet::new(),
        }
        .normalised(&AllowedEmailDomains::default())?;
        let user = self
            .users
            .create(&draft, true)
            .await
            .map_err(map_user_error)?;
        info!(id = user.id, "created developer user");
        Ok((user, true))
    }

    async fn ensure_email_free(&self, email: &str, own_id: Option<UserId>) -> Result<(), Error> {
        let existing = self
            .users
            .find_by_email(email)
            .await
            .map_err(map_user_error)?;
        match existing {
            Some(user) if Some(user.id) != own_id => Err(Error::conflict(format!(
                "a user with email '{email}' already exists"
            ))
            .with_details(json!({"field": "email", "code": "duplicate_email"}))),
            _ => Ok(()),
        }
    }
}
