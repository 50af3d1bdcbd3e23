//! Application users, their roles and what those roles may do.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::text_enum::string_enum;
use super::{ColleagueId, Error, LabelId};

/// User identifier.
pub type UserId = i32;

/// Role granting a bundle of permissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, utoipa::ToSchema)]
pub enum Role {
    /// Administrator: users, labels and organisations.
    #[serde(rename = "Beheerder")]
    Beheerder,
    /// Consultant without extra permissions.
    #[serde(rename = "Consultant")]
    Consultant,
    /// Business development: creates assignments and their parts.
    #[serde(rename = "Business Development Manager")]
    BusinessDevelopmentManager,
}

string_enum!(Role, "role", {
    Beheerder => "Beheerder",
    Consultant => "Consultant",
    BusinessDevelopmentManager => "Business Development Manager",
});

impl Role {
    /// Every role.
    pub const ALL: [Self; 3] = [
        Self::Beheerder,
        Self::Consultant,
        Self::BusinessDevelopmentManager,
    ];

    /// Permissions granted by this role.
    #[must_use]
    pub const fn permissions(self) -> &'static [Permission] {
        match self {
            Self::Beheerder => &[
                Permission::ViewUser,
                Permission::AddUser,
                Permission::ChangeUser,
                Permission::DeleteUser,
                Permission::ManageLabels,
                Permission::ManageOrganizations,
                Permission::ManageFilters,
            ],
            Self::Consultant => &[],
            Self::BusinessDevelopmentManager => &[
                Permission::AddAssignment,
                Permission::AddService,
                Permission::AddPlacement,
                Permission::AddColleague,
            ],
        }
    }
}

/// Individual capability checked by use cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
#[expect(missing_docs, reason = "variant names describe the permission")]
pub enum Permission {
    ViewUser,
    AddUser,
    ChangeUser,
    DeleteUser,
    ManageLabels,
    ManageOrganizations,
    AddAssignment,
    ChangeAssignment,
    DeleteAssignment,
    AddService,
    AddPlacement,
    AddColleague,
    ChangeColleague,
    DeleteColleague,
    ManageSkills,
    ManageFilters,
}

/// Stored user with roles and labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct User {
    /// Stable identifier.
    pub id: UserId,
    /// Unique e-mail address, used for login.
    pub email: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Holds every permission.
    pub is_superuser: bool,
    /// Assigned roles.
    pub roles: BTreeSet<Role>,
    /// Attached labels.
    pub label_ids: BTreeSet<LabelId>,
    /// Colleague profile linked to this user, if any.
    pub colleague_id: Option<ColleagueId>,
}

impl User {
    /// `first last`, trimmed.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_owned()
    }

    /// Whether the user holds `permission` directly or through a role.
    #[must_use]
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.is_superuser
            || self
                .roles
                .iter()
                .any(|role| role.permissions().contains(&permission))
    }

    /// Every permission held, sorted.
    #[must_use]
    pub fn permissions(&self) -> BTreeSet<Permission> {
        if self.is_superuser {
            return ALL_PERMISSIONS.iter().copied().collect();
        }
        self.roles
            .iter()
            .flat_map(|role| role.permissions().iter().copied())
            .collect()
    }

    /// Fail with `forbidden` unless the user holds `permission`.
    ///
    /// # Errors
    /// Returns [`Error::forbidden`] naming the missing permission.
    pub fn require(&self, permission: Permission) -> Result<(), Error> {
        if self.has_permission(permission) {
            Ok(())
        } else {
            Err(Error::forbidden(format!(
                "missing permission {}",
                serde_json::to_value(permission)
                    .ok()
                    .and_then(|value| value.as_str().map(str::to_owned))
                    .unwrap_or_default()
            )))
        }
    }

    /// Whether the user may edit an assignment with the given owner and
    /// placed colleagues.
    #[must_use]
    pub fn can_edit_assignment(
        &self,
        owner_id: Option<ColleagueId>,
        placed: &[ColleagueId],
    ) -> bool {
        if self.has_permission(Permission::ChangeAssignment) {
            return true;
        }
        let Some(colleague_id) = self.colleague_id else {
            return false;
        };
        owner_id == Some(colleague_id) || placed.contains(&colleague_id)
    }
}

const ALL_PERMISSIONS: [Permission; 16] = [
    Permission::ViewUser,
    Permission::AddUser,
    Permission::ChangeUser,
    Permission::DeleteUser,
    Permission::ManageLabels,
    Permission::ManageOrganizations,
    Permission::AddAssignment,
    Permission::ChangeAssignment,
    Permission::DeleteAssignment,
    Permission::AddService,
    Permission::AddPlacement,
    Permission::AddColleague,
    Permission::ChangeColleague,
    Permission::DeleteColleague,
    Permission::ManageSkills,
    Permission::ManageFilters,
];

/// Validated fields for creating or updating a user.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, utoipa::ToSchema)]
pub struct UserDraft {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// E-mail address.
    pub email: String,
    /// Labels to attach.
    #[serde(default)]
    pub label_ids: BTreeSet<LabelId>,
    /// Roles to grant.
    #[serde(default)]
    pub roles: BTreeSet<Role>,
}

impl UserDraft {
    /// Trim names and e-mail and check the e-mail against `domains`.
    ///
    /// # Errors
    /// Rejects blank names, malformed e-mail and disallowed domains.
    pub fn normalised(self, domains: &AllowedEmailDomains) -> Result<Self, Error> {
        let first_name = self.first_name.trim().to_owned();
        let last_name = self.last_name.trim().to_owned();
        let email = self.email.trim().to_owned();
        if first_name.is_empty() {
            return Err(Error::invalid_field(
                "first_name",
                "required",
                "first name is required",
            ));
        }
        if last_name.is_empty() {
            return Err(Error::invalid_field(
                "last_name",
                "required",
                "last name is required",
            ));
        }
        if !is_valid_email(&email) {
            return Err(Error::invalid_field(
                "email",
                "invalid_email",
                format!("invalid email address '{email}'"),
            ));
        }
        if !domains.allows(&email) {
            return Err(Error::invalid_field(
                "email",
                "invalid_email_domain",
                format!("email '{email}' has a domain that is not allowed"),
            ));
        }
        Ok(Self {
            first_name,
            last_name,
            email,
            ..self
        })
    }
}

/// Query for the user list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, utoipa::IntoParams)]
pub struct UserListQuery {
    /// Matches full name, first name, last name or e-mail.
    #[serde(default, rename = "zoeken")]
    pub search: Option<String>,
    /// Only users carrying this label.
    #[serde(default, rename = "label")]
    pub label_id: Option<LabelId>,
    /// Only users holding this role.
    #[serde(default, rename = "rol")]
    pub role: Option<Role>,
    /// 1-based page.
    #[serde(default, rename = "pagina")]
    pub page: Option<usize>,
}

impl UserListQuery {
    /// Whether `user` is listed. Superusers never are.
    #[must_use]
    pub fn matches(&self, user: &User) -> bool {
        if user.is_superuser {
            return false;
        }
        if self.label_id.is_some_and(|id| !user.label_ids.contains(&id)) {
            return false;
        }
        if self.role.is_some_and(|role| !user.roles.contains(&role)) {
            return false;
        }
        let Some(needle) = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
        else {
            return true;
        };
        [
            user.full_name(),
            user.first_name.clone(),
            user.last_name.clone(),
            user.email.clone(),
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// Configured e-mail domain allow list; empty allows everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowedEmailDomains(Vec<String>);

impl AllowedEmailDomains {
    /// Build from a list of suffixes such as `@rijksoverheid.nl`.
    #[must_use]
    pub fn new(domains: impl IntoIterator<Item = String>) -> Self {
        Self(
            domains
                .into_iter()
                .map(|domain| domain.trim().to_lowercase())
                .filter(|domain| !domain.is_empty())
                .collect(),
        )
    }

    /// Parse a comma separated list.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        Self::new(raw.split(',').map(str::to_owned))
    }

    /// Whether `email` ends with one of the configured domains.
    ///
    /// # Examples
    /// ```
    /// use wies::domain::AllowedEmailDomains;
    ///
    /// let domains = AllowedEmailDomains::parse("@rijksoverheid.nl, @minbzk.nl");
    /// assert!(domains.allows("Jan@RijksOverheid.nl"));
    /// assert!(!domains.allows("jan@example.com"));
    /// assert!(AllowedEmailDomains::default().allows("jan@example.com"));
    /// ```
    #[must_use]
    pub fn allows(&self, email: &str) -> bool {
        let lowered = email.to_lowercase();
        self.0.is_empty() || self.0.iter().any(|domain| lowered.ends_with(domain))
    }

    /// Configured domains joined for error messages.
    #[must_use]
    pub fn describe(&self) -> String {
        self.0.join(", ")
    }
}

/// Minimal structural e-mail check: one `@`, non-empty local part and a
/// dotted domain without whitespace.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain
            .split('.')
            .all(|part| !part.is_empty())
        && domain.contains('.')
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    pub(crate) fn user(roles: &[Role]) -> User {
        User {
            id: 1,
            email: "jan@rijksoverheid.nl".to_owned(),
            first_name: "Jan".to_owned(),
            last_name: "Jansen".to_owned(),
            is_superuser: false,
            roles: roles.iter().copied().collect(),
            label_ids: BTreeSet::new(),
            colleague_id: None,
        }
    }

    #[rstest]
    #[case(&[Role::Beheerder], Permission::AddUser, true)]
    #[case(&[Role::Beheerder], Permission::AddAssignment, false)]
    #[case(&[Role::BusinessDevelopmentManager], Permission::AddPlacement, true)]
    #[case(&[Role::Consultant], Permission::ViewUser, false)]
    #[case(&[], Permission::ManageLabels, false)]
    fn role_permissions(#[case] roles: &[Role], #[case] permission: Permission, #[case] held: bool) {
        assert_eq!(user(roles).has_permission(permission), held);
    }

    #[rstest]
    fn superusers_hold_everything() {
        let mut admin = user(&[]);
        admin.is_superuser = true;
        assert!(admin.has_permission(Permission::ChangeAssignment));
        assert_eq!(admin.permissions().len(), ALL_PERMISSIONS.len());
        assert!(admin.require(Permission::DeleteUser).is_ok());
    }

    #[rstest]
    #[case(None, &[], false)]
    #[case(Some(7), &[], true)]
    #[case(None, &[3, 7], true)]
    #[case(Some(3), &[4], false)]
    fn owners_and_placed_colleagues_may_edit(
        #[case] owner: Option<ColleagueId>,
        #[case] placed: &[ColleagueId],
        #[case] allowed: bool,
    ) {
        let mut consultant = user(&[Role::Consultant]);
        consultant.colleague_id = Some(7);
        assert_eq!(consultant.can_edit_assignment(owner, placed), allowed);
    }

    #[rstest]
    fn require_reports_missing_permission() {
        let error = user(&[]).require(Permission::ManageLabels).expect_err("forbidden");
        assert_eq!(error.message(), "missing permission manage_labels");
    }

    #[rstest]
    #[case("jan@rijksoverheid.nl", true)]
    #[case("jan.jansen+x@minbzk.nl", true)]
    #[case("jan", false)]
    #[case("@minbzk.nl", false)]
    #[case("jan@minbzk", false)]
    #[case("jan @minbzk.nl", false)]
    #[case("jan@@minbzk.nl", false)]
    fn validates_email_shape(#[case] email: &str, #[case] valid: bool) {
        assert_eq!(is_valid_email(email), valid);
    }

    #[rstest]
    fn draft_rejects_disallowed_domain() {
        let draft = UserDraft {
            first_name: " Jan ".to_owned(),
            last_name: "Jansen".to_owned(),
            email: "jan@example.com".to_owned(),
            label_ids: BTreeSet::new(),
            roles: BTreeSet::new(),
        };
        let domains = AllowedEmailDomains::parse("@rijksoverheid.nl");
        let error = draft.clone().normalised(&domains).expect_err("domain");
        assert_eq!(
            error.details().and_then(|d| d.get("code")).and_then(|c| c.as_str()),
            Some("invalid_email_domain")
        );
        let normalised = draft
            .normalised(&AllowedEmailDomains::default())
            .expect("any domain");
        assert_eq!(normalised.first_name, "Jan");
    }

    #[rstest]
    fn list_query_hides_superusers_and_searches_names() {
        let mut admin = user(&[]);
        admin.is_superuser = true;
        let query = UserListQuery {
            search: Some("jan jan".to_owned()),
            ..UserListQuery::default()
        };
        assert!(!query.matches(&admin));
        assert!(query.matches(&user(&[])));
        let by_role = UserListQuery {
            role: Some(Role::Beheerder),
            ..UserListQuery::default()
        };
        assert!(!by_role.matches(&user(&[Role::Consultant])));
    }
}
