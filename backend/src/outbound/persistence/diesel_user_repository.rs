//! SQLite-backed user adapter.
//!
//! Users are stored across `users`, `user_roles` and `user_labels`; the
//! linked colleague is the one whose `user_id` points back at the user.
//! Writes touching several tables run in one transaction.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, RunQueryDsl};

use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::{LabelId, Role, User, UserDraft, UserId};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{UserRow, UserValues};
use super::pool::{DbPool, SqliteConn};
use super::schema::{colleagues, user_labels, user_roles, users};

/// Diesel-backed implementation of the user repository.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Replace the role and label rows of `user_id`.
pub(super) async fn write_memberships(
    conn: &mut SqliteConn,
    user_id: UserId,
    roles: &BTreeSet<Role>,
    label_ids: &BTreeSet<LabelId>,
) -> QueryResult<()> {
    diesel::delete(user_roles::table.filter(user_roles::user_id.eq(user_id)))
        .execute(conn)
        .await?;
    diesel::delete(user_labels::table.filter(user_labels::user_id.eq(user_id)))
        .execute(conn)
        .await?;
    for role in roles {
        diesel::insert_into(user_roles::table)
            .values((
                user_roles::user_id.eq(user_id),
                user_roles::role.eq(role.as_str()),
            ))
            .execute(conn)
            .await?;
    }
    for label_id in label_ids {
        diesel::insert_into(user_labels::table)
            .values((
                user_labels::user_id.eq(user_id),
                user_labels::label_id.eq(*label_id),
            ))
            .execute(conn)
            .await?;
    }
    Ok(())
}

/// Link an unclaimed colleague with the same e-mail address to `user_id`.
pub(super) async fn claim_colleague(
    conn: &mut SqliteConn,
    user_id: UserId,
    email: &str,
) -> QueryResult<()> {
    let unclaimed: Option<i32> = colleagues::table
        .filter(colleagues::user_id.is_null())
        .filter(colleagues::email.eq(email))
        .select(colleagues::id)
        .order(colleagues::id.asc())
        .first(conn)
        .await
        .optional()?;
    if let Some(colleague_id) = unclaimed {
        diesel::update(colleagues::table.find(colleague_id))
            .set(colleagues::user_id.eq(user_id))
            .execute(conn)
            .await?;
    }
    Ok(())
}

async fn hydrate(
    conn: &mut SqliteConn,
    rows: Vec<UserRow>,
) -> Result<Vec<User>, UserRepositoryError> {
    let ids: Vec<UserId> = rows.iter().map(|row| row.id).collect();
    let role_rows: Vec<(UserId, String)> = user_roles::table
        .filter(user_roles::user_id.eq_any(ids.clone()))
        .select((user_roles::user_id, user_roles::role))
        .load(conn)
        .await
        .map_err(|err| map_diesel_error(err, "load user roles"))?;
    let label_rows: Vec<(UserId, LabelId)> = user_labels::table
        .filter(user_labels::user_id.eq_any(ids.clone()))
        .select((user_labels::user_id, user_labels::label_id))
        .load(conn)
        .await
        .map_err(|err| map_diesel_error(err, "load user labels"))?;
    let colleague_rows: Vec<(i32, Option<UserId>)> = colleagues::table
        .filter(colleagues::user_id.eq_any(ids))
        .select((colleagues::id, colleagues::user_id))
        .load(conn)
        .await
        .map_err(|err| map_diesel_error(err, "load user colleagues"))?;

    let mut roles: HashMap<UserId, BTreeSet<Role>> = HashMap::new();
    for (user_id, raw) in role_rows {
        let role: Role = raw
            .parse()
            .map_err(|err: crate::domain::UnknownVariant| UserRepositoryError::query(err.to_string()))?;
        roles.entry(user_id).or_default().insert(role);
    }
    let mut labels: HashMap<UserId, BTreeSet<LabelId>> = HashMap::new();
    for (user_id, label_id) in label_rows {
        labels.entry(user_id).or_default().insert(label_id);
    }
    let colleague_of: HashMap<UserId, i32> = colleague_rows
        .into_iter()
        .filter_map(|(colleague_id, user_id)| user_id.map(|id| (id, colleague_id)))
        .collect();

    Ok(rows
        .into_iter()
        .map(|row| User {
            roles: roles.remove(&row.id).unwrap_or_default(),
            label_ids: labels.remove(&row.id).unwrap_or_default(),
            colleague_id: colleague_of.get(&row.id).copied(),
            id: row.id,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            is_superuser: row.is_superuser,
        })
        .collect())
}

async fn find_one(
    conn: &mut SqliteConn,
    row: Option<UserRow>,
) -> Result<Option<User>, UserRepositoryError> {
    match row {
        Some(found) => Ok(hydrate(conn, vec![found]).await?.into_iter().next()),
        None => Ok(None),
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn list(&self) -> Result<Vec<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<UserRow> = users::table
            .select(UserRow::as_select())
            .order((users::first_name.asc(), users::last_name.asc(), users::id.asc()))
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "list users"))?;
        hydrate(&mut conn, rows).await
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .find(id)
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "find user"))?;
        find_one(&mut conn, row).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        // The column collates without case.
        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "find user by email"))?;
        find_one(&mut conn, row).await
    }

    async fn create(
        &self,
        draft: &UserDraft,
        is_superuser: bool,
    ) -> Result<User, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: UserRow = conn
            .transaction(|conn| {
                async move {
                    let row: UserRow = diesel::insert_into(users::table)
                        .values((
                            UserValues {
                                email: &draft.email,
                                first_name: &draft.first_name,
                                last_name: &draft.last_name,
                            },
                            users::is_superuser.eq(is_superuser),
                        ))
                        .returning(UserRow::as_returning())
                        .get_result(conn)
                        .await?;
                    write_memberships(conn, row.id, &draft.roles, &draft.label_ids).await?;
                    claim_colleague(conn, row.id, &draft.email).await?;
                    Ok::<_, diesel::result::Error>(row)
                }
                .scope_boxed()
            })
            .await
            .map_err(|err| map_diesel_error(err, "create user"))?;
        find_one(&mut conn, Some(row))
            .await?
            .ok_or_else(|| UserRepositoryError::query("created user vanished"))
    }

    async fn update(
        &self,
        id: UserId,
        draft: &UserDraft,
    ) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = conn
            .transaction(|conn| {
                async move {
                    let updated: Option<UserRow> = diesel::update(users::table.find(id))
                        .set(UserValues {
                            email: &draft.email,
                            first_name: &draft.first_name,
                            last_name: &draft.last_name,
                        })
                        .returning(UserRow::as_returning())
                        .get_result(conn)
                        .await
                        .optional()?;
                    if updated.is_some() {
                        write_memberships(conn, id, &draft.roles, &draft.label_ids).await?;
                    }
                    Ok::<_, diesel::result::Error>(updated)
                }
                .scope_boxed()
            })
            .await
            .map_err(|err| map_diesel_error(err, "update user"))?;
        find_one(&mut conn, row).await
    }

    async fn delete(&self, id: UserId) -> Result<bool, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(users::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "delete user"))?;
        Ok(deleted > 0)
    }
}
