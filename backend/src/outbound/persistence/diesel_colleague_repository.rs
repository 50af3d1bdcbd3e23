//! SQLite-backed colleague adapter.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, RunQueryDsl};

use crate::domain::ports::{ColleagueRepository, ColleagueRepositoryError};
use crate::domain::{Colleague, ColleagueDraft, ColleagueId, LabelId, SkillId, Source};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{ColleagueRow, NewColleagueRow};
use super::pool::{DbPool, SqliteConn};
use super::schema::{colleague_labels, colleague_skills, colleagues, users};

/// Diesel-backed implementation of the colleague repository.
#[derive(Clone)]
pub struct DieselColleagueRepository {
    pool: DbPool,
}

impl DieselColleagueRepository {
    /// Create a new repository with the given connection pool.
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Skill and label ids per colleague.
pub(super) async fn colleague_tags(
    conn: &mut SqliteConn,
    ids: Vec<ColleagueId>,
) -> QueryResult<(
    HashMap<ColleagueId, BTreeSet<SkillId>>,
    HashMap<ColleagueId, BTreeSet<LabelId>>,
)> {
    let skill_rows: Vec<(ColleagueId, SkillId)> = colleague_skills::table
        .filter(colleague_skills::colleague_id.eq_any(ids.clone()))
        .select((colleague_skills::colleague_id, colleague_skills::skill_id))
        .load(conn)
        .await?;
    let label_rows: Vec<(ColleagueId, LabelId)> = colleague_labels::table
        .filter(colleague_labels::colleague_id.eq_any(ids))
        .select((colleague_labels::colleague_id, colleague_labels::label_id))
        .load(conn)
        .await?;
    let mut skills: HashMap<ColleagueId, BTreeSet<SkillId>> = HashMap::new();
    for (colleague_id, skill_id) in skill_rows {
        skills.entry(colleague_id).or_default().insert(skill_id);
    }
    let mut labels: HashMap<ColleagueId, BTreeSet<LabelId>> = HashMap::new();
    for (colleague_id, label_id) in label_rows {
        labels.entry(colleague_id).or_default().insert(label_id);
    }
    Ok((skills, labels))
}

/// Replace the skill and label rows of a colleague.
pub(super) async fn write_tags(
    conn: &mut SqliteConn,
    colleague_id: ColleagueId,
    skill_ids: &BTreeSet<SkillId>,
    label_ids: &BTreeSet<LabelId>,
) -> QueryResult<()> {
    diesel::delete(colleague_skills::table.filter(colleague_skills::colleague_id.eq(colleague_id)))
        .execute(conn)
        .await?;
    diesel::delete(colleague_labels::table.filter(colleague_labels::colleague_id.eq(colleague_id)))
        .execute(conn)
        .await?;
    for skill_id in skill_ids {
        diesel::insert_into(colleague_skills::table)
            .values((
                colleague_skills::colleague_id.eq(colleague_id),
                colleague_skills::skill_id.eq(*skill_id),
            ))
            .execute(conn)
            .await?;
    }
    for label_id in label_ids {
        diesel::insert_into(colleague_labels::table)
            .values((
                colleague_labels::colleague_id.eq(colleague_id),
                colleague_labels::label_id.eq(*label_id),
            ))
            .execute(conn)
            .await?;
    }
    Ok(())
}

/// Id of a user registered with `email`, used to link new colleagues.
pub(super) async fn user_with_email(
    conn: &mut SqliteConn,
    email: &str,
) -> QueryResult<Option<i32>> {
    if email.is_empty() {
        return Ok(None);
    }
    users::table
        .filter(users::email.eq(email))
        .select(users::id)
        .first(conn)
        .await
        .optional()
}

async fn hydrate(
    conn: &mut SqliteConn,
    rows: Vec<ColleagueRow>,
) -> Result<Vec<Colleague>, ColleagueRepositoryError> {
    let ids = rows.iter().map(|row| row.id).collect();
    let (mut skills, mut labels) = colleague_tags(conn, ids)
        .await
        .map_err(|err| map_diesel_error(err, "load colleague tags"))?;
    rows.into_iter()
        .map(|row| {
            let id = row.id;
            let mut colleague = row.into_colleague().map_err(ColleagueRepositoryError::query)?;
            colleague.skill_ids = skills.remove(&id).unwrap_or_default();
            colleague.label_ids = labels.remove(&id).unwrap_or_default();
            Ok(colleague)
        })
        .collect()
}

async fn load(
    conn: &mut SqliteConn,
    id: ColleagueId,
) -> Result<Option<Colleague>, ColleagueRepositoryError> {
    let row: Option<ColleagueRow> = colleagues::table
        .find(id)
        .select(ColleagueRow::as_select())
        .first(conn)
        .await
        .optional()
        .map_err(|err| map_diesel_error(err, "find colleague"))?;
    match row {
        Some(found) => Ok(hydrate(conn, vec![found]).await?.into_iter().next()),
        None => Ok(None),
    }
}

#[async_trait]
impl ColleagueRepository for DieselColleagueRepository {
    async fn list(&self) -> Result<Vec<Colleague>, ColleagueRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ColleagueRow> = colleagues::table
            .select(ColleagueRow::as_select())
            .order(colleagues::id.asc())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "list colleagues"))?;
        hydrate(&mut conn, rows).await
    }

    async fn find(&self, id: ColleagueId) -> Result<Option<Colleague>, ColleagueRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        load(&mut conn, id).await
    }

    async fn create(&self, draft: &ColleagueDraft) -> Result<Colleague, ColleagueRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let id: ColleagueId = conn
            .transaction(|conn| {
                async move {
                    let user_id = user_with_email(conn, &draft.email).await?;
                    let id: ColleagueId = diesel::insert_into(colleagues::table)
                        .values(NewColleagueRow {
                            user_id,
                            name: &draft.name,
                            email: &draft.email,
                            source: Source::Wies.as_str(),
                            source_id: "",
                            source_url: "",
                        })
                        .returning(colleagues::id)
                        .get_result(conn)
                        .await?;
                    write_tags(conn, id, &draft.skill_ids, &draft.label_ids).await?;
                    Ok::<_, diesel::result::Error>(id)
                }
                .scope_boxed()
            })
            .await
            .map_err(|err| map_diesel_error(err, "create colleague"))?;
        load(&mut conn, id)
            .await?
            .ok_or_else(|| ColleagueRepositoryError::query("created colleague vanished"))
    }

    async fn update(
        &self,
        id: ColleagueId,
        draft: &ColleagueDraft,
    ) -> Result<Option<Colleague>, ColleagueRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = conn
            .transaction(|conn| {
                async move {
                    let updated = diesel::update(colleagues::table.find(id))
                        .set((
                            colleagues::name.eq(&draft.name),
                            colleagues::email.eq(&draft.email),
                        ))
                        .execute(conn)
                        .await?;
                    if updated > 0 {
                        write_tags(conn, id, &draft.skill_ids, &draft.label_ids).await?;
                    }
                    Ok::<_, diesel::result::Error>(updated > 0)
                }
                .scope_boxed()
            })
            .await
            .map_err(|err| map_diesel_error(err, "update colleague"))?;
        if updated {
            load(&mut conn, id).await
        } else {
            Ok(None)
        }
    }

    async fn delete(&self, id: ColleagueId) -> Result<bool, ColleagueRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(colleagues::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "delete colleague"))?;
        Ok(deleted > 0)
    }
}
