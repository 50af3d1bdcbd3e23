//! Test utilities shared by unit tests (in `src/`) and integration tests
//! (in `tests/`).
//!
//! Every [`TestDatabase`] is a migrated SQLite file in its own temporary
//! directory, so tests never share state.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate, Utc};
use mockable::Clock;
use tempfile::TempDir;

use crate::domain::ports::UserRepository as _;
use crate::domain::{Role, User, UserDraft};
use crate::inbound::http::state::{HttpOptions, HttpState, HttpStatePorts};
use crate::outbound::persistence::{
    DbPool, DieselAssignmentRepository, DieselCatalogueRepository, DieselColleagueRepository,
    DieselConfigRepository, DieselEventRepository, DieselImportRepository, DieselLabelRepository,
    DieselOrganizationRepository, DieselUserRepository, PoolConfig, run_migrations,
};

/// Boxed error for test setup failures.
pub type SetupError = Box<dyn std::error::Error + Send + Sync>;

/// Clock pinned to noon UTC on a fixed date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    /// Clock reporting `date` at noon UTC.
    #[must_use]
    pub fn on(date: NaiveDate) -> Self {
        Self(date.and_hms_opt(12, 0, 0).unwrap_or_default().and_utc())
    }
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Migrated SQLite database removed on drop.
pub struct TestDatabase {
    _dir: TempDir,
    url: String,
    pool: DbPool,
}

impl TestDatabase {
    /// Create and migrate a fresh database.
    ///
    /// # Errors
    /// Fails when the temporary directory, migrations or pool cannot be
    /// created.
    pub async fn new() -> Result<Self, SetupError> {
        let dir = tempfile::tempdir()?;
        let url = dir.path().join("wies.sqlite3").to_string_lossy().into_owned();
        run_migrations(&url).await?;
        let pool = DbPool::new(PoolConfig::new(url.clone()).with_max_size(4)).await?;
        Ok(Self {
            _dir: dir,
            url,
            pool,
        })
    }

    /// Database path usable as a URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Pool over the database.
    #[must_use]
    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }

    /// Every Diesel adapter over this database.
    #[must_use]
    pub fn ports(&self, clock: Arc<dyn Clock>) -> HttpStatePorts {
        let pool = self.pool();
        HttpStatePorts {
            users: Arc::new(DieselUserRepository::new(pool.clone())),
            events: Arc::new(DieselEventRepository::new(pool.clone())),
            assignments: Arc::new(DieselAssignmentRepository::new(pool.clone())),
            colleagues: Arc::new(DieselColleagueRepository::new(pool.clone())),
            catalogue: Arc::new(DieselCatalogueRepository::new(pool.clone())),
            labels: Arc::new(DieselLabelRepository::new(pool.clone())),
            organizations: Arc::new(DieselOrganizationRepository::new(pool.clone())),
            config: Arc::new(DieselConfigRepository::new(pool.clone())),
            imports: Arc::new(DieselImportRepository::new(pool)),
            clock,
        }
    }

    /// HTTP state wired to this database with the clock on 1 June 2026 and
    /// the development login enabled.
    #[must_use]
    pub fn state(&self) -> HttpState {
        let today = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap_or_default();
        HttpState::new(
            self.ports(Arc::new(FixedClock::on(today))),
            HttpOptions {
                dev_login: true,
                ..HttpOptions::default()
            },
        )
    }

    /// Store a user directly, bypassing permission checks.
    ///
    /// # Errors
    /// Propagates repository failures.
    pub async fn seed_user(
        &self,
        email: &str,
        roles: &[Role],
        is_superuser: bool,
    ) -> Result<User, SetupError> {
        let draft = UserDraft {
            first_name: "Test".to_owned(),
            last_name: email.split('@').next().unwrap_or(email).to_owned(),
            email: email.to_owned(),
            label_ids: BTreeSet::new(),
            roles: roles.iter().copied().collect(),
        };
        let user = DieselUserRepository::new(self.pool())
            .create(&draft, is_superuser)
            .await?;
        Ok(user)
    }
}
