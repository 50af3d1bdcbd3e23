//! Shared doubles for service unit tests.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use mockable::Clock;

use super::{ColleagueId, Role, User};

struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

/// Clock fixed at noon UTC on 1 June 2026.
pub(crate) fn fixture_clock() -> Arc<dyn Clock> {
    Arc::new(FixtureClock {
        utc_now: Utc
            .with_ymd_and_hms(2026, 6, 1, 12, 0, 0)
            .single()
            .expect("valid fixture timestamp"),
    })
}

/// The date [`fixture_clock`] reports.
pub(crate) fn fixture_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 6, 1).expect("valid date")
}

/// Non-superuser with `roles`, optionally linked to a colleague.
pub(crate) fn member(roles: &[Role], colleague_id: Option<ColleagueId>) -> User {
    User {
        id: 1,
        email: "jan@rijksoverheid.nl".to_owned(),
        first_name: "Jan".to_owned(),
        last_name: "Jansen".to_owned(),
        is_superuser: false,
        roles: roles.iter().copied().collect(),
        label_ids: BTreeSet::new(),
        colleague_id,
    }
}

/// Superuser without roles.
pub(crate) fn superuser() -> User {
    User {
        is_superuser: true,
        email: "admin@rijksoverheid.nl".to_owned(),
        ..member(&[], None)
    }
}
