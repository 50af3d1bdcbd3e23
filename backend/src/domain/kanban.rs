//! Kanban board: assignments in one column per status.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{
    AssignmentAggregate, AssignmentId, AssignmentStatus, ColleagueSummary, Error, Phase, User,
    weeks_remaining,
};

/// Assignment as shown on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct KanbanCard {
    /// Assignment id.
    pub id: AssignmentId,
    /// Assignment name.
    pub name: String,
    /// Name of the primary organisation.
    pub primary_organization: Option<String>,
    /// Responsible colleague.
    pub owner: Option<ColleagueSummary>,
    /// Phase relative to today.
    pub phase: Option<Phase>,
    /// Weeks until the end date.
    pub weeks_remaining: Option<i64>,
    /// Number of services.
    pub service_count: usize,
    /// Number of placements.
    pub placement_count: usize,
    /// Services nobody is placed on.
    pub open_service_count: usize,
}

/// One status column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct KanbanColumn {
    /// Status of every card in the column.
    pub status: AssignmentStatus,
    /// Cards ordered by name.
    pub cards: Vec<KanbanCard>,
}

/// Body of a board move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, utoipa::ToSchema)]
pub struct MoveCard {
    /// Target column.
    pub status: AssignmentStatus,
}

impl KanbanCard {
    /// Card for `aggregate` on `today`.
    #[must_use]
    pub fn new(aggregate: &AssignmentAggregate, today: NaiveDate) -> Self {
        let period = aggregate.assignment.period();
        Self {
            id: aggregate.assignment.id,
            name: aggregate.assignment.name.clone(),
            primary_organization: aggregate.primary_organization().map(|org| org.name.clone()),
            owner: aggregate.owner.clone(),
            phase: period.phase(today),
            weeks_remaining: weeks_remaining(period.end, today),
            service_count: aggregate.services.len(),
            placement_count: aggregate.placement_count(),
            open_service_count: aggregate.open_service_count(),
        }
    }
}

/// Columns in status order, each holding its cards.
#[must_use]
pub fn board(aggregates: &[AssignmentAggregate], today: NaiveDate) -> Vec<KanbanColumn> {
    AssignmentStatus::ALL
        .into_iter()
        .map(|status| {
            let mut cards: Vec<KanbanCard> = aggregates
                .iter()
                .filter(|aggregate| aggregate.assignment.status == status)
                .map(|aggregate| KanbanCard::new(aggregate, today))
                .collect();
            cards.sort_by(|a, b| {
                a.name
                    .to_lowercase()
                    .cmp(&b.name.to_lowercase())
                    .then(a.id.cmp(&b.id))
            });
            KanbanColumn { status, cards }
        })
        .collect()
}

/// Check that `user` may move `aggregate` to another column.
///
/// # Errors
/// Returns [`Error::forbidden`] when the user may not edit the assignment.
pub fn authorize_move(aggregate: &AssignmentAggregate, user: &User) -> Result<(), Error> {
    if aggregate.editable_by(user) {
        Ok(())
    } else {
        Err(Error::forbidden("not allowed to edit this assignment"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::assignment_view::fixtures::{aggregate, assignment, d};
    use crate::domain::{ErrorCode, Role};
    use rstest::rstest;
    use std::collections::BTreeSet;

    #[rstest]
    fn columns_follow_status_order() {
        let aggregates = [
            aggregate(assignment(1, "b", AssignmentStatus::Ingevuld), Vec::new()),
            aggregate(assignment(2, "A", AssignmentStatus::Ingevuld), Vec::new()),
            aggregate(assignment(3, "c", AssignmentStatus::Lead), Vec::new()),
        ];
        let columns = board(&aggregates, d(6, 1));
        let statuses: Vec<_> = columns.iter().map(|column| column.status).collect();
        assert_eq!(statuses, AssignmentStatus::ALL);
        let filled: Vec<_> = columns
            .get(2)
            .map(|column| column.cards.iter().map(|card| card.id).collect())
            .unwrap_or_default();
        assert_eq!(filled, [2, 1]);
        assert!(columns.get(1).is_some_and(|column| column.cards.is_empty()));
    }

    #[rstest]
    fn only_editors_may_move_cards() {
        let mut agg = aggregate(assignment(1, "a", AssignmentStatus::Lead), Vec::new());
        agg.assignment.owner_id = Some(7);
        let mut user = User {
            id: 1,
            email: "a@b.nl".to_owned(),
            first_name: "A".to_owned(),
            last_name: "B".to_owned(),
            is_superuser: false,
            roles: BTreeSet::from([Role::Consultant]),
            label_ids: BTreeSet::new(),
            colleague_id: Some(8),
        };
        let err = authorize_move(&agg, &user).expect_err("not the owner");
        assert_eq!(err.code(), ErrorCode::Forbidden);
        user.colleague_id = Some(7);
        assert!(authorize_move(&agg, &user).is_ok());
    }
}
