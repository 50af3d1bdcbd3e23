//! Domain primitives, aggregates and use cases.
//!
//! Purpose: Define strongly typed staffing entities (assignments, services,
//! placements, colleagues, organisations) and the services that operate on
//! them. Persistence is reached only through the traits in [`ports`];
//! adapters live in `outbound` and HTTP handlers in `inbound`.
//!
//! Public surface:
//! - Error (alias to `error::Error`): API error response payload.
//! - ErrorCode (alias to `error::ErrorCode`): stable error identifier.
//! - Entities, drafts and views re-exported from their modules.
//! - Services (`*Service`) holding `Arc<dyn Port>` dependencies.

mod assignment;
mod assignment_service;
mod assignment_view;
mod catalogue;
mod catalogue_service;
mod colleague;
mod colleague_service;
mod cost;
mod csv_import;
pub mod error;
mod event;
mod filter_order;
mod filter_order_service;
mod import_service;
mod kanban;
mod label;
mod label_service;
pub mod organization;
mod organization_service;
mod period;
mod placement;
mod placement_query;
mod placement_service;
pub mod ports;
mod service;
#[cfg(test)]
mod testing;
mod text_enum;
pub mod trace_id;
mod user;
mod user_service;

pub use self::assignment::{
    Assignment, AssignmentDraft, AssignmentEdit, AssignmentId, AssignmentOrganization,
    AssignmentOrganizationRole, AssignmentStatus, EXTRA_INFO_MAX, Source, SourceRef,
};
pub use self::assignment_service::{AssignmentListQuery, AssignmentService};
pub use self::assignment_view::{
    AssignmentAggregate, AssignmentView, LinkedOrganization, PlacementAggregate, PlacementView,
    ServiceAggregate, ServiceView,
};
pub use self::catalogue::{
    Ministry, MinistryId, SKILL_NAME_MAX, Skill, SkillId, ministry_fields, skill_name,
};
pub use self::catalogue_service::{CatalogueService, SkillLookup};
pub use self::colleague::{Colleague, ColleagueDraft, ColleagueId, ColleagueSummary};
pub use self::colleague_service::{ColleagueDetail, ColleagueListQuery, ColleagueService};
pub use self::cost::{
    Cents, CostType, HOURLY_RATE_CENTS, HOURS_PER_WEEK_MAX, assignment_total, per_hour_cost, service_cost,
};
pub use self::csv_import::{
    ContactRow, PLACEMENT_COLUMNS, PlacementImportPlan, PlacementImportReport, PlacementImportRow,
    UserImportPlan, UserImportReport, UserImportRow,
};
pub use self::error::{DomainError, Error, ErrorCode};
pub use self::event::{Event, EventName, NewEvent};
pub use self::filter_order::{
    FILTER_ORDER_KEY, FilterDisplay, FilterItem, FilterOrder, MoveDirection, SimpleFilter,
};
pub use self::filter_order_service::{FilterMove, FilterOrderService};
pub use self::import_service::ImportService;
pub use self::kanban::{KanbanCard, KanbanColumn, MoveCard, authorize_move, board};
pub use self::label::{
    BRAND_CATEGORY, DEFAULT_LABELS, DefaultCategory, Label, LabelCategory, LabelCategoryId,
    LabelCategoryWithLabels, LabelId, label_color, label_name,
};
pub use self::label_service::{LabelCategoryInput, LabelInput, LabelService};
pub use self::organization::sync::{
    OrganizationSyncService, RegistryEntry, SyncOptions, SyncResult,
};
pub use self::organization::{
    CategoryNode, Organization, OrganizationDraft, OrganizationId, OrganizationIndex,
    OrganizationListQuery, OrganizationType, PreviousName, TreeNode, TreeSearchHit,
};
pub use self::organization_service::{OrganizationService, OrganizationUpdate};
pub use self::period::{
    DateRange, Period, Phase, PlacementPeriodSource, ServicePeriodSource, parse_date_dmy,
    resolve_placement_period, resolve_service_period, weeks_remaining,
};
pub use self::placement::{Placement, PlacementDraft, PlacementId};
pub use self::placement_query::{
    ActiveFilter, FilterCatalog, FilterGroup, FilterKind, FilterOption, PAGE_SIZE,
    PeriodWindow, PlacementFilters, PlacementListing, PlacementOrder, PlacementPage, PlacementQuery,
    PlacementQueryContext, PlacementRecord, PlacementSlice,
};
pub use self::placement_service::{PlacementListingSources, PlacementService};
pub use self::service::{Service, ServiceDraft, ServiceId};
pub use self::text_enum::UnknownVariant;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    AllowedEmailDomains, Permission, Role, User, UserDraft, UserId, UserListQuery,
    is_valid_email,
};
pub use self::user_service::{USER_PAGE_SIZE, UserPage, UserProfile, UserService};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use wies::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
