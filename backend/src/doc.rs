//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every `/api/v1` handler plus the health checks. Schemas
//! referenced from the handler attributes are collected automatically; the
//! shared envelope and enums are listed explicitly so they are present even
//! when no path names them directly.
//!
//! The document backs Swagger UI in debug builds and the `openapi-dump`
//! binary.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{
    AssignmentStatus, DomainError, ErrorCode, OrganizationType, Permission, Role, Source,
};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Wies API",
        description = "Staffing overview of assignments, placements and colleagues."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::auth::me,
        crate::inbound::http::assignments::list_assignments,
        crate::inbound::http::assignments::create_assignment,
        crate::inbound::http::assignments::board,
        crate::inbound::http::assignments::get_assignment,
        crate::inbound::http::assignments::delete_assignment,
        crate::inbound::http::assignments::edit_attribute,
        crate::inbound::http::assignments::move_assignment,
        crate::inbound::http::assignments::create_service,
        crate::inbound::http::assignments::get_service,
        crate::inbound::http::assignments::update_service,
        crate::inbound::http::assignments::delete_service,
        crate::inbound::http::placements::list_placements,
        crate::inbound::http::placements::create_placement,
        crate::inbound::http::placements::import_placements,
        crate::inbound::http::placements::get_placement,
        crate::inbound::http::placements::update_placement,
        crate::inbound::http::placements::delete_placement,
        crate::inbound::http::colleagues::list_colleagues,
        crate::inbound::http::colleagues::create_colleague,
        crate::inbound::http::colleagues::get_colleague,
        crate::inbound::http::colleagues::update_colleague,
        crate::inbound::http::colleagues::delete_colleague,
        crate::inbound::http::catalogue::list_skills,
        crate::inbound::http::catalogue::create_skill,
        crate::inbound::http::catalogue::delete_skill,
        crate::inbound::http::catalogue::list_ministries,
        crate::inbound::http::catalogue::get_ministry,
        crate::inbound::http::organizations::list_organizations,
        crate::inbound::http::organizations::create_organization,
        crate::inbound::http::organizations::update_organization,
        crate::inbound::http::organizations::delete_organization,
        crate::inbound::http::organizations::tree,
        crate::inbound::http::organizations::tree_search,
        crate::inbound::http::organizations::tree_category,
        crate::inbound::http::organizations::tree_children,
        crate::inbound::http::labels::list_categories,
        crate::inbound::http::labels::create_category,
        crate::inbound::http::labels::update_category,
        crate::inbound::http::labels::delete_category,
        crate::inbound::http::labels::create_label,
        crate::inbound::http::labels::update_label,
        crate::inbound::http::labels::delete_label,
        crate::inbound::http::filters::list_filters,
        crate::inbound::http::filters::move_filter,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::create_user,
        crate::inbound::http::users::import_users,
        crate::inbound::http::users::update_user,
        crate::inbound::http::users::delete_user,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        DomainError,
        ErrorCode,
        AssignmentStatus,
        OrganizationType,
        Permission,
        Role,
        Source
    )),
    tags(
        (name = "auth", description = "Session login and the signed-in user"),
        (name = "assignments", description = "Assignments, their services and the kanban board"),
        (name = "placements", description = "Placement overview, CRUD and CSV import"),
        (name = "colleagues", description = "Colleagues and their placements"),
        (name = "catalogue", description = "Skills and ministries"),
        (name = "organizations", description = "Government organisations and their hierarchy"),
        (name = "labels", description = "Label categories and labels"),
        (name = "filters", description = "Order of the placement filters"),
        (name = "users", description = "User administration"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying the generated document.

    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[test]
    fn error_envelope_has_code_and_message() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error_schema = schemas.get("DomainError").expect("DomainError schema");

        assert_object_schema_has_field(error_schema, "code");
        assert_object_schema_has_field(error_schema, "message");
    }

    #[rstest]
    #[case("/api/v1/login")]
    #[case("/api/v1/assignments/board")]
    #[case("/api/v1/placements/import")]
    #[case("/api/v1/organizations/tree/{id}")]
    #[case("/api/v1/filters/{position}/{direction}")]
    #[case("/api/v1/users/import")]
    #[case("/health/ready")]
    fn documents_route(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }

    #[test]
    fn session_cookie_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("SessionCookie"));
    }
}
