//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, equipment, health, requests, stages, teams, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "GMAO API",
        version = "1.0.0",
        description = "Equipment Maintenance Management REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html"),
        contact(name = "GMAO Team", email = "contact@elidune.org")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::me,
        // Requests
        requests::list_requests,
        requests::get_request,
        requests::create_request,
        requests::change_stage,
        requests::assign_technician,
        requests::complete_request,
        requests::scrap_request,
        requests::delete_request,
        requests::request_activity,
        // Stages
        stages::list_stages,
        stages::create_stage,
        // Teams
        teams::list_teams,
        teams::get_team,
        teams::create_team,
        teams::add_team_member,
        teams::remove_team_member,
        // Equipment
        equipment::list_equipment,
        equipment::get_equipment,
        equipment::create_equipment,
        equipment::update_equipment,
        equipment::delete_equipment,
        equipment::list_categories,
        equipment::create_category,
        // Users
        users::list_users,
        users::get_user,
        users::create_user,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            auth::UserInfo,
            // Requests
            crate::models::request::MaintenanceRequest,
            crate::models::request::RequestView,
            crate::models::request::CreateRequest,
            crate::models::request::RequestQuery,
            crate::models::request::ChangeStage,
            crate::models::request::AssignTechnician,
            crate::models::request::CompleteRequest,
            crate::models::request::ScrapRequest,
            crate::models::enums::RequestType,
            crate::models::enums::RequestState,
            crate::models::activity::ActivityRecord,
            crate::models::activity::StageChangeEvent,
            // Stages
            crate::models::stage::MaintenanceStage,
            crate::models::stage::CreateStage,
            // Teams
            crate::models::team::MaintenanceTeam,
            crate::models::team::TeamDetails,
            crate::models::team::CreateTeam,
            crate::models::team::AddTeamMember,
            // Equipment
            crate::models::equipment::Equipment,
            crate::models::equipment::CreateEquipment,
            crate::models::equipment::UpdateEquipment,
            crate::models::equipment::EquipmentCategory,
            crate::models::equipment::CreateCategory,
            // Users
            crate::models::user::User,
            crate::models::user::UserShort,
            crate::models::user::UserQuery,
            crate::models::user::CreateUser,
            crate::models::user::Role,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "requests", description = "Maintenance request lifecycle"),
        (name = "stages", description = "Workflow stage configuration"),
        (name = "teams", description = "Maintenance team management"),
        (name = "equipment", description = "Equipment and categories"),
        (name = "users", description = "User management")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
