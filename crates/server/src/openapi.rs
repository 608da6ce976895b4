use utoipa::{IntoParams, OpenApi, ToSchema};
use uuid::Uuid;

use crate::routes;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

/// Query string shared by every paged listing.
#[derive(IntoParams)]
#[into_params(parameter_in = Query)]
#[allow(non_snake_case)]
pub struct ListQueryDoc {
    /// 1-based page, default 1
    pub page: Option<u64>,
    /// 1..=100, default depends on the resource
    pub limit: Option<u64>,
    /// Column from the resource allow-list; unknown values use the default order
    pub sortBy: Option<String>,
    /// `asc` or `desc`
    pub sortOrder: Option<String>,
    /// Case-insensitive substring, at most 100 characters
    pub search: Option<String>,
    pub isActive: Option<bool>,
}

/// `{ "<resource>Ids": [uuid, ...] }`, e.g. `expertIds` or `caseStudyIds`.
#[derive(ToSchema)]
#[allow(non_snake_case)]
pub struct ReorderRequest { pub expertIds: Vec<Uuid> }

#[derive(ToSchema)]
#[allow(non_snake_case)]
pub struct CategoryRequest {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub isActive: Option<bool>,
}

#[derive(ToSchema)]
#[allow(non_snake_case)]
pub struct ContactMessageRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: String,
    pub subject: String,
    /// One of the advertised service lines, or `Other`
    pub serviceInterest: String,
    pub message: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::health,
        routes::categories::list_all,
        routes::categories::get_one,
        routes::categories::create,
        routes::categories::update,
        routes::categories::delete,
        routes::categories::reorder_categories,
        routes::services::list,
        routes::services::get_one,
        routes::services::get_by_slug,
        routes::services::create,
        routes::services::update,
        routes::services::delete,
        routes::services::toggle_status,
        routes::services::experts,
        routes::services::assign_expert,
        routes::services::unassign_expert,
        routes::services::case_studies,
        routes::services::stats,
        routes::services::reorder_services,
        routes::industries::list,
        routes::industries::get_one,
        routes::industries::get_by_slug,
        routes::industries::create,
        routes::industries::update,
        routes::industries::delete,
        routes::industries::toggle_status,
        routes::industries::experts,
        routes::industries::assign_expert,
        routes::industries::unassign_expert,
        routes::industries::case_studies,
        routes::industries::insights,
        routes::industries::stats,
        routes::industries::reorder_industries,
        routes::experts::list,
        routes::experts::get_one,
        routes::experts::create,
        routes::experts::update,
        routes::experts::delete,
        routes::experts::toggle_status,
        routes::experts::reorder_experts,
        routes::leaders::list,
        routes::leaders::departments,
        routes::leaders::get_one,
        routes::leaders::create,
        routes::leaders::update,
        routes::leaders::delete,
        routes::leaders::toggle_status,
        routes::leaders::reorder_leaders,
        routes::case_studies::list,
        routes::case_studies::get_one,
        routes::case_studies::for_industry,
        routes::case_studies::for_service,
        routes::case_studies::by_impact,
        routes::case_studies::featured,
        routes::case_studies::overview,
        routes::case_studies::create,
        routes::case_studies::update,
        routes::case_studies::delete,
        routes::case_studies::toggle_status,
        routes::case_studies::reorder_case_studies,
        routes::insights::list,
        routes::insights::get_one,
        routes::insights::for_industry,
        routes::insights::popular,
        routes::insights::recent,
        routes::insights::record_view,
        routes::insights::create,
        routes::insights::update,
        routes::insights::delete,
        routes::insights::toggle_status,
        routes::insights::reorder_insights,
        routes::partners::list,
        routes::partners::get_one,
        routes::partners::create,
        routes::partners::update,
        routes::partners::delete,
        routes::partners::reorder_partners,
        routes::testimonials::list,
        routes::testimonials::get_one,
        routes::testimonials::submit,
        routes::testimonials::update,
        routes::testimonials::set_approval,
        routes::testimonials::delete,
        routes::testimonials::reorder_testimonials,
        routes::affiliations::list,
        routes::affiliations::get_one,
        routes::affiliations::create,
        routes::affiliations::update,
        routes::affiliations::delete,
        routes::affiliations::reorder_affiliations,
        routes::contact_messages::create,
        routes::contact_messages::list,
        routes::contact_messages::get_one,
        routes::contact_messages::update,
        routes::contact_messages::delete,
        routes::stats::dashboard,
    ),
    components(
        schemas(
            HealthResponse,
            ReorderRequest,
            CategoryRequest,
            ContactMessageRequest,
            routes::AssignExpertRequest,
            routes::testimonials::ApprovalRequest,
        )
    ),
    tags(
        (name = "health"),
        (name = "categories"),
        (name = "services"),
        (name = "industries"),
        (name = "experts"),
        (name = "leaders"),
        (name = "case-studies"),
        (name = "insights"),
        (name = "partners"),
        (name = "testimonials"),
        (name = "affiliations"),
        (name = "contact"),
        (name = "stats")
    )
)]
pub struct ApiDoc;
