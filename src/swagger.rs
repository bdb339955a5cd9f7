use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{
    PassStatus, PassValidationStatus, ProgramStatus, QrCodeStatus, ValidationMethod,
};
use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health,
        handlers::user::get_me,
        handlers::program::create_program,
        handlers::program::list_programs,
        handlers::program::get_program,
        handlers::program::update_program,
        handlers::program::delete_program,
        handlers::pass_type::purchase_pass,
        handlers::published_program::list_published_programs,
        handlers::published_program::get_published_program,
        handlers::pass::list_passes,
        handlers::pass::get_pass,
        handlers::pass::get_qr_code,
        handlers::pass::cancel_pass,
        handlers::pass_validation::validate_pass,
        handlers::pass_validation::list_validations,
    ),
    components(
        schemas(
            ProgramStatus,
            PassStatus,
            QrCodeStatus,
            PassValidationStatus,
            ValidationMethod,
            Role,
            UserResponse,
            PageQuery,
            CreatePassTypeRequest,
            UpdatePassTypeRequest,
            PassTypeResponse,
            PublishedPassTypeResponse,
            CreateProgramRequest,
            UpdateProgramRequest,
            ProgramResponse,
            ProgramDetailResponse,
            PublishedProgramResponse,
            PublishedProgramDetailResponse,
            PublishedProgramQuery,
            PassResponse,
            PurchasePassResponse,
            QrCodeResponse,
            ValidatePassRequest,
            PassValidationResponse,
            ApiError,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check"),
        (name = "user", description = "Current user API"),
        (name = "program", description = "Program management API (organizers)"),
        (name = "published_program", description = "Public program catalogue"),
        (name = "pass", description = "Pass purchase and management API"),
        (name = "pass_validation", description = "Door validation API (staff)"),
    ),
    info(
        title = "Passgate Backend API",
        version = "0.1.0",
        description = "Program ticketing and door validation REST API"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
