//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{customers, health, lendings, security, things};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Lendstock API",
        version = "0.1.0",
        description = "Inventory Lending Management REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Security
        security::login,
        security::register,
        security::change_password,
        security::grant_admin,
        security::revoke_admin,
        security::delete_credential,
        security::set_password,
        // Things
        things::list_things,
        things::get_thing,
        things::get_things_by_short_name,
        things::create_thing,
        things::update_thing,
        things::delete_thing,
        things::create_shelf,
        things::get_image,
        things::create_image,
        things::delete_image,
        // Customers
        customers::list_customers,
        customers::get_customer,
        customers::get_customer_by_email,
        customers::create_customer,
        customers::update_customer,
        customers::delete_customer,
        // Lendings
        lendings::list_lendings,
        lendings::get_lending,
        lendings::list_overdue,
        lendings::list_overdue_for_customer,
        lendings::list_lendings_filtered,
        lendings::list_lendings_by_thing_short_name,
        lendings::create_lending,
        lendings::update_lending,
    ),
    components(
        schemas(
            // Security
            security::LoginRequest,
            security::LoginResponse,
            security::RegisterRequest,
            security::ChangePasswordRequest,
            security::RoleGrantRequest,
            security::SetPasswordRequest,
            // Things
            crate::models::thing::Thing,
            crate::models::thing::ThingDetails,
            crate::models::thing::Shelf,
            crate::models::thing::CreateThing,
            crate::models::thing::ThingPatch,
            crate::models::thing::CreateShelf,
            crate::models::thing::ImageUpload,
            crate::models::thing::ImageRef,
            things::CreatedResponse,
            // Customers
            crate::models::customer::Customer,
            crate::models::customer::CreateCustomer,
            crate::models::customer::CustomerPatch,
            // Lendings
            crate::models::rental::Rental,
            crate::models::rental::CreateRental,
            crate::models::rental::RentalPatch,
            crate::models::rental::RentalFilter,
            // Health
            health::StatusResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "security", description = "Authentication endpoints"),
        (name = "things", description = "Catalog management"),
        (name = "customers", description = "Customer management"),
        (name = "lendings", description = "Lending management")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
