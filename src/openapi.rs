use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Workshop API",
        version = "1.0.0",
        description = r#"
Backend for an auto repair workshop: clients, parts inventory, and service
orders with labor and parts line items.

Totals are computed server-side. Each labor line is `hours * rate`, each part
line is `quantity * unit_price`, every aggregate is rounded to two decimals,
and the order total is `labor + parts + additional_fees - discount`. Creating
or updating an order deducts the referenced parts from inventory in the same
transaction.

Authenticate via `POST /auth/login` and pass the returned token:

```
Authorization: Bearer <token>
```
        "#
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "auth", description = "Login and token issuance"),
        (name = "clients", description = "Client registry"),
        (name = "inventory", description = "Parts inventory"),
        (name = "orders", description = "Service orders"),
        (name = "dashboard", description = "Aggregate counters"),
        (name = "health", description = "Health checks")
    ),
    paths(
        crate::auth::login_handler,

        crate::handlers::health::health_check,
        crate::handlers::dashboard::get_dashboard,

        crate::handlers::clients::list_clients,
        crate::handlers::clients::get_client,
        crate::handlers::clients::create_client,
        crate::handlers::clients::update_client,
        crate::handlers::clients::delete_client,

        crate::handlers::inventory::list_items,
        crate::handlers::inventory::list_low_stock,
        crate::handlers::inventory::get_item,
        crate::handlers::inventory::create_item,
        crate::handlers::inventory::update_item,
        crate::handlers::inventory::delete_item,

        crate::handlers::orders::list_orders,
        crate::handlers::orders::get_order,
        crate::handlers::orders::create_order,
        crate::handlers::orders::update_order,
        crate::handlers::orders::update_order_status,
        crate::handlers::orders::delete_order,
    ),
    components(
        schemas(
            crate::auth::LoginCredentials,
            crate::auth::LoginResponse,
            crate::auth::UserInfo,

            crate::services::clients::ClientRequest,
            crate::services::inventory::InventoryItemRequest,
            crate::services::orders::OrderRequest,
            crate::services::orders::StatusPatchRequest,
            crate::services::orders::OrderResponse,
            crate::services::orders::LaborLineResponse,
            crate::services::orders::PartLineResponse,

            crate::pricing::LaborInput,
            crate::pricing::PartInput,
            crate::pricing::OrderSummary,

            crate::handlers::health::HealthResponse,
            crate::handlers::dashboard::DashboardResponse,

            crate::errors::ErrorResponse
        )
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}
