use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "ProcureFlow API",
        version = "1.0.0",
        description = r#"
# ProcureFlow Purchase Order Approval API

Tiered approval workflow for purchase orders. Organizations assign an
approver per spend tier; orders above the auto-approval threshold enter
`pending_approval` and are decided exactly once by an authorized user.

## Approval tiers

- Tier 1: explicit approver, or any `manager` when unassigned
- Tier 2: explicit approver, or any `director` when unassigned
- Tier 3: explicit approver, or any `owner` when unassigned

An explicit assignment suppresses the role fallback for that tier.

## Error Handling

Errors are returned as JSON with a plain `error` message and an ISO 8601
timestamp:

```json
{
  "error": "Purchase order 550e8400-e29b-41d4-a716-446655440000 not found",
  "timestamp": "2025-11-03T10:30:00.000Z"
}
```
        "#,
        contact(
            name = "ProcureFlow Support",
            email = "support@procureflow.dev"
        ),
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    paths(
        crate::handlers::purchase_orders::decide_purchase_order,
        crate::handlers::purchase_orders::list_pending_approvals,
        crate::handlers::purchase_orders::get_purchase_order,
    ),
    components(schemas(
        crate::handlers::purchase_orders::DecidePurchaseOrderRequest,
        crate::handlers::purchase_orders::PurchaseOrderDecisionResponse,
        crate::handlers::purchase_orders::PendingApprovalsResponse,
        crate::services::procurement::PendingPurchaseOrder,
        crate::services::procurement::PendingApprovalsSummary,
        crate::services::procurement::SupplierSummary,
        crate::services::procurement::Urgency,
        crate::errors::ErrorResponse,
    )),
    tags(
        (name = "purchase-orders", description = "Purchase order approval endpoints")
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}
