use super::common::{map_service_error, require, success_response, validate_input};
use crate::{
    commands::purchaseorders::DecidePurchaseOrderCommand,
    errors::ApiError,
    handlers::AppState,
    models::purchase_order::ApprovalDecision,
    services::approval_policy::ApproverRole,
    services::procurement::{PendingApprovalsSummary, PendingPurchaseOrder},
};
use axum::{
    extract::{Path, Query, State},
    routing::{get, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::info;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

// Request and response DTOs

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DecidePurchaseOrderRequest {
    pub po_id: Option<Uuid>,
    /// "approve" or "reject"
    pub action: Option<String>,
    pub user_id: Option<Uuid>,
    pub user_role: Option<String>,
    #[validate(length(max = 1000))]
    pub comments: Option<String>,
    pub organization_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrderDecisionResponse {
    pub id: Uuid,
    pub po_number: String,
    pub status: String,
    pub total_amount: Decimal,
    pub action_performed_by: Uuid,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PendingApprovalsParams {
    pub organization_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub user_role: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PendingApprovalsResponse {
    pub data: Vec<PendingPurchaseOrder>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<PendingApprovalsSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct OrganizationScope {
    pub organization_id: Option<Uuid>,
}

// Handler functions

/// Approve or reject a pending purchase order
#[utoipa::path(
    put,
    path = "/api/v1/purchase-orders/approve",
    request_body = DecidePurchaseOrderRequest,
    responses(
        (status = 200, description = "Decision applied", body = crate::ApiResponse<PurchaseOrderDecisionResponse>),
        (status = 400, description = "Invalid request or purchase order not pending approval", body = crate::errors::ErrorResponse),
        (status = 403, description = "User is not authorized for the order's tier", body = crate::errors::ErrorResponse),
        (status = 404, description = "Purchase order or workflow configuration not found", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn decide_purchase_order(
    State(state): State<AppState>,
    Json(payload): Json<DecidePurchaseOrderRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let po_id = require(payload.po_id, "poId")?;
    let action = require(payload.action, "action")?;
    let user_id = require(payload.user_id, "userId")?;
    let organization_id = require(payload.organization_id, "organizationId")?;

    let decision = ApprovalDecision::from_str(&action).map_err(|_| {
        ApiError::ValidationError(format!(
            "Invalid action '{}': must be one of approve, reject",
            action
        ))
    })?;

    // Unknown roles are not an error; they simply never match a fallback
    let approver_role = payload
        .user_role
        .as_deref()
        .and_then(|r| ApproverRole::from_str(r).ok());

    let command = DecidePurchaseOrderCommand {
        purchase_order_id: po_id,
        organization_id,
        decision,
        decided_by: user_id,
        approver_role,
        comments: payload.comments,
    };

    let result = state
        .services
        .procurement
        .decide_purchase_order(command)
        .await
        .map_err(map_service_error)?;

    info!(
        "Purchase order {}: {} by {}",
        result.status, result.id, user_id
    );

    let message = format!("Purchase order {} successfully", decision.past_tense());

    Ok(success_response(crate::ApiResponse::with_message(
        PurchaseOrderDecisionResponse {
            id: result.id,
            po_number: result.po_number,
            status: result.status,
            total_amount: result.total_amount,
            action_performed_by: result.decided_by,
            timestamp: result.decided_at,
        },
        message,
    )))
}

/// List purchase orders awaiting the user's approval
#[utoipa::path(
    get,
    path = "/api/v1/purchase-orders/pending",
    params(PendingApprovalsParams),
    responses(
        (status = 200, description = "Pending purchase orders for the user", body = PendingApprovalsResponse),
        (status = 400, description = "Missing organizationId or userId", body = crate::errors::ErrorResponse),
        (status = 404, description = "No workflow configuration for the organization", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn list_pending_approvals(
    State(state): State<AppState>,
    Query(params): Query<PendingApprovalsParams>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let organization_id = require(params.organization_id, "organizationId")?;
    let user_id = require(params.user_id, "userId")?;
    let role = params
        .user_role
        .as_deref()
        .and_then(|r| ApproverRole::from_str(r).ok());

    let pending = state
        .services
        .procurement
        .pending_approvals(organization_id, user_id, role)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(PendingApprovalsResponse {
        data: pending.orders,
        summary: pending.summary,
        message: pending.message,
    }))
}

/// Get a purchase order by ID
#[utoipa::path(
    get,
    path = "/api/v1/purchase-orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Purchase order ID"),
        OrganizationScope
    ),
    responses(
        (status = 200, description = "Purchase order fetched", body = crate::ApiResponse<serde_json::Value>),
        (status = 404, description = "Purchase order not found", body = crate::errors::ErrorResponse)
    ),
    tag = "purchase-orders"
)]
pub async fn get_purchase_order(
    State(state): State<AppState>,
    Path(po_id): Path<Uuid>,
    Query(scope): Query<OrganizationScope>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let organization_id = require(scope.organization_id, "organizationId")?;

    let po = state
        .services
        .procurement
        .get_purchase_order(organization_id, po_id)
        .await
        .map_err(map_service_error)?
        .ok_or_else(|| ApiError::NotFound(format!("Purchase order {} not found", po_id)))?;

    Ok(success_response(crate::ApiResponse::success(po)))
}

/// Creates the router for purchase order endpoints
pub fn purchase_order_routes() -> Router<AppState> {
    Router::new()
        .route("/approve", put(decide_purchase_order))
        .route("/pending", get(list_pending_approvals))
        .route("/:id", get(get_purchase_order))
}
