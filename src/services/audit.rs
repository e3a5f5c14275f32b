//! Write-once audit trail for approval decisions.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use tracing::instrument;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::models::purchase_order::{ApprovalDecision, Model as PurchaseOrder};
use crate::models::approval_action;
use crate::services::approval_policy::ApprovalTier;

/// Appends the immutable record of a decision taken on `po`.
///
/// Callers treat failures here as non-fatal: the state transition has already
/// been committed and is never rolled back on a missing trail entry.
#[instrument(skip(db, po), fields(purchase_order_id = %po.id))]
pub async fn record_decision(
    db: &DatabaseConnection,
    po: &PurchaseOrder,
    decision: ApprovalDecision,
    performed_by: Uuid,
    tier: ApprovalTier,
    comments: Option<&str>,
) -> Result<(), ServiceError> {
    let entry = approval_action::ActiveModel {
        id: Set(Uuid::new_v4()),
        purchase_order_id: Set(po.id),
        action: Set(decision.to_string()),
        performed_by: Set(performed_by),
        approval_tier: Set(tier.level()),
        po_number: Set(po.po_number.clone()),
        total_amount: Set(po.total_amount),
        comments: Set(comments.map(str::to_string)),
        created_at: Set(Utc::now()),
    };

    entry.insert(db).await.map_err(ServiceError::DatabaseError)?;

    Ok(())
}
