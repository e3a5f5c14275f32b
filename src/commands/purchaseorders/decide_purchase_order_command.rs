use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use prometheus::{register_int_counter_vec, IntCounterVec};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{
    commands::Command,
    db::DbPool,
    errors::ServiceError,
    events::{Event, EventSender},
    models::purchase_order::{self, ApprovalDecision, Entity as PurchaseOrder, PurchaseOrderStatus},
    services::approval_policy::{self, ApprovalTier, ApproverRole},
    services::{audit, workflow_config},
};

lazy_static! {
    static ref PO_DECISIONS: IntCounterVec = register_int_counter_vec!(
        "purchase_order_decisions_total",
        "Total number of purchase order approval decisions",
        &["action"]
    )
    .expect("metric can be created");
    static ref PO_DECISION_FAILURES: IntCounterVec = register_int_counter_vec!(
        "purchase_order_decision_failures_total",
        "Total number of failed purchase order approval decisions",
        &["error_type"]
    )
    .expect("metric can be created");
}

/// Applies an approve/reject decision to a pending purchase order.
///
/// Authorization is re-checked here against the organization's workflow
/// configuration even when the caller already listed the order as pending,
/// so a stale client can never act beyond its tier.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct DecidePurchaseOrderCommand {
    pub purchase_order_id: Uuid,
    pub organization_id: Uuid,
    pub decision: ApprovalDecision,
    pub decided_by: Uuid,
    pub approver_role: Option<ApproverRole>,
    #[validate(length(max = 1000))]
    pub comments: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DecidePurchaseOrderResult {
    pub id: Uuid,
    pub po_number: String,
    pub status: String,
    pub total_amount: Decimal,
    pub decided_by: Uuid,
    pub decided_at: DateTime<Utc>,
}

#[async_trait::async_trait]
impl Command for DecidePurchaseOrderCommand {
    type Result = DecidePurchaseOrderResult;

    #[instrument(skip(self, db_pool, event_sender))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.validate().map_err(|e| {
            PO_DECISION_FAILURES
                .with_label_values(&["validation_error"])
                .inc();
            let msg = format!("Invalid input: {}", e);
            error!("{}", msg);
            ServiceError::ValidationError(msg)
        })?;

        let db = db_pool.as_ref();

        let po = self.load_pending_target(db).await?;
        let tier = self.authorize(db, &po).await?;

        let decided_at = Utc::now();
        let updated_po = self.apply_transition(db, &po, decided_at).await?;

        // The decision is committed at this point; the trail entry and the
        // domain event must not undo it.
        if let Err(e) = audit::record_decision(
            db,
            &updated_po,
            self.decision,
            self.decided_by,
            tier,
            self.comments.as_deref(),
        )
        .await
        {
            PO_DECISION_FAILURES
                .with_label_values(&["audit_error"])
                .inc();
            warn!(
                purchase_order_id = %self.purchase_order_id,
                error = %e,
                "failed to record approval action; decision stands"
            );
        }

        self.log_and_trigger_event(&event_sender).await;

        PO_DECISIONS
            .with_label_values(&[self.decision.to_string().as_str()])
            .inc();

        Ok(DecidePurchaseOrderResult {
            id: updated_po.id,
            po_number: updated_po.po_number,
            status: updated_po.workflow_status.to_string(),
            total_amount: updated_po.total_amount,
            decided_by: self.decided_by,
            decided_at,
        })
    }
}

impl DecidePurchaseOrderCommand {
    /// Loads the target order and verifies it is still decidable.
    ///
    /// An order in another organization reads as not found, never as
    /// forbidden, so callers cannot probe for existence across tenants.
    async fn load_pending_target(
        &self,
        db: &DatabaseConnection,
    ) -> Result<purchase_order::Model, ServiceError> {
        let po = PurchaseOrder::find_by_id(self.purchase_order_id)
            .filter(purchase_order::Column::OrganizationId.eq(self.organization_id))
            .one(db)
            .await
            .map_err(|e| {
                PO_DECISION_FAILURES.with_label_values(&["db_error"]).inc();
                ServiceError::db_error(e)
            })?
            .ok_or_else(|| {
                PO_DECISION_FAILURES
                    .with_label_values(&["not_found"])
                    .inc();
                ServiceError::NotFound(format!(
                    "Purchase order {} not found",
                    self.purchase_order_id
                ))
            })?;

        if po.workflow_status != PurchaseOrderStatus::PendingApproval {
            PO_DECISION_FAILURES
                .with_label_values(&["invalid_status"])
                .inc();
            return Err(self.state_conflict(&po.workflow_status));
        }

        Ok(po)
    }

    /// Resolves the order's tier and checks the actor against the
    /// organization's workflow configuration.
    async fn authorize(
        &self,
        db: &DatabaseConnection,
        po: &purchase_order::Model,
    ) -> Result<ApprovalTier, ServiceError> {
        let config = workflow_config::load_workflow_config(db, self.organization_id)
            .await?
            .ok_or_else(|| {
                PO_DECISION_FAILURES
                    .with_label_values(&["workflow_missing"])
                    .inc();
                ServiceError::NotFound(format!(
                    "No approval workflow configured for organization {}",
                    self.organization_id
                ))
            })?;

        let tier = po
            .approval_tier
            .and_then(ApprovalTier::from_level)
            .unwrap_or(ApprovalTier::First);

        if !approval_policy::authorizes(&config, self.decided_by, self.approver_role, tier) {
            PO_DECISION_FAILURES
                .with_label_values(&["forbidden"])
                .inc();
            return Err(ServiceError::Forbidden(format!(
                "User does not have permission to {} tier {} purchase orders",
                self.decision,
                tier.level()
            )));
        }

        Ok(tier)
    }

    /// Commits the transition with a conditional update keyed on the
    /// expected source state, then re-reads the row.
    ///
    /// The condition closes the window between load and write: a second
    /// concurrent decision matches zero rows and is reported with the same
    /// state-conflict error a stale client would get.
    async fn apply_transition(
        &self,
        db: &DatabaseConnection,
        po: &purchase_order::Model,
        decided_at: DateTime<Utc>,
    ) -> Result<purchase_order::Model, ServiceError> {
        let new_status = self.decision.resulting_status();
        let metadata = merge_decision_metadata(
            &po.procurement_metadata,
            self.decision,
            self.decided_by,
            decided_at,
            self.comments.as_deref(),
        );

        let update = PurchaseOrder::update_many()
            .set(purchase_order::ActiveModel {
                workflow_status: Set(new_status.clone()),
                // transaction_status mirrors workflow_status for readers of
                // the legacy column
                transaction_status: Set(new_status),
                procurement_metadata: Set(metadata),
                updated_at: Set(decided_at),
                ..Default::default()
            })
            .filter(purchase_order::Column::Id.eq(self.purchase_order_id))
            .filter(purchase_order::Column::OrganizationId.eq(self.organization_id))
            .filter(
                purchase_order::Column::WorkflowStatus.eq(PurchaseOrderStatus::PendingApproval),
            )
            .exec(db)
            .await
            .map_err(|e| {
                PO_DECISION_FAILURES.with_label_values(&["db_error"]).inc();
                let msg = format!(
                    "Failed to update purchase order {}: {}",
                    self.purchase_order_id, e
                );
                error!("{}", msg);
                ServiceError::db_error(e)
            })?;

        if update.rows_affected == 0 {
            PO_DECISION_FAILURES
                .with_label_values(&["invalid_status"])
                .inc();
            // Another writer got there first; report whatever state the
            // order is in now.
            let current = PurchaseOrder::find_by_id(self.purchase_order_id)
                .filter(purchase_order::Column::OrganizationId.eq(self.organization_id))
                .one(db)
                .await
                .map_err(ServiceError::db_error)?;
            return Err(match current {
                Some(po) => self.state_conflict(&po.workflow_status),
                None => ServiceError::NotFound(format!(
                    "Purchase order {} not found",
                    self.purchase_order_id
                )),
            });
        }

        PurchaseOrder::find_by_id(self.purchase_order_id)
            .filter(purchase_order::Column::OrganizationId.eq(self.organization_id))
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| {
                ServiceError::InternalError(format!(
                    "Purchase order {} disappeared after update",
                    self.purchase_order_id
                ))
            })
    }

    fn state_conflict(&self, current: &PurchaseOrderStatus) -> ServiceError {
        ServiceError::InvalidOperation(format!(
            "Cannot {} purchase order in {} status. Must be in pending_approval status.",
            self.decision, current
        ))
    }

    async fn log_and_trigger_event(&self, event_sender: &EventSender) {
        info!(
            purchase_order_id = %self.purchase_order_id,
            decided_by = %self.decided_by,
            decision = %self.decision,
            "Purchase order decision recorded"
        );

        let event = match self.decision {
            ApprovalDecision::Approve => Event::PurchaseOrderApproved(self.purchase_order_id),
            ApprovalDecision::Reject => Event::PurchaseOrderRejected(self.purchase_order_id),
        };

        if let Err(e) = event_sender.send(event).await {
            PO_DECISION_FAILURES
                .with_label_values(&["event_error"])
                .inc();
            warn!(
                purchase_order_id = %self.purchase_order_id,
                error = %e,
                "failed to publish decision event; decision stands"
            );
        }
    }
}

/// Overlays the decision stamps on the existing procurement metadata.
///
/// The merge is additive: every pre-existing key (requested_by, delivery
/// dates, notes) survives, and only the three stamp fields for the taken
/// decision are written.
pub(crate) fn merge_decision_metadata(
    existing: &serde_json::Value,
    decision: ApprovalDecision,
    decided_by: Uuid,
    decided_at: DateTime<Utc>,
    comments: Option<&str>,
) -> serde_json::Value {
    let mut map = match existing {
        serde_json::Value::Object(map) => map.clone(),
        _ => serde_json::Map::new(),
    };

    let comments = comments
        .map(|c| json!(c))
        .unwrap_or(serde_json::Value::Null);

    match decision {
        ApprovalDecision::Approve => {
            map.insert("approved_by".to_string(), json!(decided_by));
            map.insert(
                "approval_date".to_string(),
                json!(decided_at.to_rfc3339()),
            );
            map.insert("approval_comments".to_string(), comments);
        }
        ApprovalDecision::Reject => {
            map.insert("rejected_by".to_string(), json!(decided_by));
            map.insert(
                "rejection_date".to_string(),
                json!(decided_at.to_rfc3339()),
            );
            map.insert("rejection_comments".to_string(), comments);
        }
    }

    serde_json::Value::Object(map)
}
