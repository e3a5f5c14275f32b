use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter};
use serde::Serialize;
use slog::Logger;
use tracing::{instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    commands::purchaseorders::{DecidePurchaseOrderCommand, DecidePurchaseOrderResult},
    commands::Command,
    db::DbPool,
    errors::ServiceError,
    events::EventSender,
    models::{
        purchase_order::{self, PurchaseOrderStatus},
        supplier,
    },
    services::approval_policy::{self, ApprovalTier, ApproverRole},
    services::workflow_config,
};

/// Days an order may sit before the listing escalates its urgency.
const URGENCY_HIGH_AFTER_DAYS: i64 = 3;
const URGENCY_MEDIUM_AFTER_DAYS: i64 = 1;

/// Service for managing the purchase order approval workflow
#[derive(Clone)]
pub struct ProcurementService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
    logger: Logger,
}

/// How overdue a pending order is, derived from its age.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    High,
    Medium,
    Low,
}

impl Urgency {
    fn for_days_pending(days: i64) -> Self {
        if days > URGENCY_HIGH_AFTER_DAYS {
            Urgency::High
        } else if days > URGENCY_MEDIUM_AFTER_DAYS {
            Urgency::Medium
        } else {
            Urgency::Low
        }
    }

    /// Sort rank: high urgency sorts first.
    fn priority(self) -> u8 {
        match self {
            Urgency::High => 0,
            Urgency::Medium => 1,
            Urgency::Low => 2,
        }
    }
}

/// Supplier contact details attached to a pending order, when known.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SupplierSummary {
    pub id: Uuid,
    pub name: String,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
}

/// One row of the pending-approvals listing.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PendingPurchaseOrder {
    pub id: Uuid,
    pub po_number: String,
    pub approval_tier: i16,
    /// Display label for the tier: Manager, Director or Owner
    pub required_approval_level: String,
    pub total_amount: Decimal,
    pub currency: String,
    pub requested_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub days_pending: i64,
    pub urgency: Urgency,
    pub supplier: Option<SupplierSummary>,
}

impl PendingPurchaseOrder {
    fn from_model(
        po: purchase_order::Model,
        suppliers: &HashMap<Uuid, supplier::Model>,
        now: DateTime<Utc>,
    ) -> Self {
        let tier = po
            .approval_tier
            .and_then(ApprovalTier::from_level)
            .unwrap_or(ApprovalTier::First);
        let days_pending = (now - po.created_at).num_days().max(0);
        let requested_by = po
            .procurement_metadata
            .get("requested_by")
            .and_then(|v| v.as_str())
            .map(str::to_string);
        let supplier = po
            .supplier_id
            .and_then(|id| suppliers.get(&id))
            .map(|s| SupplierSummary {
                id: s.id,
                name: s.name.clone(),
                contact_email: s.contact_email.clone(),
                contact_phone: s.contact_phone.clone(),
            });

        Self {
            id: po.id,
            po_number: po.po_number,
            approval_tier: tier.level(),
            required_approval_level: tier.display_label().to_string(),
            total_amount: po.total_amount,
            currency: po.currency,
            requested_by,
            created_at: po.created_at,
            days_pending,
            urgency: Urgency::for_days_pending(days_pending),
            supplier,
        }
    }
}

/// Aggregates shown next to a non-empty pending-approvals listing.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PendingApprovalsSummary {
    pub total: usize,
    pub high_urgency: usize,
    pub total_value: Decimal,
    pub approval_tiers: Vec<i16>,
}

/// Result of the pending-approvals query. `message` is set instead of
/// `summary` when the user holds no approval tiers at all.
#[derive(Debug, Clone)]
pub struct PendingApprovals {
    pub orders: Vec<PendingPurchaseOrder>,
    pub summary: Option<PendingApprovalsSummary>,
    pub message: Option<String>,
}

impl ProcurementService {
    /// Creates a new procurement service instance
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>, logger: Logger) -> Self {
        Self {
            db_pool,
            event_sender,
            logger,
        }
    }

    /// Applies an approve/reject decision to a pending purchase order
    #[instrument(skip(self))]
    pub async fn decide_purchase_order(
        &self,
        command: DecidePurchaseOrderCommand,
    ) -> Result<DecidePurchaseOrderResult, ServiceError> {
        slog::info!(
            &self.logger,
            "applying purchase order decision";
            "purchase_order_id" => command.purchase_order_id.to_string(),
            "decision" => command.decision.to_string(),
        );
        command
            .execute(self.db_pool.clone(), self.event_sender.clone())
            .await
    }

    /// Gets a purchase order by ID within an organization
    #[instrument(skip(self))]
    pub async fn get_purchase_order(
        &self,
        organization_id: Uuid,
        po_id: Uuid,
    ) -> Result<Option<purchase_order::Model>, ServiceError> {
        let db = &*self.db_pool;
        let po = purchase_order::Entity::find_by_id(po_id)
            .filter(purchase_order::Column::OrganizationId.eq(organization_id))
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(po)
    }

    /// Lists every purchase order awaiting a decision from the given user,
    /// ordered most-urgent first and enriched with supplier contacts.
    #[instrument(skip(self))]
    pub async fn pending_approvals(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
        role: Option<ApproverRole>,
    ) -> Result<PendingApprovals, ServiceError> {
        let db = &*self.db_pool;

        let config = workflow_config::load_workflow_config(db, organization_id)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "No approval workflow configured for organization {}",
                    organization_id
                ))
            })?;

        let tiers = approval_policy::authorized_tiers(&config, user_id, role);
        if tiers.is_empty() {
            return Ok(PendingApprovals {
                orders: Vec::new(),
                summary: None,
                message: Some(
                    "User is not configured as an approver for any tier in this organization"
                        .to_string(),
                ),
            });
        }

        // Orders whose tier is NULL read as tier 1
        let mut tier_condition = Condition::any();
        for tier in &tiers {
            tier_condition =
                tier_condition.add(purchase_order::Column::ApprovalTier.eq(tier.level()));
            if *tier == ApprovalTier::First {
                tier_condition =
                    tier_condition.add(purchase_order::Column::ApprovalTier.is_null());
            }
        }

        let pos = purchase_order::Entity::find()
            .filter(purchase_order::Column::OrganizationId.eq(organization_id))
            .filter(
                purchase_order::Column::WorkflowStatus.eq(PurchaseOrderStatus::PendingApproval),
            )
            .filter(purchase_order::Column::RequiresApproval.eq(true))
            .filter(tier_condition)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let suppliers = self.load_suppliers(&pos).await;

        let now = Utc::now();
        let mut orders: Vec<PendingPurchaseOrder> = pos
            .into_iter()
            .map(|po| PendingPurchaseOrder::from_model(po, &suppliers, now))
            .collect();
        sort_by_urgency(&mut orders);

        let summary = PendingApprovalsSummary {
            total: orders.len(),
            high_urgency: orders
                .iter()
                .filter(|o| o.urgency == Urgency::High)
                .count(),
            total_value: orders.iter().map(|o| o.total_amount).sum(),
            approval_tiers: tiers.iter().map(|t| t.level()).collect(),
        };

        Ok(PendingApprovals {
            orders,
            summary: Some(summary),
            message: None,
        })
    }

    /// Fetches supplier records for enrichment. Best-effort: a lookup
    /// failure degrades every row's supplier to `null` rather than failing
    /// the listing.
    async fn load_suppliers(
        &self,
        pos: &[purchase_order::Model],
    ) -> HashMap<Uuid, supplier::Model> {
        let supplier_ids: Vec<Uuid> = pos.iter().filter_map(|po| po.supplier_id).collect();
        if supplier_ids.is_empty() {
            return HashMap::new();
        }

        match supplier::Entity::find()
            .filter(supplier::Column::Id.is_in(supplier_ids))
            .all(&*self.db_pool)
            .await
        {
            Ok(rows) => rows.into_iter().map(|s| (s.id, s)).collect(),
            Err(e) => {
                warn!(error = %e, "supplier enrichment failed; listing without contacts");
                slog::warn!(&self.logger, "supplier enrichment failed"; "error" => e.to_string());
                HashMap::new()
            }
        }
    }
}

/// Urgency dominates; amount breaks ties, largest first.
fn sort_by_urgency(orders: &mut [PendingPurchaseOrder]) {
    orders.sort_by(|a, b| {
        a.urgency
            .priority()
            .cmp(&b.urgency.priority())
            .then_with(|| b.total_amount.cmp(&a.total_amount))
    });
}
