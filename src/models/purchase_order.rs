use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Workflow states of a purchase order.
///
/// `PendingApproval` is the only state the approval endpoint accepts as a
/// source; `Approved` and `Rejected` are terminal. The remaining states exist
/// for orders created or closed elsewhere in the procurement pipeline.
#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum PurchaseOrderStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "pending_approval")]
    PendingApproval,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl std::fmt::Display for PurchaseOrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PurchaseOrderStatus::Draft => write!(f, "draft"),
            PurchaseOrderStatus::PendingApproval => write!(f, "pending_approval"),
            PurchaseOrderStatus::Approved => write!(f, "approved"),
            PurchaseOrderStatus::Rejected => write!(f, "rejected"),
            PurchaseOrderStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// The two decisions an approver can take on a pending purchase order.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ApprovalDecision {
    Approve,
    Reject,
}

impl ApprovalDecision {
    /// Terminal status a purchase order lands in after this decision.
    pub fn resulting_status(self) -> PurchaseOrderStatus {
        match self {
            ApprovalDecision::Approve => PurchaseOrderStatus::Approved,
            ApprovalDecision::Reject => PurchaseOrderStatus::Rejected,
        }
    }

    /// Past-tense verb used in response messages and log lines.
    pub fn past_tense(self) -> &'static str {
        match self {
            ApprovalDecision::Approve => "approved",
            ApprovalDecision::Reject => "rejected",
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "purchase_orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub po_number: String,
    pub organization_id: Uuid,
    pub supplier_id: Option<Uuid>,
    /// Current workflow state; `transaction_status` mirrors it for readers of
    /// the legacy column. Both are always written together.
    pub workflow_status: PurchaseOrderStatus,
    pub transaction_status: PurchaseOrderStatus,
    pub requires_approval: bool,
    /// Approval tier assigned upstream; NULL reads as tier 1.
    pub approval_tier: Option<i16>,
    pub total_amount: Decimal,
    pub currency: String,
    /// Free-form procurement payload: requested_by, delivery date, notes, and
    /// the decision stamps merged in on approval/rejection.
    pub procurement_metadata: Json,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::supplier::Entity",
        from = "Column::SupplierId",
        to = "super::supplier::Column::Id"
    )]
    Supplier,
}

impl Related<super::supplier::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Supplier.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn decision_maps_to_terminal_status() {
        assert_eq!(
            ApprovalDecision::Approve.resulting_status(),
            PurchaseOrderStatus::Approved
        );
        assert_eq!(
            ApprovalDecision::Reject.resulting_status(),
            PurchaseOrderStatus::Rejected
        );
    }

    #[test]
    fn decision_parses_from_wire_values() {
        assert_eq!(
            ApprovalDecision::from_str("approve").unwrap(),
            ApprovalDecision::Approve
        );
        assert_eq!(
            ApprovalDecision::from_str("reject").unwrap(),
            ApprovalDecision::Reject
        );
        assert!(ApprovalDecision::from_str("escalate").is_err());
    }

    #[test]
    fn status_display_matches_stored_values() {
        assert_eq!(
            PurchaseOrderStatus::PendingApproval.to_string(),
            "pending_approval"
        );
        assert_eq!(PurchaseOrderStatus::Approved.to_string(), "approved");
    }
}
