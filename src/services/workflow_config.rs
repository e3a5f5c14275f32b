//! Loads an organization's approval workflow deployment and flattens its
//! dynamic fields into a [`WorkflowConfig`].

use std::collections::HashMap;

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::models::{approval_workflow, approval_workflow_field};
use crate::services::approval_policy::ApprovalTier;

/// Flattened view of an organization's approval workflow deployment.
///
/// Field names map directly to values; tiers without a configured approver
/// have no entry at all, which is what lets the role fallback distinguish
/// "unconfigured" from "assigned to someone else".
#[derive(Debug, Clone, Default)]
pub struct WorkflowConfig {
    fields: HashMap<String, String>,
}

impl WorkflowConfig {
    pub fn from_fields<I>(fields: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Self {
            fields: fields.into_iter().collect(),
        }
    }

    pub fn get(&self, field_name: &str) -> Option<&str> {
        self.fields.get(field_name).map(String::as_str)
    }

    /// The user explicitly assigned to approve the given tier, if any.
    ///
    /// A value that fails to parse as a user id is logged and treated as
    /// unconfigured for the tier.
    pub fn explicit_approver(&self, tier: ApprovalTier) -> Option<Uuid> {
        let raw = self.get(&tier.approver_field())?;
        match raw.parse::<Uuid>() {
            Ok(id) => Some(id),
            Err(_) => {
                warn!(
                    field = %tier.approver_field(),
                    value = %raw,
                    "approver field holds an invalid user id; treating tier as unconfigured"
                );
                None
            }
        }
    }
}

/// Fetches the approval workflow deployment for `organization_id` and
/// flattens its fields. `Ok(None)` means the organization has no workflow
/// configured, which callers surface as a not-found condition.
#[instrument(skip(db))]
pub async fn load_workflow_config(
    db: &DatabaseConnection,
    organization_id: Uuid,
) -> Result<Option<WorkflowConfig>, ServiceError> {
    let workflow = approval_workflow::Entity::find()
        .filter(approval_workflow::Column::OrganizationId.eq(organization_id))
        .one(db)
        .await
        .map_err(ServiceError::DatabaseError)?;

    let Some(workflow) = workflow else {
        return Ok(None);
    };

    let fields = approval_workflow_field::Entity::find()
        .filter(approval_workflow_field::Column::WorkflowId.eq(workflow.id))
        .all(db)
        .await
        .map_err(ServiceError::DatabaseError)?;

    Ok(Some(WorkflowConfig::from_fields(
        fields.into_iter().map(|f| (f.field_name, f.field_value)),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_fields_are_simply_missing() {
        let config = WorkflowConfig::from_fields(std::iter::empty());
        assert!(config.get("tier_1_approver_user_id").is_none());
        assert!(config.explicit_approver(ApprovalTier::First).is_none());
    }

    #[test]
    fn configured_approver_is_parsed() {
        let id = Uuid::from_u128(42);
        let config = WorkflowConfig::from_fields(vec![(
            "tier_2_approver_user_id".to_string(),
            id.to_string(),
        )]);
        assert_eq!(config.explicit_approver(ApprovalTier::Second), Some(id));
        assert!(config.explicit_approver(ApprovalTier::First).is_none());
    }

    #[test]
    fn malformed_approver_reads_as_unconfigured() {
        let config = WorkflowConfig::from_fields(vec![(
            "tier_1_approver_user_id".to_string(),
            "not-a-uuid".to_string(),
        )]);
        assert!(config.explicit_approver(ApprovalTier::First).is_none());
    }
}
