#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request},
    response::Response,
    Router,
};
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

use procureflow_api::{
    config::AppConfig,
    db,
    events::{self, EventSender},
    handlers::AppServices,
    models::{
        approval_action, approval_workflow, approval_workflow_field,
        purchase_order::{self, PurchaseOrderStatus},
        supplier,
    },
    AppState,
};

/// Helper harness for spinning up an application state backed by a
/// file-based SQLite database in a temp directory.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _event_task: tokio::task::JoinHandle<()>,
    _db_dir: TempDir,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let db_dir = TempDir::new().expect("temp dir for sqlite");
        let db_path = db_dir.path().join("procureflow_test.db");

        let mut cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_path.display()),
            "127.0.0.1",
            18_080,
            "test",
        );
        cfg.auto_migrate = true;
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let db_pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("database connection");
        db::run_migrations(&db_pool).await.expect("migrations");
        let db_arc = Arc::new(db_pool);

        let (event_tx, event_rx) = mpsc::channel(64);
        let event_sender = EventSender::new(event_tx);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let base_logger = slog::Logger::root(slog::Discard, slog::o!());
        let services =
            AppServices::new(db_arc.clone(), Arc::new(event_sender.clone()), base_logger);

        let state = AppState {
            db: db_arc,
            config: cfg,
            event_sender,
            services,
        };

        let router = Router::new()
            .nest("/api/v1", procureflow_api::api_v1_routes())
            .with_state(state.clone());

        Self {
            router,
            state,
            _event_task: event_task,
            _db_dir: db_dir,
        }
    }

    /// Issue a request against the in-process router.
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json_body) => builder
                .header("content-type", "application/json")
                .body(Body::from(json_body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        self.router.clone().oneshot(request).await.expect("response")
    }

    /// Seed an approval workflow deployment for an organization with the
    /// given explicit tier approvers.
    pub async fn seed_workflow(&self, organization_id: Uuid, tier_approvers: &[(i16, Uuid)]) {
        let workflow_id = Uuid::new_v4();
        let now = Utc::now();

        approval_workflow::ActiveModel {
            id: Set(workflow_id),
            organization_id: Set(organization_id),
            name: Set("Purchase approval workflow".to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.state.db)
        .await
        .expect("workflow insert");

        for (tier, approver) in tier_approvers {
            approval_workflow_field::ActiveModel {
                id: Set(Uuid::new_v4()),
                workflow_id: Set(workflow_id),
                field_name: Set(format!("tier_{}_approver_user_id", tier)),
                field_value: Set(approver.to_string()),
            }
            .insert(&*self.state.db)
            .await
            .expect("workflow field insert");
        }
    }

    pub async fn seed_supplier(&self, organization_id: Uuid, name: &str, email: &str) -> Uuid {
        let id = Uuid::new_v4();
        supplier::ActiveModel {
            id: Set(id),
            organization_id: Set(organization_id),
            name: Set(name.to_string()),
            contact_email: Set(Some(email.to_string())),
            contact_phone: Set(None),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.state.db)
        .await
        .expect("supplier insert");
        id
    }

    pub async fn seed_purchase_order(&self, seed: SeedPurchaseOrder) -> Uuid {
        let id = Uuid::new_v4();
        let created_at = Utc::now() - Duration::days(seed.created_days_ago);

        purchase_order::ActiveModel {
            id: Set(id),
            po_number: Set(seed.po_number),
            organization_id: Set(seed.organization_id),
            supplier_id: Set(seed.supplier_id),
            workflow_status: Set(seed.status.clone()),
            transaction_status: Set(seed.status),
            requires_approval: Set(seed.requires_approval),
            approval_tier: Set(seed.approval_tier),
            total_amount: Set(seed.total_amount),
            currency: Set("USD".to_string()),
            procurement_metadata: Set(seed.metadata),
            created_at: Set(created_at),
            updated_at: Set(created_at),
        }
        .insert(&*self.state.db)
        .await
        .expect("purchase order insert");

        id
    }

    pub async fn fetch_purchase_order(&self, id: Uuid) -> purchase_order::Model {
        purchase_order::Entity::find_by_id(id)
            .one(&*self.state.db)
            .await
            .expect("query")
            .expect("purchase order exists")
    }

    pub async fn count_approval_actions(&self, purchase_order_id: Uuid) -> u64 {
        approval_action::Entity::find()
            .filter(approval_action::Column::PurchaseOrderId.eq(purchase_order_id))
            .count(&*self.state.db)
            .await
            .expect("count")
    }

    pub async fn latest_approval_action(
        &self,
        purchase_order_id: Uuid,
    ) -> Option<approval_action::Model> {
        approval_action::Entity::find()
            .filter(approval_action::Column::PurchaseOrderId.eq(purchase_order_id))
            .one(&*self.state.db)
            .await
            .expect("query")
    }
}

/// Builder-style seed data for a purchase order; defaults describe a fresh
/// tier-1 order awaiting approval.
pub struct SeedPurchaseOrder {
    pub organization_id: Uuid,
    pub po_number: String,
    pub supplier_id: Option<Uuid>,
    pub status: PurchaseOrderStatus,
    pub requires_approval: bool,
    pub approval_tier: Option<i16>,
    pub total_amount: Decimal,
    pub metadata: Value,
    pub created_days_ago: i64,
}

impl SeedPurchaseOrder {
    pub fn new(organization_id: Uuid) -> Self {
        Self {
            organization_id,
            po_number: "PO-1001".to_string(),
            supplier_id: None,
            status: PurchaseOrderStatus::PendingApproval,
            requires_approval: true,
            approval_tier: Some(1),
            total_amount: dec!(250.00),
            metadata: json!({
                "requested_by": "requester@example.com",
                "delivery_date": "2026-01-15",
            }),
            created_days_ago: 0,
        }
    }

    pub fn po_number(mut self, number: &str) -> Self {
        self.po_number = number.to_string();
        self
    }

    pub fn tier(mut self, tier: i16) -> Self {
        self.approval_tier = Some(tier);
        self
    }

    pub fn no_tier(mut self) -> Self {
        self.approval_tier = None;
        self
    }

    pub fn amount(mut self, amount: Decimal) -> Self {
        self.total_amount = amount;
        self
    }

    pub fn status(mut self, status: PurchaseOrderStatus) -> Self {
        self.status = status;
        self
    }

    pub fn supplier(mut self, supplier_id: Uuid) -> Self {
        self.supplier_id = Some(supplier_id);
        self
    }

    pub fn days_ago(mut self, days: i64) -> Self {
        self.created_days_ago = days;
        self
    }

    pub fn metadata(mut self, metadata: Value) -> Self {
        self.metadata = metadata;
        self
    }
}

pub async fn response_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}
