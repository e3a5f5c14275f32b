mod common;

use axum::http::{Method, StatusCode};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;
use std::str::FromStr;
use uuid::Uuid;

use common::{response_json, SeedPurchaseOrder, TestApp};
use procureflow_api::models::purchase_order::PurchaseOrderStatus;

fn pending_uri(organization_id: Uuid, user_id: Uuid, role: Option<&str>) -> String {
    match role {
        Some(role) => format!(
            "/api/v1/purchase-orders/pending?organizationId={}&userId={}&userRole={}",
            organization_id, user_id, role
        ),
        None => format!(
            "/api/v1/purchase-orders/pending?organizationId={}&userId={}",
            organization_id, user_id
        ),
    }
}

fn po_numbers(payload: &Value) -> Vec<String> {
    payload["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["poNumber"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn missing_query_parameters_are_bad_requests() {
    let app = TestApp::new().await;
    let org = Uuid::new_v4();

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/purchase-orders/pending?organizationId={}", org),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/purchase-orders/pending?userId={}", Uuid::new_v4()),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn organization_without_workflow_is_not_found() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::GET,
            &pending_uri(Uuid::new_v4(), Uuid::new_v4(), None),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn tier_one_approver_never_sees_higher_tiers() {
    let app = TestApp::new().await;
    let org = Uuid::new_v4();
    let approver = Uuid::new_v4();

    app.seed_workflow(org, &[(1, approver)]).await;
    app.seed_purchase_order(SeedPurchaseOrder::new(org).po_number("PO-T1").tier(1))
        .await;
    app.seed_purchase_order(SeedPurchaseOrder::new(org).po_number("PO-T2").tier(2))
        .await;
    app.seed_purchase_order(SeedPurchaseOrder::new(org).po_number("PO-T3").tier(3))
        .await;

    let response = app
        .request(Method::GET, &pending_uri(org, approver, None), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let payload = response_json(response).await;
    assert_eq!(po_numbers(&payload), vec!["PO-T1"]);
    assert_eq!(payload["summary"]["approvalTiers"], serde_json::json!([1]));
}

#[tokio::test]
async fn urgency_dominates_amount_in_listing_order() {
    let app = TestApp::new().await;
    let org = Uuid::new_v4();
    let approver = Uuid::new_v4();

    app.seed_workflow(org, &[(1, approver)]).await;
    app.seed_purchase_order(
        SeedPurchaseOrder::new(org)
            .po_number("PO-OLD")
            .days_ago(5)
            .amount(dec!(100)),
    )
    .await;
    app.seed_purchase_order(
        SeedPurchaseOrder::new(org)
            .po_number("PO-MID")
            .days_ago(2)
            .amount(dec!(500)),
    )
    .await;
    app.seed_purchase_order(
        SeedPurchaseOrder::new(org)
            .po_number("PO-NEW")
            .days_ago(0)
            .amount(dec!(900)),
    )
    .await;

    let response = app
        .request(Method::GET, &pending_uri(org, approver, None), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let payload = response_json(response).await;
    assert_eq!(po_numbers(&payload), vec!["PO-OLD", "PO-MID", "PO-NEW"]);

    let rows = payload["data"].as_array().unwrap();
    assert_eq!(rows[0]["urgency"], serde_json::json!("high"));
    assert_eq!(rows[0]["daysPending"], serde_json::json!(5));
    assert_eq!(rows[1]["urgency"], serde_json::json!("medium"));
    assert_eq!(rows[2]["urgency"], serde_json::json!("low"));
    assert_eq!(rows[0]["requiredApprovalLevel"], serde_json::json!("Manager"));

    assert_eq!(payload["summary"]["total"], serde_json::json!(3));
    assert_eq!(payload["summary"]["highUrgency"], serde_json::json!(1));
    let total_value =
        Decimal::from_str(payload["summary"]["totalValue"].as_str().unwrap()).unwrap();
    assert_eq!(total_value, dec!(1500));
}

#[tokio::test]
async fn user_with_no_tiers_gets_an_empty_list_with_a_message() {
    let app = TestApp::new().await;
    let org = Uuid::new_v4();
    let approver = Uuid::new_v4();
    let stranger = Uuid::new_v4();

    app.seed_workflow(org, &[(1, approver)]).await;
    app.seed_purchase_order(SeedPurchaseOrder::new(org)).await;

    let response = app
        .request(Method::GET, &pending_uri(org, stranger, None), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let payload = response_json(response).await;
    assert_eq!(payload["data"], serde_json::json!([]));
    assert!(payload["message"].as_str().unwrap().contains("not configured"));
    assert!(payload.get("summary").is_none());
}

#[tokio::test]
async fn role_fallback_grants_visibility_into_unassigned_tiers() {
    let app = TestApp::new().await;
    let org = Uuid::new_v4();
    let tier_one_approver = Uuid::new_v4();
    let director = Uuid::new_v4();

    // Tier 2 unassigned: directors see it through the fallback
    app.seed_workflow(org, &[(1, tier_one_approver)]).await;
    app.seed_purchase_order(SeedPurchaseOrder::new(org).po_number("PO-T2").tier(2))
        .await;
    app.seed_purchase_order(SeedPurchaseOrder::new(org).po_number("PO-T1").tier(1))
        .await;

    let response = app
        .request(
            Method::GET,
            &pending_uri(org, director, Some("director")),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let payload = response_json(response).await;
    assert_eq!(po_numbers(&payload), vec!["PO-T2"]);
    assert_eq!(payload["summary"]["approvalTiers"], serde_json::json!([2]));
    assert_eq!(
        payload["data"][0]["requiredApprovalLevel"],
        serde_json::json!("Director")
    );
}

#[tokio::test]
async fn only_pending_orders_that_require_approval_are_listed() {
    let app = TestApp::new().await;
    let org = Uuid::new_v4();
    let approver = Uuid::new_v4();

    app.seed_workflow(org, &[(1, approver)]).await;
    app.seed_purchase_order(SeedPurchaseOrder::new(org).po_number("PO-PENDING"))
        .await;
    app.seed_purchase_order(
        SeedPurchaseOrder::new(org)
            .po_number("PO-DONE")
            .status(PurchaseOrderStatus::Approved),
    )
    .await;

    let mut auto_approved = SeedPurchaseOrder::new(org).po_number("PO-AUTO");
    auto_approved.requires_approval = false;
    app.seed_purchase_order(auto_approved).await;

    let response = app
        .request(Method::GET, &pending_uri(org, approver, None), None)
        .await;
    let payload = response_json(response).await;
    assert_eq!(po_numbers(&payload), vec!["PO-PENDING"]);
}

#[tokio::test]
async fn orders_without_a_tier_surface_for_tier_one_approvers() {
    let app = TestApp::new().await;
    let org = Uuid::new_v4();
    let approver = Uuid::new_v4();

    app.seed_workflow(org, &[(1, approver)]).await;
    app.seed_purchase_order(SeedPurchaseOrder::new(org).po_number("PO-NOTIER").no_tier())
        .await;

    let response = app
        .request(Method::GET, &pending_uri(org, approver, None), None)
        .await;
    let payload = response_json(response).await;
    assert_eq!(po_numbers(&payload), vec!["PO-NOTIER"]);
    assert_eq!(payload["data"][0]["approvalTier"], serde_json::json!(1));
}

#[tokio::test]
async fn supplier_enrichment_is_best_effort() {
    let app = TestApp::new().await;
    let org = Uuid::new_v4();
    let approver = Uuid::new_v4();

    app.seed_workflow(org, &[(1, approver)]).await;
    let supplier_id = app
        .seed_supplier(org, "Acme Produce", "orders@acmeproduce.example")
        .await;
    app.seed_purchase_order(
        SeedPurchaseOrder::new(org)
            .po_number("PO-SUPPLIED")
            .supplier(supplier_id)
            .amount(dec!(800)),
    )
    .await;
    // Dangling supplier reference: the row still lists, supplier is null
    app.seed_purchase_order(
        SeedPurchaseOrder::new(org)
            .po_number("PO-ORPHAN")
            .supplier(Uuid::new_v4())
            .amount(dec!(100)),
    )
    .await;

    let response = app
        .request(Method::GET, &pending_uri(org, approver, None), None)
        .await;
    let payload = response_json(response).await;
    assert_eq!(po_numbers(&payload), vec!["PO-SUPPLIED", "PO-ORPHAN"]);

    let supplied = &payload["data"][0];
    assert_eq!(supplied["supplier"]["name"], serde_json::json!("Acme Produce"));
    assert_eq!(
        supplied["supplier"]["contactEmail"],
        serde_json::json!("orders@acmeproduce.example")
    );
    assert!(payload["data"][1]["supplier"].is_null());
}

#[tokio::test]
async fn listings_are_scoped_to_the_requested_organization() {
    let app = TestApp::new().await;
    let org_a = Uuid::new_v4();
    let org_b = Uuid::new_v4();
    let approver = Uuid::new_v4();

    app.seed_workflow(org_a, &[(1, approver)]).await;
    app.seed_purchase_order(SeedPurchaseOrder::new(org_a).po_number("PO-A"))
        .await;
    app.seed_purchase_order(SeedPurchaseOrder::new(org_b).po_number("PO-B"))
        .await;

    let response = app
        .request(Method::GET, &pending_uri(org_a, approver, None), None)
        .await;
    let payload = response_json(response).await;
    assert_eq!(po_numbers(&payload), vec!["PO-A"]);
}
