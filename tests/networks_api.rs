//! API tests for network endpoints
//!
//! Drive the full router over an in-memory store: segment allocation,
//! provider attribute projection, conflicts and rollback.

mod common;

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use serde_json::{json, Value};

use network_segment_registry::domain::gateways::{NetworkStore, NetworkTransaction};
use network_segment_registry::domain::models::segment::SegmentKey;

use common::{generate_expired_token, TestApp, TEST_TENANT};

fn network_names(list: &Value) -> Vec<&str> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|network| network["name"].as_str().unwrap())
        .collect()
}

// ============================================================================
// POST /networks - Segment allocation
// ============================================================================

#[tokio::test]
async fn test_external_network_gets_no_segments() {
    let app = TestApp::new();

    let (status, body) = app
        .create_network(json!({
            "name": "public",
            "router:external": true,
            "provider:network_type": "vlan",
            "provider:physical_network": "physnetA",
            "provider:segmentation_id": 100
        }))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["router:external"], json!(true));
    assert_eq!(body["tenant_id"], json!(TEST_TENANT));
    assert!(body.get("provider:network_type").is_none());
    assert!(body.get("segments").is_none());
    assert!(body.get("mtu").is_none());

    // The skipped VLAN was never reserved
    let (status, _) = app
        .create_network(json!({
            "name": "internal",
            "provider:network_type": "vlan",
            "provider:physical_network": "physnetA",
            "provider:segmentation_id": 100
        }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_single_provider_segment() {
    let app = TestApp::new();

    let (status, body) = app
        .create_network(json!({
            "name": "net1",
            "router:external": false,
            "provider:network_type": "vlan",
            "provider:physical_network": "physnetA",
            "provider:segmentation_id": 100
        }))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["router:external"], json!(false));
    assert_eq!(body["provider:network_type"], json!("vlan"));
    assert_eq!(body["provider:physical_network"], json!("physnetA"));
    assert_eq!(body["provider:segmentation_id"], json!(100));
    assert_eq!(body["mtu"], json!(1500));

    let id = body["id"].as_str().unwrap();
    let (status, fetched) = app.get(&format!("/networks/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, body);
}

#[tokio::test]
async fn test_multiple_segments_keep_order_and_minimum_mtu() {
    let app = TestApp::new();

    let (status, body) = app
        .create_network(json!({
            "name": "multi",
            "segments": [
                {
                    "provider:network_type": "vlan",
                    "provider:physical_network": "physnetA",
                    "provider:segmentation_id": 100
                },
                {"provider:network_type": "vxlan", "provider:segmentation_id": 5000}
            ]
        }))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(body.get("provider:network_type").is_none());
    assert_eq!(
        body["segments"],
        json!([
            {
                "provider:network_type": "vlan",
                "provider:physical_network": "physnetA",
                "provider:segmentation_id": 100
            },
            {
                "provider:network_type": "vxlan",
                "provider:physical_network": null,
                "provider:segmentation_id": 5000
            }
        ])
    );
    assert_eq!(body["mtu"], json!(1450));
}

#[tokio::test]
async fn test_tenant_network_draws_from_first_tenant_type() {
    let app = TestApp::new();

    let (status, body) = app.create_network(json!({"name": "tenant-net"})).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["provider:network_type"], json!("vxlan"));
    assert_eq!(body["provider:physical_network"], Value::Null);
    assert_eq!(body["provider:segmentation_id"], json!(1000));
    assert_eq!(body["mtu"], json!(1450));
}

#[tokio::test]
async fn test_tenant_pools_fall_through_then_exhaust() {
    let app = TestApp::new();

    let mut allocated = Vec::new();
    for i in 0..4 {
        let (status, body) = app.create_network(json!({"name": format!("net{i}")})).await;
        assert_eq!(status, StatusCode::CREATED);
        allocated.push((
            body["provider:network_type"].as_str().unwrap().to_string(),
            body["provider:segmentation_id"].as_u64().unwrap(),
        ));
    }
    assert_eq!(
        allocated,
        vec![
            ("vxlan".to_string(), 1000),
            ("vxlan".to_string(), 1001),
            ("vlan".to_string(), 100),
            ("vlan".to_string(), 101),
        ]
    );

    let (status, body) = app.create_network(json!({"name": "one-too-many"})).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["code"], json!("RESOURCE_EXHAUSTED"));

    let (_, list) = app.get("/networks").await;
    assert_eq!(list.as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_local_network_has_no_mtu() {
    let app = TestApp::new();

    let (status, body) = app
        .create_network(json!({"name": "host-only", "provider:network_type": "local"}))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["provider:network_type"], json!("local"));
    assert!(body.get("mtu").is_none());
}

// ============================================================================
// POST /networks - Errors and rollback
// ============================================================================

#[tokio::test]
async fn test_duplicate_segment_returns_conflict() {
    let app = TestApp::new();
    let request = json!({
        "name": "flat-net",
        "provider:network_type": "flat",
        "provider:physical_network": "physnet0"
    });

    let (status, _) = app.create_network(request.clone()).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app.create_network(request).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], json!("SEGMENT_CONFLICT"));

    let (_, list) = app.get("/networks").await;
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_failed_create_releases_earlier_segments() {
    let app = TestApp::new();

    let (status, _) = app
        .create_network(json!({
            "name": "holder",
            "provider:network_type": "vlan",
            "provider:physical_network": "physnetA",
            "provider:segmentation_id": 200
        }))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    // First segment reserves VNI 7000, second conflicts
    let (status, _) = app
        .create_network(json!({
            "name": "loser",
            "segments": [
                {"provider:network_type": "vxlan", "provider:segmentation_id": 7000},
                {
                    "provider:network_type": "vlan",
                    "provider:physical_network": "physnetA",
                    "provider:segmentation_id": 200
                }
            ]
        }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, list) = app.get("/networks").await;
    assert_eq!(network_names(&list), vec!["holder"]);

    let (status, _) = app
        .create_network(json!({
            "name": "retry",
            "provider:network_type": "vxlan",
            "provider:segmentation_id": 7000
        }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_for_same_segment() {
    let app = Arc::new(TestApp::new());
    let request = |name: &str| {
        json!({
            "name": name,
            "provider:network_type": "vlan",
            "provider:physical_network": "physnetA",
            "provider:segmentation_id": 300
        })
    };

    let racers: Vec<_> = (0..8)
        .map(|i| {
            let app = app.clone();
            let body = request(&format!("racer-{i}"));
            tokio::spawn(async move { app.create_network(body).await.0 })
        })
        .collect();

    let mut statuses = Vec::new();
    for racer in racers {
        statuses.push(racer.await.unwrap());
    }
    let created = statuses.iter().filter(|s| **s == StatusCode::CREATED).count();
    let conflicts = statuses.iter().filter(|s| **s == StatusCode::CONFLICT).count();
    assert_eq!((created, conflicts), (1, 7));

    let (_, list) = app.get("/networks").await;
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_segment_held_by_open_transaction_conflicts() {
    let app = TestApp::new();
    let request = json!({
        "name": "waiting",
        "provider:network_type": "vlan",
        "provider:physical_network": "physnetA",
        "provider:segmentation_id": 300
    });

    let mut holder = app.store.begin().await.unwrap();
    assert!(holder
        .reserve_segment(&SegmentKey::new("vlan", Some("physnetA"), Some(300)))
        .await
        .unwrap());

    let (status, body) = app.create_network(request.clone()).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], json!("SEGMENT_CONFLICT"));

    drop(holder);
    let (status, _) = app.create_network(request).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_unsupported_network_type_returns_bad_request() {
    let app = TestApp::new();

    let (status, body) = app
        .create_network(json!({"name": "net1", "provider:network_type": "gre"}))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], json!("UNSUPPORTED_NETWORK_TYPE"));
}

#[tokio::test]
async fn test_invalid_provider_attributes_return_bad_request() {
    let app = TestApp::new();

    // Driver-level: VLAN tag without a physical network
    let (status, body) = app
        .create_network(json!({
            "name": "net1",
            "provider:network_type": "vlan",
            "provider:segmentation_id": 10
        }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], json!("VALIDATION_ERROR"));

    // Request-level: provider attributes and segments together
    let (status, body) = app
        .create_network(json!({
            "name": "net2",
            "provider:network_type": "vxlan",
            "segments": [{"provider:network_type": "vxlan"}]
        }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], json!("VALIDATION_ERROR"));

    let (_, list) = app.get("/networks").await;
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_create_network_requires_authentication() {
    let app = TestApp::new();

    let (status, body) = app
        .send(
            Request::builder()
                .method(Method::POST)
                .uri("/networks")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({"name": "net1"}).to_string()))
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], json!("UNAUTHORIZED"));

    let (status, _) = app
        .send(
            Request::builder()
                .method(Method::GET)
                .uri("/networks")
                .header(header::AUTHORIZATION, format!("Bearer {}", generate_expired_token()))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ============================================================================
// GET /networks and GET /networks/:id
// ============================================================================

#[tokio::test]
async fn test_list_networks_sorted_with_provider_attributes() {
    let app = TestApp::new();

    app.create_network(json!({"name": "zulu"})).await;
    app.create_network(json!({"name": "alpha", "router:external": "True"})).await;
    app.create_network(json!({"name": "mike", "router:external": 0})).await;

    let (status, list) = app.get("/networks").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(network_names(&list), vec!["alpha", "mike", "zulu"]);
    for network in list.as_array().unwrap() {
        let external = network["router:external"].as_bool().unwrap();
        assert_eq!(network.get("provider:network_type").is_some(), !external);
    }
}

#[tokio::test]
async fn test_get_network_not_found() {
    let app = TestApp::new();

    let (status, body) = app
        .get("/networks/7b0e7c1e-4a3a-4d1c-9a53-3f1f6f1f0b11")
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], json!("NOT_FOUND"));

    let (status, body) = app.get("/networks/not-a-uuid").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], json!("INVALID_UUID"));
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let app = TestApp::new();

    let response = tower::util::ServiceExt::oneshot(
        app.router.clone(),
        Request::builder()
            .uri("/networks")
            .header(header::AUTHORIZATION, app.auth_header())
            .header("x-request-id", "req-42")
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("x-request-id").unwrap(), "req-42");
}
