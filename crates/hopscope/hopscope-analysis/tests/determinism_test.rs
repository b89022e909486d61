//! Byte-identical output for a fixed snapshot, tier and request.

use std::sync::Arc;

use ed25519_dalek::SigningKey;
use hopscope_analysis::{GraphSnapshot, NeighborhoodService, RequestParams};
use hopscope_core::config::SearchConfig;
use hopscope_core::licensing::{
    sign_credential, LicenseClaims, LicenseValidator, TierPolicyRegistry,
};

const NOW: u64 = 1_700_000_000;

const NODES: &str = r#"
    {"id": "auth::login", "attributes": {"name": "login", "params": "user: User, pass: Secret", "doc": "Log a user in"}},
    {"id": "auth::logout", "attributes": {"name": "logout", "params": "user: User", "doc": "Log a user out"}},
    {"id": "auth::login_with_token", "attributes": {"name": "loginWithToken", "params": "token: Token", "doc": "Log in with a token"}},
    {"id": "db::find_user", "attributes": {"name": "findUser", "params": "id: UserId", "loc": 42}},
    {"id": "db::query", "attributes": {"name": "query", "params": "sql: Sql", "loc": 310, "hot": true}},
    {"id": "crypto::verify", "attributes": {"name": "verify", "params": "pass: Secret, hash: Hash"}}
"#;

const EDGES: &[&str] = &[
    r#"{"source": "auth::login", "target": "db::find_user", "confidence": 0.9, "kind": "calls"}"#,
    r#"{"source": "auth::login", "target": "crypto::verify", "confidence": 0.8, "kind": "calls"}"#,
    r#"{"source": "db::find_user", "target": "db::query", "confidence": 1.0, "kind": "calls"}"#,
    r#"{"source": "auth::logout", "target": "db::find_user", "confidence": 0.7, "kind": "calls"}"#,
    r#"{"source": "auth::login_with_token", "target": "auth::login", "confidence": 0.6, "kind": "delegates"}"#,
];

fn snapshot(edges: &[&str]) -> Arc<GraphSnapshot> {
    let text = format!(r#"{{"nodes": [{}], "edges": [{}]}}"#, NODES, edges.join(","));
    Arc::new(GraphSnapshot::from_json(&text).unwrap())
}

fn service(snapshot: Arc<GraphSnapshot>) -> NeighborhoodService {
    NeighborhoodService::new(
        Arc::new(TierPolicyRegistry::defaults()),
        Arc::new(LicenseValidator::new(
            SigningKey::from_bytes(&[11u8; 32]).verifying_key(),
        )),
        snapshot,
        SearchConfig {
            semantic_min_score: Some(0.3),
            ..SearchConfig::default()
        },
    )
}

fn credential(tier: &str) -> String {
    let claims = LicenseClaims {
        sub: Some("acme".to_string()),
        iss: Some("hopscope-licensing".to_string()),
        aud: Some("hopscope".to_string()),
        tier: Some(tier.to_string()),
        nbf: None,
        exp: Some(NOW + 60),
        iat: None,
        jti: None,
    };
    sign_credential(&claims, &SigningKey::from_bytes(&[11u8; 32]))
        .as_str()
        .to_string()
}

fn requests() -> Vec<RequestParams> {
    let base = RequestParams {
        center_node_id: "auth::login".to_string(),
        hops: 3,
        direction: "both".to_string(),
        ..Default::default()
    };
    vec![
        base.clone(),
        RequestParams {
            license_credential: Some(credential("pro")),
            ..base.clone()
        },
        RequestParams {
            license_credential: Some(credential("enterprise")),
            query: Some("WHERE depth > 0 ORDER BY loc DESC LIMIT 3".to_string()),
            ..base.clone()
        },
        RequestParams {
            license_credential: Some(credential("enterprise")),
            query: Some("WHERE confidence > 0.3 ORDER BY confidence".to_string()),
            min_confidence: 0.65,
            ..base.clone()
        },
        RequestParams {
            max_nodes: Some(3),
            ..base
        },
    ]
}

#[test]
fn repeated_requests_serialize_identically() {
    let service = service(snapshot(EDGES));
    for request in requests() {
        let first = service.handle(&request, NOW).to_json().unwrap();
        for _ in 0..5 {
            assert_eq!(service.handle(&request, NOW).to_json().unwrap(), first);
        }
    }
}

#[test]
fn edge_insertion_order_does_not_matter() {
    let forward = service(snapshot(EDGES));
    let reversed_edges: Vec<&str> = EDGES.iter().rev().copied().collect();
    let reversed = service(snapshot(&reversed_edges));
    for request in requests() {
        assert_eq!(
            forward.handle(&request, NOW).to_json().unwrap(),
            reversed.handle(&request, NOW).to_json().unwrap(),
            "request {:?}",
            request.query
        );
    }
}

#[test]
fn response_shape_is_stable() {
    let service = service(snapshot(EDGES));
    let request = RequestParams {
        center_node_id: "db::query".to_string(),
        hops: 1,
        direction: "incoming".to_string(),
        ..Default::default()
    };
    let json = service.handle(&request, NOW).to_json().unwrap();
    assert_eq!(
        json,
        concat!(
            r#"{"nodes":[{"id":"db::query","attributes":{"hot":true,"loc":310.0,"name":"query","params":"sql: Sql"},"depth":0},"#,
            r#"{"id":"db::find_user","attributes":{"loc":42.0,"name":"findUser","params":"id: UserId"},"depth":1}],"#,
            r#""edges":[{"source":"db::find_user","target":"db::query","confidence":1.0,"kind":"calls"}],"#,
            r#""truncated":false,"hops_reached":1,"capabilities_applied":["neighborhood_search"],"#,
            r#""upgrade_hints":[],"warnings":[]}"#
        )
    );
}
