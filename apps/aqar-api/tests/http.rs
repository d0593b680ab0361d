use axum::{
	body::{self, Body},
	http::{Request, StatusCode},
};
use time::{OffsetDateTime, macros::datetime};
use tower::util::ServiceExt;

use aqar_api::{routes, state::AppState};
use aqar_config::{Config, Engine, Postgres, Search, Service, Storage, Synchronization};
use aqar_storage::db::Db;
use aqar_testkit::TestDatabase;

fn test_config(dsn: String, engine_url: String, api_key: String, collection: String) -> Config {
	Config {
		service: Service { http_bind: "127.0.0.1:0".to_string(), log_level: "info".to_string() },
		storage: Storage {
			postgres: Postgres { dsn, pool_max_conns: 1 },
			engine: Engine { url: engine_url, api_key, collection, timeout_ms: 5_000 },
		},
		sync: Synchronization { batch_size: 100, lease_ttl_seconds: 60, interval_seconds: 300 },
		search: Search { default_page_size: 10, max_page_size: 50, featured_tier_cap: 250 },
	}
}

async fn pg_state(collection: &str) -> Option<(TestDatabase, AppState)> {
	let Some(base_dsn) = aqar_testkit::env_dsn() else {
		eprintln!("Skipping HTTP tests; set AQAR_PG_DSN to run this test.");

		return None;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	// The engine endpoint is never reached by these tests.
	let config = test_config(
		test_db.dsn().to_string(),
		"http://127.0.0.1:1".to_string(),
		"test".to_string(),
		collection.to_string(),
	);
	let state = AppState::new(config).await.expect("Failed to initialize app state.");

	Some((test_db, state))
}

async fn insert_agent(db: &Db, agent_id: i64, name: &str, updated_at: OffsetDateTime) {
	sqlx::query("INSERT INTO agents (agent_id, name, updated_at) VALUES ($1, $2, $3)")
		.bind(agent_id)
		.bind(name)
		.bind(updated_at)
		.execute(&db.pool)
		.await
		.expect("Failed to insert agent.");
}

async fn insert_listing(db: &Db, id: i64, agent_id: Option<i64>, updated_at: OffsetDateTime) {
	sqlx::query(
		"\
INSERT INTO listings (
\tid, country_id, purpose, property_type_ids, price, bedrooms, bathrooms, area_sqft,
\taddress, feature_ids, agent_id, status, completion_status, is_off_plan, is_featured,
\tfeatured_rank, created_at, updated_at
) VALUES ($1, 1, 'buy', $2, 1500000, 2, 2, 1200, 'Marina Walk', $3, $4, 'active', 'ready',
\tFALSE, FALSE, 0, $5, $5)",
	)
	.bind(id)
	.bind(vec![1_i32])
	.bind(vec![2_i32])
	.bind(agent_id)
	.bind(updated_at)
	.execute(&db.pool)
	.await
	.expect("Failed to insert listing.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set AQAR_PG_DSN to run."]
async fn health_ok() {
	let Some((test_db, state)) = pg_state("aqar_http_health").await else {
		return;
	};
	let app = routes::router(state);
	let response = app
		.oneshot(
			Request::builder()
				.uri("/health")
				.body(Body::empty())
				.expect("Failed to build request."),
		)
		.await
		.expect("Failed to call /health.");

	assert_eq!(response.status(), StatusCode::OK);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set AQAR_PG_DSN to run."]
async fn search_rejects_page_zero() {
	let Some((test_db, state)) = pg_state("aqar_http_reject").await else {
		return;
	};
	let app = routes::router(state);
	let payload = serde_json::json!({
		"purpose": "buy",
		"country_id": 1,
		"page": 0
	});
	let response = app
		.oneshot(
			Request::builder()
				.method("POST")
				.uri("/v1/search")
				.header("content-type", "application/json")
				.body(Body::from(payload.to_string()))
				.expect("Failed to build request."),
		)
		.await
		.expect("Failed to call /v1/search.");

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);

	let body = body::to_bytes(response.into_body(), usize::MAX)
		.await
		.expect("Failed to read response body.");
	let json: serde_json::Value = serde_json::from_slice(&body).expect("Failed to parse response.");

	assert_eq!(json["error_code"], "invalid_request");

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres and a search engine. Set AQAR_PG_DSN and AQAR_ENGINE_URL to run."]
async fn sync_then_search_round_trip() {
	let Some(base_dsn) = aqar_testkit::env_dsn() else {
		eprintln!("Skipping sync_then_search_round_trip; set AQAR_PG_DSN to run this test.");

		return;
	};
	let Some(engine_url) = aqar_testkit::env_engine_url() else {
		eprintln!("Skipping sync_then_search_round_trip; set AQAR_ENGINE_URL to run this test.");

		return;
	};
	let api_key = aqar_testkit::env_engine_key().unwrap_or_else(|| "test".to_string());
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let collection = test_db.collection_name("aqar_http");
	let config = test_config(test_db.dsn().to_string(), engine_url, api_key, collection);
	let state = AppState::new(config).await.expect("Failed to initialize app state.");
	let app = routes::router(state.clone());
	let db = &state.service.db;
	let listed_at = datetime!(2024-05-01 10:00 UTC);

	insert_agent(db, 1, "Amira Hassan", datetime!(2024-05-01 09:00 UTC)).await;
	insert_listing(db, 1, Some(1), listed_at).await;
	insert_listing(db, 2, None, listed_at).await;

	let response = app
		.clone()
		.oneshot(
			Request::builder()
				.method("POST")
				.uri("/v1/sync/run")
				.header("content-type", "application/json")
				.body(Body::from(r#"{"force": false}"#))
				.expect("Failed to build request."),
		)
		.await
		.expect("Failed to call /v1/sync/run.");

	assert_eq!(response.status(), StatusCode::OK);

	let body = body::to_bytes(response.into_body(), usize::MAX)
		.await
		.expect("Failed to read response body.");
	let report: serde_json::Value =
		serde_json::from_slice(&body).expect("Failed to parse response.");

	assert_eq!(report["ok"], true);
	assert_eq!(report["upserted"], 2);
	assert_eq!(report["new_last_property_id"], 2);

	let payload = serde_json::json!({
		"purpose": "buy",
		"country_id": 1
	});
	let response = app
		.clone()
		.oneshot(
			Request::builder()
				.method("POST")
				.uri("/v1/search")
				.header("content-type", "application/json")
				.body(Body::from(payload.to_string()))
				.expect("Failed to build request."),
		)
		.await
		.expect("Failed to call /v1/search.");

	assert_eq!(response.status(), StatusCode::OK);

	let body = body::to_bytes(response.into_body(), usize::MAX)
		.await
		.expect("Failed to read response body.");
	let found: serde_json::Value =
		serde_json::from_slice(&body).expect("Failed to parse response.");

	assert_eq!(found["total_found"], 2);
	assert_eq!(found["items"].as_array().map(Vec::len), Some(2));

	// Re-importing the same rows is an id-keyed upsert; the collection must
	// not grow.
	let response = app
		.clone()
		.oneshot(
			Request::builder()
				.method("POST")
				.uri("/v1/sync/run")
				.header("content-type", "application/json")
				.body(Body::from(r#"{"force": true}"#))
				.expect("Failed to build request."),
		)
		.await
		.expect("Failed to call /v1/sync/run.");

	assert_eq!(response.status(), StatusCode::OK);

	let body = body::to_bytes(response.into_body(), usize::MAX)
		.await
		.expect("Failed to read response body.");
	let report: serde_json::Value =
		serde_json::from_slice(&body).expect("Failed to parse response.");

	assert_eq!(report["upserted"], 2);

	let response = app
		.oneshot(
			Request::builder()
				.method("POST")
				.uri("/v1/search")
				.header("content-type", "application/json")
				.body(Body::from(payload.to_string()))
				.expect("Failed to build request."),
		)
		.await
		.expect("Failed to call /v1/search.");

	assert_eq!(response.status(), StatusCode::OK);

	let body = body::to_bytes(response.into_body(), usize::MAX)
		.await
		.expect("Failed to read response body.");
	let found: serde_json::Value =
		serde_json::from_slice(&body).expect("Failed to parse response.");

	assert_eq!(found["total_found"], 2);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
