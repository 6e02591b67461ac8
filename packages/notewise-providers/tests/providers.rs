use std::{
	future::IntoFuture,
	sync::{
		Arc, Mutex,
		atomic::{AtomicUsize, Ordering},
	},
	time::{Duration, Instant},
};

use axum::{
	Json, Router,
	extract::State,
	http::{HeaderMap, StatusCode},
	response::IntoResponse,
	routing,
};
use reqwest::header::AUTHORIZATION;
use serde_json::{Map, Value};
use tokio::{
	net::TcpListener,
	sync::{oneshot, oneshot::Sender},
};

use notewise_config::EmbeddingProviderConfig;
use notewise_providers::{Error, embedding::EmbeddingClient};

struct MockEmbeddings {
	calls: AtomicUsize,
	/// Status codes returned, in order, before the endpoint starts answering successfully.
	failures: Vec<StatusCode>,
	dimensions: usize,
	last_auth: Mutex<Option<String>>,
	last_body: Mutex<Option<Value>>,
}
impl MockEmbeddings {
	fn new(failures: Vec<StatusCode>, dimensions: usize) -> Arc<Self> {
		Arc::new(Self {
			calls: AtomicUsize::new(0),
			failures,
			dimensions,
			last_auth: Mutex::new(None),
			last_body: Mutex::new(None),
		})
	}

	fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}

async fn embed_handler(
	State(mock): State<Arc<MockEmbeddings>>,
	headers: HeaderMap,
	Json(payload): Json<Value>,
) -> impl IntoResponse {
	let call_index = mock.calls.fetch_add(1, Ordering::SeqCst);

	*mock.last_auth.lock().expect("Mock lock poisoned.") = headers
		.get(AUTHORIZATION)
		.and_then(|value| value.to_str().ok())
		.map(ToString::to_string);
	*mock.last_body.lock().expect("Mock lock poisoned.") = Some(payload);

	if let Some(status) = mock.failures.get(call_index) {
		return (*status, "upstream unavailable").into_response();
	}

	let embedding: Vec<f32> = (0..mock.dimensions).map(|i| i as f32 * 0.5).collect();

	(
		StatusCode::OK,
		Json(serde_json::json!({ "data": [{ "index": 0, "embedding": embedding }] })),
	)
		.into_response()
}

async fn start_embed_server(mock: Arc<MockEmbeddings>) -> (String, Sender<()>) {
	let app = Router::new().route("/embeddings", routing::post(embed_handler)).with_state(mock);
	let listener = TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind embed server.");
	let addr = listener.local_addr().expect("Failed to read embed server address.");
	let (tx, rx) = oneshot::channel();
	let server = axum::serve(listener, app).with_graceful_shutdown(async move {
		let _ = rx.await;
	});

	tokio::spawn(async move {
		let _ = server.into_future().await;
	});

	(format!("http://{addr}"), tx)
}

fn provider_config(api_base: String, dimensions: u32) -> EmbeddingProviderConfig {
	EmbeddingProviderConfig {
		provider_id: "mock".to_string(),
		api_base,
		api_key: "secret".to_string(),
		path: "/embeddings".to_string(),
		model: "text-embedding-3-small".to_string(),
		dimensions,
		timeout_ms: 2_000,
		max_input_chars: 64,
		max_attempts: 3,
		retry_backoff_ms: 1,
		default_headers: Map::new(),
	}
}

#[test]
fn builds_bearer_auth_header() {
	let headers =
		notewise_providers::auth_headers("secret", &Map::new()).expect("Failed to build headers.");
	let value = headers.get(AUTHORIZATION).expect("Missing authorization header.");

	assert_eq!(value, "Bearer secret");
}

#[test]
fn rejects_non_string_default_header() {
	let mut extra = Map::new();

	extra.insert("x-team".to_string(), Value::from(7));

	let err = notewise_providers::auth_headers("secret", &extra)
		.expect_err("Expected invalid header config.");

	assert!(matches!(err, Error::InvalidConfig { .. }), "Unexpected error: {err:?}");
}

#[tokio::test]
async fn embeds_single_text() {
	let mock = MockEmbeddings::new(Vec::new(), 4);
	let (api_base, shutdown) = start_embed_server(mock.clone()).await;
	let cfg = provider_config(api_base, 4);
	let client = EmbeddingClient::new(&cfg).expect("Failed to build client.");
	let vector = client.embed(&cfg, "graph algorithms").await.expect("Embedding failed.");

	assert_eq!(vector, vec![0.0, 0.5, 1.0, 1.5]);
	assert_eq!(mock.calls(), 1);
	assert_eq!(
		mock.last_auth.lock().expect("Mock lock poisoned.").as_deref(),
		Some("Bearer secret")
	);

	let body = mock.last_body.lock().expect("Mock lock poisoned.").clone().expect("No body.");

	assert_eq!(body["model"], "text-embedding-3-small");
	assert_eq!(body["input"], serde_json::json!(["graph algorithms"]));
	assert_eq!(body["dimensions"], 4);

	let _ = shutdown.send(());
}

#[tokio::test]
async fn retries_throttled_requests() {
	let mock = MockEmbeddings::new(
		vec![StatusCode::TOO_MANY_REQUESTS, StatusCode::SERVICE_UNAVAILABLE],
		4,
	);
	let (api_base, shutdown) = start_embed_server(mock.clone()).await;
	let cfg = provider_config(api_base, 4);
	let client = EmbeddingClient::new(&cfg).expect("Failed to build client.");
	let vector = client.embed(&cfg, "retry me").await.expect("Embedding should recover.");

	assert_eq!(vector.len(), 4);
	assert_eq!(mock.calls(), 3);

	let _ = shutdown.send(());
}

#[tokio::test]
async fn gives_up_after_max_attempts() {
	let mock = MockEmbeddings::new(vec![StatusCode::INTERNAL_SERVER_ERROR; 10], 4);
	let (api_base, shutdown) = start_embed_server(mock.clone()).await;
	let cfg = provider_config(api_base, 4);
	let client = EmbeddingClient::new(&cfg).expect("Failed to build client.");
	let err = client.embed(&cfg, "still broken").await.expect_err("Expected failure.");

	assert!(
		matches!(err, Error::Status { status: StatusCode::INTERNAL_SERVER_ERROR, .. }),
		"Unexpected error: {err:?}"
	);
	assert_eq!(mock.calls(), 3);

	let _ = shutdown.send(());
}

#[tokio::test]
async fn client_errors_are_not_retried() {
	let mock = MockEmbeddings::new(vec![StatusCode::UNAUTHORIZED], 4);
	let (api_base, shutdown) = start_embed_server(mock.clone()).await;
	let cfg = provider_config(api_base, 4);
	let client = EmbeddingClient::new(&cfg).expect("Failed to build client.");
	let err = client.embed(&cfg, "bad key").await.expect_err("Expected failure.");

	assert!(!err.is_transient());
	assert_eq!(mock.calls(), 1);

	let _ = shutdown.send(());
}

#[tokio::test]
async fn wrong_dimensions_are_invalid() {
	let mock = MockEmbeddings::new(Vec::new(), 3);
	let (api_base, shutdown) = start_embed_server(mock.clone()).await;
	let cfg = provider_config(api_base, 4);
	let client = EmbeddingClient::new(&cfg).expect("Failed to build client.");
	let err = client.embed(&cfg, "short vector").await.expect_err("Expected failure.");

	assert!(matches!(err, Error::InvalidResponse { .. }), "Unexpected error: {err:?}");

	let _ = shutdown.send(());
}

#[tokio::test]
async fn rejected_inputs_never_reach_the_provider() {
	let mock = MockEmbeddings::new(Vec::new(), 4);
	let (api_base, shutdown) = start_embed_server(mock.clone()).await;
	let cfg = provider_config(api_base, 4);
	let client = EmbeddingClient::new(&cfg).expect("Failed to build client.");

	assert!(matches!(client.embed(&cfg, "").await, Err(Error::EmptyInput)));
	assert!(matches!(
		client.embed(&cfg, &"x".repeat(65)).await,
		Err(Error::InputTooLarge { chars: 65, limit: 64 })
	));
	assert_eq!(mock.calls(), 0);

	let _ = shutdown.send(());
}

#[tokio::test]
async fn whitespace_input_is_embedded() {
	let mock = MockEmbeddings::new(Vec::new(), 4);
	let (api_base, shutdown) = start_embed_server(mock.clone()).await;
	let cfg = provider_config(api_base, 4);
	let client = EmbeddingClient::new(&cfg).expect("Failed to build client.");
	let vector = client.embed(&cfg, "\n").await.expect("Whitespace input must embed.");

	assert_eq!(vector.len(), 4);
	assert_eq!(mock.calls(), 1);

	let body = mock.last_body.lock().expect("Mock lock poisoned.").clone().expect("Body recorded.");

	assert_eq!(body["input"], serde_json::json!(["\n"]));

	let _ = shutdown.send(());
}

#[tokio::test]
async fn malformed_requests_are_not_retried() {
	let mut cfg = provider_config("not a url".to_string(), 4);

	cfg.retry_backoff_ms = 60_000;

	let client = EmbeddingClient::new(&cfg).expect("Failed to build client.");
	let started = Instant::now();
	let err = client.embed(&cfg, "text").await.expect_err("Expected failure.");

	assert!(matches!(err, Error::Reqwest(_)), "Unexpected error: {err:?}");
	assert!(!err.is_transient(), "Unexpected transient error: {err:?}");
	assert!(started.elapsed() < Duration::from_secs(30));
}
