use std::{
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use toml::Value;

use aqar_config::{Config, Error};

const SAMPLE_CONFIG_TEMPLATE_TOML: &str = include_str!("fixtures/sample_config.template.toml");

fn sample_toml_with<F>(mutate: F) -> String
where
	F: FnOnce(&mut toml::Table),
{
	let mut value: Value =
		toml::from_str(SAMPLE_CONFIG_TEMPLATE_TOML).expect("Failed to parse template config.");
	let root = value.as_table_mut().expect("Template config must be a table.");

	mutate(root);

	toml::to_string(&value).expect("Failed to render template config.")
}

fn write_temp_config(payload: String) -> PathBuf {
	static COUNTER: AtomicU64 = AtomicU64::new(0);

	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("System time must be valid.")
		.as_nanos();
	let ordinal = COUNTER.fetch_add(1, Ordering::SeqCst);
	let pid = std::process::id();
	let mut path = env::temp_dir();

	path.push(format!("aqar_config_test_{nanos}_{pid}_{ordinal}.toml"));

	fs::write(&path, payload).expect("Failed to write test config.");

	path
}

fn load(payload: String) -> aqar_config::Result<Config> {
	let path = write_temp_config(payload);
	let result = aqar_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	result
}

fn base_config() -> Config {
	toml::from_str(SAMPLE_CONFIG_TEMPLATE_TOML).expect("Failed to parse test config.")
}

fn section<'a>(root: &'a mut toml::Table, name: &str) -> &'a mut toml::Table {
	root.get_mut(name)
		.and_then(Value::as_table_mut)
		.unwrap_or_else(|| panic!("Template config must include [{name}]."))
}

#[test]
fn template_config_is_valid() {
	assert!(aqar_config::validate(&base_config()).is_ok());
}

#[test]
fn http_bind_must_be_non_empty() {
	let payload = sample_toml_with(|root| {
		section(root, "service").insert("http_bind".to_string(), Value::String("  ".to_string()));
	});
	let err = load(payload).expect_err("Expected http_bind validation error.");

	assert!(
		err.to_string().contains("service.http_bind must be non-empty."),
		"Unexpected error: {err}"
	);
}

#[test]
fn engine_api_key_must_be_non_empty() {
	let payload = sample_toml_with(|root| {
		let storage = section(root, "storage");
		let engine = storage
			.get_mut("engine")
			.and_then(Value::as_table_mut)
			.expect("Template config must include [storage.engine].");

		engine.insert("api_key".to_string(), Value::String(String::new()));
	});
	let err = load(payload).expect_err("Expected api_key validation error.");

	assert!(
		err.to_string().contains("storage.engine.api_key must be non-empty."),
		"Unexpected error: {err}"
	);
}

#[test]
fn batch_size_must_be_positive() {
	let payload = sample_toml_with(|root| {
		section(root, "sync").insert("batch_size".to_string(), Value::Integer(0));
	});
	let err = load(payload).expect_err("Expected batch_size validation error.");

	assert!(
		err.to_string().contains("sync.batch_size must be greater than zero."),
		"Unexpected error: {err}"
	);
}

#[test]
fn max_page_size_cannot_undercut_the_default() {
	let mut cfg = base_config();

	cfg.search.default_page_size = 30;
	cfg.search.max_page_size = 20;

	let err = aqar_config::validate(&cfg).expect_err("Expected page size validation error.");

	assert!(
		err.to_string().contains("search.max_page_size must be at least search.default_page_size."),
		"Unexpected error: {err}"
	);
}

#[test]
fn featured_tier_cap_must_be_positive() {
	let mut cfg = base_config();

	cfg.search.featured_tier_cap = 0;

	assert!(aqar_config::validate(&cfg).is_err());
}

#[test]
fn sync_and_search_sections_are_optional_with_defaults() {
	let payload = sample_toml_with(|root| {
		root.remove("sync");
		root.remove("search");
	});
	let cfg = load(payload).expect("Expected defaults to satisfy validation.");

	assert_eq!(cfg.sync.batch_size, 200);
	assert_eq!(cfg.sync.lease_ttl_seconds, 120);
	assert_eq!(cfg.search.default_page_size, 10);
	assert_eq!(cfg.search.max_page_size, 50);
	assert_eq!(cfg.search.featured_tier_cap, 250);
}

#[test]
fn engine_url_loses_its_trailing_slash() {
	let payload = sample_toml_with(|root| {
		let storage = section(root, "storage");
		let engine = storage
			.get_mut("engine")
			.and_then(Value::as_table_mut)
			.expect("Template config must include [storage.engine].");

		engine.insert("url".to_string(), Value::String("http://localhost:8108/".to_string()));
	});
	let cfg = load(payload).expect("Expected config to load.");

	assert_eq!(cfg.storage.engine.url, "http://localhost:8108");
}

#[test]
fn missing_storage_engine_is_a_parse_error() {
	let payload = sample_toml_with(|root| {
		section(root, "storage").remove("engine");
	});
	let err = load(payload).expect_err("Expected missing engine parse error.");
	let message = match err {
		Error::Parse { source, .. } => source.to_string(),
		err => panic!("Expected parse config error, got {err}"),
	};

	assert!(message.contains("missing field `engine`"), "Unexpected error: {message}");
}

#[test]
fn aqar_example_toml_is_valid() {
	let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));

	path.push("../../aqar.example.toml");

	aqar_config::load(&path).expect("Expected aqar.example.toml to be a valid config.");
}
