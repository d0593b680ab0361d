use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	#[serde(default)]
	pub sync: Synchronization,
	#[serde(default)]
	pub search: Search,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
	pub engine: Engine,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

/// Connection settings for the search engine's HTTP API.
#[derive(Clone, Debug, Deserialize)]
pub struct Engine {
	pub url: String,
	pub api_key: String,
	pub collection: String,
	#[serde(default = "default_engine_timeout_ms")]
	pub timeout_ms: u64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Synchronization {
	/// Rows fetched and imported per batch; the cursor advances once per
	/// batch, so this also bounds re-imported work after a failed run.
	#[serde(default = "default_batch_size")]
	pub batch_size: u32,
	#[serde(default = "default_lease_ttl_seconds")]
	pub lease_ttl_seconds: u64,
	#[serde(default = "default_interval_seconds")]
	pub interval_seconds: u64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Search {
	#[serde(default = "default_page_size")]
	pub default_page_size: u32,
	#[serde(default = "default_max_page_size")]
	pub max_page_size: u32,
	/// Upper bound on how many featured listings the tiered blend will
	/// consider; a runaway featured tier must not stall count passes.
	#[serde(default = "default_featured_tier_cap")]
	pub featured_tier_cap: u32,
}

impl Default for Synchronization {
	fn default() -> Self {
		Self {
			batch_size: default_batch_size(),
			lease_ttl_seconds: default_lease_ttl_seconds(),
			interval_seconds: default_interval_seconds(),
		}
	}
}

impl Default for Search {
	fn default() -> Self {
		Self {
			default_page_size: default_page_size(),
			max_page_size: default_max_page_size(),
			featured_tier_cap: default_featured_tier_cap(),
		}
	}
}

fn default_engine_timeout_ms() -> u64 {
	5_000
}

fn default_batch_size() -> u32 {
	200
}

fn default_lease_ttl_seconds() -> u64 {
	120
}

fn default_interval_seconds() -> u64 {
	300
}

fn default_page_size() -> u32 {
	10
}

fn default_max_page_size() -> u32 {
	50
}

fn default_featured_tier_cap() -> u32 {
	250
}
