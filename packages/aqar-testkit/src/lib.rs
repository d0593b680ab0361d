//! Throwaway infrastructure for integration tests.
//!
//! Tests that need Postgres create a [`TestDatabase`], which provisions a
//! uniquely named database and drops it again on cleanup. Engine collections
//! registered through [`TestDatabase::collection_name`] are deleted from the
//! engine at `AQAR_ENGINE_URL`, when that variable is set.

mod error;

pub use error::{Error, Result};

use std::{
	collections::HashSet,
	env,
	future::Future,
	str::FromStr,
	sync::{Mutex, MutexGuard},
	thread,
	time::Duration,
};

use sqlx::{
	ConnectOptions, Connection, Executor,
	postgres::{PgConnectOptions, PgConnection},
};
use tokio::{runtime::Builder, time};
use uuid::Uuid;

const ADMIN_DATABASES: [&str; 2] = ["postgres", "template1"];

pub struct TestDatabase {
	name: String,
	dsn: String,
	admin_options: PgConnectOptions,
	cleaned: bool,
	collections: Mutex<HashSet<String>>,
}
impl TestDatabase {
	pub async fn new(base_dsn: &str) -> Result<Self> {
		let base_options = PgConnectOptions::from_str(base_dsn)
			.map_err(|err| Error::Message(format!("Failed to parse AQAR_PG_DSN: {err}.")))?;
		let (admin_options, mut admin_conn) = connect_admin(&base_options).await?;
		let name = format!("aqar_test_{}", Uuid::new_v4().simple());

		admin_conn
			.execute(format!(r#"CREATE DATABASE "{name}""#).as_str())
			.await
			.map_err(|err| Error::Message(format!("Failed to create test database: {err}.")))?;

		let dsn = base_options.database(&name).to_url_lossy().to_string();

		Ok(Self {
			name,
			dsn,
			admin_options,
			cleaned: false,
			collections: Mutex::new(HashSet::new()),
		})
	}

	pub fn dsn(&self) -> &str {
		&self.dsn
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	/// Returns `{prefix}_{database name}` and registers it for engine cleanup.
	pub fn collection_name(&self, prefix: &str) -> String {
		let collection = format!("{prefix}_{}", self.name);

		self.lock_collections().insert(collection.clone());

		collection
	}

	pub async fn cleanup(mut self) -> Result<()> {
		self.cleanup_inner().await
	}

	async fn cleanup_inner(&mut self) -> Result<()> {
		if self.cleaned {
			return Ok(());
		}

		let collections = self.tracked_collections();
		let db_result = cleanup_database(&self.name, &self.admin_options).await;
		let engine_result = cleanup_engine_collections(&collections).await;

		db_result?;
		engine_result?;

		self.cleaned = true;

		Ok(())
	}

	fn tracked_collections(&self) -> Vec<String> {
		self.lock_collections().iter().cloned().collect()
	}

	fn lock_collections(&self) -> MutexGuard<'_, HashSet<String>> {
		self.collections.lock().unwrap_or_else(|err| err.into_inner())
	}
}
impl Drop for TestDatabase {
	fn drop(&mut self) {
		if self.cleaned {
			return;
		}

		let name = self.name.clone();
		let admin_options = self.admin_options.clone();
		let collections = self.tracked_collections();
		// Drops may run inside a reactor that must not be re-entered, so
		// cleanup gets its own runtime on its own thread.
		let cleanup = thread::spawn(move || {
			let runtime = match Builder::new_current_thread().enable_all().build() {
				Ok(runtime) => runtime,
				Err(err) => {
					eprintln!("Test database cleanup failed: {err}.");

					return;
				},
			};

			if let Err(err) = runtime.block_on(cleanup_engine_collections(&collections)) {
				eprintln!("Test engine cleanup failed: {err}.");
			}
			if let Err(err) = runtime.block_on(cleanup_database(&name, &admin_options)) {
				eprintln!("Test database cleanup failed: {err}.");
			}
		});
		let _ = cleanup.join();
	}
}

pub fn env_dsn() -> Option<String> {
	env::var("AQAR_PG_DSN").ok()
}

pub fn env_engine_url() -> Option<String> {
	env::var("AQAR_ENGINE_URL").ok()
}

pub fn env_engine_key() -> Option<String> {
	env::var("AQAR_ENGINE_KEY").ok()
}

pub async fn with_test_db<F, Fut, T>(base_dsn: &str, f: F) -> Result<T>
where
	F: FnOnce(&TestDatabase) -> Fut,
	Fut: Future<Output = Result<T>>,
{
	let mut db = TestDatabase::new(base_dsn).await?;
	let result = f(&db).await;

	if let Err(err) = db.cleanup_inner().await {
		eprintln!("Test database cleanup warning: {err}.");

		if result.is_ok() {
			return Err(err);
		}
	}

	result
}

async fn connect_admin(
	base_options: &PgConnectOptions,
) -> Result<(PgConnectOptions, PgConnection)> {
	let mut last_err = None;

	for database in ADMIN_DATABASES {
		let options = base_options.clone().database(database);

		match PgConnection::connect_with(&options).await {
			Ok(conn) => return Ok((options, conn)),
			Err(err) => last_err = Some(err),
		}
	}

	Err(Error::Message(format!("Failed to connect to an admin database: {last_err:?}.")))
}

async fn cleanup_database(name: &str, admin_options: &PgConnectOptions) -> Result<()> {
	let mut conn = PgConnection::connect_with(admin_options).await.map_err(|err| {
		Error::Message(format!("Failed to connect to admin database for cleanup: {err}."))
	})?;
	// Lingering pool connections would otherwise block the drop.
	let _ = sqlx::query(
		"\
SELECT pg_terminate_backend(pid)
FROM pg_stat_activity
WHERE datname = $1 AND pid <> pg_backend_pid()",
	)
	.bind(name)
	.fetch_all(&mut conn)
	.await;

	sqlx::query(format!(r#"DROP DATABASE IF EXISTS "{name}""#).as_str())
		.execute(&mut conn)
		.await
		.map_err(|err| Error::Message(format!("Failed to drop test database: {err}.")))?;

	Ok(())
}

async fn cleanup_engine_collections(collections: &[String]) -> Result<()> {
	if collections.is_empty() {
		return Ok(());
	}

	let Some(engine_url) = env_engine_url() else {
		eprintln!("Skipping engine cleanup; set AQAR_ENGINE_URL to delete test collections.");

		return Ok(());
	};
	let engine_url = engine_url.trim_end_matches('/').to_string();
	let api_key = env_engine_key().unwrap_or_default();
	let client = reqwest::Client::builder()
		.timeout(Duration::from_secs(10))
		.build()
		.map_err(|err| Error::Message(format!("Failed to build engine client: {err}.")))?;
	let max_attempts = 6;
	let mut remaining = collections.iter().cloned().collect::<HashSet<_>>();
	let mut backoff = Duration::from_millis(100);

	for attempt in 1..=max_attempts {
		for collection in remaining.clone() {
			let response = client
				.delete(format!("{engine_url}/collections/{collection}"))
				.header("x-api-key", &api_key)
				.send()
				.await;

			match response {
				Ok(response)
					if response.status().is_success()
						|| response.status() == reqwest::StatusCode::NOT_FOUND =>
				{
					remaining.remove(&collection);
				},
				Ok(response) =>
					if attempt == max_attempts {
						return Err(Error::Message(format!(
							"Failed to delete engine collection {collection:?} after {attempt} attempts: status {}.",
							response.status()
						)));
					},
				Err(err) =>
					if attempt == max_attempts {
						return Err(Error::Message(format!(
							"Failed to delete engine collection {collection:?} after {attempt} attempts: {err}."
						)));
					},
			}
		}

		if remaining.is_empty() {
			return Ok(());
		}

		time::sleep(backoff).await;

		backoff = backoff.saturating_mul(2).min(Duration::from_secs(2));
	}

	Ok(())
}
