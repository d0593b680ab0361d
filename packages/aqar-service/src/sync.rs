//! Incremental synchronization of listings from the primary store into the
//! search collection.
//!
//! Runs are fenced by a database lease so overlapping schedules and manual
//! triggers cannot interleave batches. Within a run, the watermark cursor
//! advances only past fully accepted batches, so a failed import is retried
//! from the same spot on the next run.

// crates.io
use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;
// self
use aqar_domain::{cursor::SyncCursor, document::SearchDocument, vocab};
use aqar_engine::{CollectionSchema, FieldKind, FieldSchema};
use aqar_storage::{leases, listings, models::ListingRow, sync_state};
use crate::{AqarService, Error, Result};

const LEASE_NAME: &str = "listing_sync";
const SQFT_PER_SQM: f64 = 10.763910416709722;

/// Outcome of one completed run: the cursor it started from, the cursor it
/// left behind and how many documents it pushed.
#[derive(Clone, Debug, Serialize)]
pub struct SyncReport {
	pub ok: bool,
	#[serde(with = "crate::time_serde")]
	pub last_synced_at: OffsetDateTime,
	pub last_property_id: i64,
	#[serde(with = "crate::time_serde")]
	pub new_last_synced_at: OffsetDateTime,
	pub new_last_property_id: i64,
	pub upserted: u64,
}

impl AqarService {
	/// Run one synchronization pass, `force` restarting from the origin
	/// cursor. Returns [`Error::SyncBusy`] without touching anything when
	/// another holder has a live lease.
	pub async fn run_sync(&self, force: bool) -> Result<SyncReport> {
		let owner = Uuid::new_v4().to_string();
		let ttl = self.cfg.sync.lease_ttl_seconds as i64;

		if leases::try_acquire(&self.db, LEASE_NAME, &owner, ttl).await?.is_none() {
			return Err(Error::SyncBusy);
		}

		let outcome = self.sync_under_lease(force).await;

		// An unreleased lease expires on its own after the ttl, so a failed
		// release only delays the next run instead of wedging it.
		if let Err(err) = leases::release(&self.db, LEASE_NAME, &owner).await {
			tracing::warn!(error = %err, "Failed to release the sync lease.");
		}

		outcome
	}

	async fn sync_under_lease(&self, force: bool) -> Result<SyncReport> {
		self.ensure_collection().await?;

		let collection = &self.cfg.storage.engine.collection;
		let batch_size = self.cfg.sync.batch_size;
		let started = if force {
			SyncCursor::ORIGIN
		} else {
			sync_state::load_cursor(&self.db).await?.unwrap_or(SyncCursor::ORIGIN)
		};
		let mut cursor = started;
		let mut upserted = 0_u64;

		loop {
			let rows = listings::changed_since(&self.db, &cursor, batch_size).await?;
			let Some(last) = rows.last() else {
				break;
			};
			let next = cursor.advanced_to(last.changed_at, last.id);
			let documents = rows.iter().map(build_document).collect::<Vec<_>>();
			let report = self.engine.import(collection, &documents).await?;

			if report.failed() > 0 {
				// The cursor stays put so the rejected batch is re-fetched
				// and re-imported by the next run.
				return Err(Error::ImportRejected {
					failed: report.failed(),
					total: documents.len(),
					message: report
						.first_error()
						.unwrap_or("unspecified import error")
						.to_string(),
				});
			}

			upserted += documents.len() as u64;
			cursor = next;

			sync_state::save_cursor(&self.db, &cursor).await?;
			tracing::debug!(
				batch = documents.len(),
				total = upserted,
				"Imported one batch and advanced the cursor."
			);
		}

		Ok(SyncReport {
			ok: true,
			last_synced_at: started.last_synced_at,
			last_property_id: started.last_property_id,
			new_last_synced_at: cursor.last_synced_at,
			new_last_property_id: cursor.last_property_id,
			upserted,
		})
	}

	/// Create the collection on first contact, or add whatever fields the
	/// live one is missing. Existing fields and documents are never touched.
	async fn ensure_collection(&self) -> Result<()> {
		let collection = &self.cfg.storage.engine.collection;
		let schema = listings_schema(collection);

		match self.engine.describe(collection).await? {
			None => {
				self.engine.create(&schema).await?;
				tracing::info!(%collection, "Created the listings collection.");
			},
			Some(live) => {
				let missing = schema
					.fields
					.into_iter()
					.filter(|field| !live.has_field(&field.name))
					.collect::<Vec<_>>();

				if !missing.is_empty() {
					self.engine.add_fields(collection, &missing).await?;
					tracing::info!(
						%collection,
						fields = missing.len(),
						"Added missing collection fields."
					);
				}
			},
		}

		Ok(())
	}
}

/// Project one joined row into its search document. Unknown feature ids are
/// dropped rather than indexed.
fn build_document(row: &ListingRow) -> SearchDocument {
	let features = row
		.feature_ids
		.iter()
		.filter_map(|id| vocab::feature_key_for_id(*id))
		.map(str::to_string)
		.collect();

	SearchDocument {
		id: row.id.to_string(),
		property_id: row.id,
		country_id: row.country_id,
		purpose: row.purpose.clone(),
		property_type_ids: row.property_type_ids.clone(),
		price: row.price,
		bedrooms: row.bedrooms,
		bathrooms: row.bathrooms,
		area_sqft: row.area_sqft,
		area_sqm: row.area_sqft / SQFT_PER_SQM,
		address: row.address.clone(),
		features,
		agent_id: row.agent_id,
		agent_name: row.agent_name.clone(),
		status: row.status.clone(),
		completion_status: row.completion_status.clone(),
		is_off_plan: row.is_off_plan,
		is_featured: row.is_featured,
		featured_rank: row.featured_rank,
		image_urls: row.image_urls.clone(),
		created_at: row.created_at.unix_timestamp(),
		updated_at: row.updated_at.unix_timestamp(),
	}
}

/// Engine schema for the listings collection. New fields go at the end;
/// reconciliation adds them to live collections by name.
fn listings_schema(name: &str) -> CollectionSchema {
	CollectionSchema {
		name: name.to_string(),
		fields: vec![
			FieldSchema::required("property_id", FieldKind::Int64),
			FieldSchema::required("country_id", FieldKind::Int32),
			FieldSchema::required("purpose", FieldKind::String),
			FieldSchema::required("property_type_ids", FieldKind::Int32Array),
			FieldSchema::required("price", FieldKind::Int64),
			FieldSchema::required("bedrooms", FieldKind::Int32),
			FieldSchema::required("bathrooms", FieldKind::Int32),
			FieldSchema::required("area_sqft", FieldKind::Float),
			FieldSchema::required("area_sqm", FieldKind::Float),
			FieldSchema::required("address", FieldKind::String),
			FieldSchema::required("features", FieldKind::StringArray),
			FieldSchema::optional("agent_id", FieldKind::Int64),
			FieldSchema::optional("agent_name", FieldKind::String),
			FieldSchema::required("status", FieldKind::String),
			FieldSchema::required("completion_status", FieldKind::String),
			FieldSchema::required("is_off_plan", FieldKind::Bool),
			FieldSchema::required("is_featured", FieldKind::Bool),
			FieldSchema::required("featured_rank", FieldKind::Int32),
			FieldSchema::required("image_urls", FieldKind::StringArray),
			FieldSchema::required("created_at", FieldKind::Int64),
			FieldSchema::required("updated_at", FieldKind::Int64),
		],
	}
}
