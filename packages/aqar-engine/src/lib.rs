//! Document search engine abstraction and its HTTP implementation.
//!
//! The engine stores flat JSON documents in named collections and answers
//! filtered, sorted keyword searches over them. Everything the rest of the
//! system needs is expressed through [`SearchEngine`] so services and tests
//! can swap the real backend for an in-memory one.

pub mod http;

mod error;
pub use error::{Error, Result};

// std
use std::{future::Future, pin::Pin};
// crates.io
use serde::{Deserialize, Serialize};
// self
use aqar_domain::document::SearchDocument;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Operations the indexer and the search service need from a document engine.
///
/// Implementations must be safe to call concurrently. All operations are
/// idempotent except [`SearchEngine::create`], which fails if the collection
/// already exists.
pub trait SearchEngine
where
	Self: Send + Sync,
{
	/// Fetch the live definition of a collection, or `None` if it does not
	/// exist yet.
	fn describe<'a>(&'a self, collection: &'a str) -> BoxFuture<'a, Result<Option<CollectionInfo>>>;

	fn create<'a>(&'a self, schema: &'a CollectionSchema) -> BoxFuture<'a, Result<()>>;

	/// Add fields to an existing collection.
	///
	/// Additive only. Existing fields and documents are never touched, so a
	/// newer writer can extend the schema while older readers keep working.
	fn add_fields<'a>(
		&'a self,
		collection: &'a str,
		fields: &'a [FieldSchema],
	) -> BoxFuture<'a, Result<()>>;

	/// Upsert a batch of documents keyed by their `id` field.
	///
	/// The report carries one outcome per input document, in order. A failed
	/// document never aborts the rest of the batch on the engine side.
	fn import<'a>(
		&'a self,
		collection: &'a str,
		documents: &'a [SearchDocument],
	) -> BoxFuture<'a, Result<ImportReport>>;

	fn search<'a>(
		&'a self,
		collection: &'a str,
		call: &'a SearchCall,
	) -> BoxFuture<'a, Result<SearchPage>>;
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct CollectionSchema {
	pub name: String,
	pub fields: Vec<FieldSchema>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct FieldSchema {
	pub name: String,
	#[serde(rename = "type")]
	pub kind: FieldKind,
	#[serde(default)]
	pub optional: bool,
}
impl FieldSchema {
	pub fn required(name: &str, kind: FieldKind) -> Self {
		Self { name: name.into(), kind, optional: false }
	}

	pub fn optional(name: &str, kind: FieldKind) -> Self {
		Self { name: name.into(), kind, optional: true }
	}
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub enum FieldKind {
	#[serde(rename = "string")]
	String,
	#[serde(rename = "string[]")]
	StringArray,
	#[serde(rename = "int32")]
	Int32,
	#[serde(rename = "int32[]")]
	Int32Array,
	#[serde(rename = "int64")]
	Int64,
	#[serde(rename = "float")]
	Float,
	#[serde(rename = "bool")]
	Bool,
}

/// What the engine reports about an existing collection.
///
/// Field kinds come back as plain strings so an engine upgrade that introduces
/// new types cannot break deserialization. Schema reconciliation compares
/// field names only.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct CollectionInfo {
	pub name: String,
	#[serde(default)]
	pub num_documents: u64,
	#[serde(default)]
	pub fields: Vec<LiveField>,
}
impl CollectionInfo {
	pub fn has_field(&self, name: &str) -> bool {
		self.fields.iter().any(|f| f.name == name)
	}
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct LiveField {
	pub name: String,
	#[serde(rename = "type")]
	pub kind: String,
}

/// Per-document outcomes of one import batch, in input order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ImportReport {
	pub outcomes: Vec<ImportOutcome>,
}
impl ImportReport {
	pub fn imported(&self) -> usize {
		self.outcomes.iter().filter(|o| o.success).count()
	}

	pub fn failed(&self) -> usize {
		self.outcomes.len() - self.imported()
	}

	pub fn first_error(&self) -> Option<&str> {
		self.outcomes
			.iter()
			.find(|o| !o.success)
			.map(|o| o.error.as_deref().unwrap_or("unspecified import error"))
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct ImportOutcome {
	pub success: bool,
	pub error: Option<String>,
}

/// One search request against a collection.
///
/// `filter_by` and `sort_by` use the engine's textual expression syntax and
/// are sent verbatim. Empty strings mean "not set". Either `page`/`per_page`
/// or `offset`/`limit` positions the window, not both.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchCall {
	pub query: String,
	pub query_by: String,
	pub filter_by: String,
	pub sort_by: String,
	pub page: Option<u32>,
	pub per_page: Option<u32>,
	pub offset: Option<u32>,
	pub limit: Option<u32>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchPage {
	/// Total matches for the query, not the size of `hits`.
	pub found: u64,
	pub hits: Vec<SearchDocument>,
}
