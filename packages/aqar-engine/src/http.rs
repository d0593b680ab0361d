//! [`SearchEngine`] over the engine's REST API.

// std
use std::time::Duration;
// crates.io
use reqwest::{
	Client, Response, StatusCode,
	header::{HeaderMap, HeaderValue},
};
use serde::Deserialize;
// self
use crate::{
	BoxFuture, CollectionInfo, CollectionSchema, FieldSchema, ImportOutcome, ImportReport, Result,
	SearchCall, SearchEngine, SearchPage, error::Error,
};
use aqar_domain::document::SearchDocument;

const API_KEY_HEADER: &str = "x-api-key";
// Engine error bodies can embed whole documents. Keep only the head.
const ERROR_BODY_CAP: usize = 400;

#[derive(Clone, Debug)]
pub struct HttpSearchEngine {
	client: Client,
	base_url: String,
}
impl HttpSearchEngine {
	pub fn new(engine: &aqar_config::Engine) -> Result<Self> {
		let mut api_key = HeaderValue::from_str(&engine.api_key)?;

		api_key.set_sensitive(true);

		let mut headers = HeaderMap::new();

		headers.insert(API_KEY_HEADER, api_key);

		let client = Client::builder()
			.timeout(Duration::from_millis(engine.timeout_ms))
			.default_headers(headers)
			.build()?;

		Ok(Self { client, base_url: engine.url.clone() })
	}

	fn collection_url(&self, collection: &str) -> String {
		format!("{}/collections/{collection}", self.base_url)
	}

	async fn describe_(&self, collection: &str) -> Result<Option<CollectionInfo>> {
		let response = self.client.get(self.collection_url(collection)).send().await?;

		if response.status() == StatusCode::NOT_FOUND {
			return Ok(None);
		}

		let info = checked(response).await?.json().await?;

		Ok(Some(info))
	}

	async fn create_(&self, schema: &CollectionSchema) -> Result<()> {
		let response = self
			.client
			.post(format!("{}/collections", self.base_url))
			.json(schema)
			.send()
			.await?;

		checked(response).await?;

		Ok(())
	}

	async fn add_fields_(&self, collection: &str, fields: &[FieldSchema]) -> Result<()> {
		let body = serde_json::json!({ "fields": fields });
		let response =
			self.client.patch(self.collection_url(collection)).json(&body).send().await?;

		checked(response).await?;

		Ok(())
	}

	async fn import_(
		&self,
		collection: &str,
		documents: &[SearchDocument],
	) -> Result<ImportReport> {
		let mut payload = String::new();

		for document in documents {
			payload.push_str(&serde_json::to_string(document)?);
			payload.push('\n');
		}

		let response = self
			.client
			.post(format!("{}/documents/import", self.collection_url(collection)))
			.query(&[("action", "upsert")])
			.body(payload)
			.send()
			.await?;
		let body = checked(response).await?.text().await?;

		parse_import_report(&body)
	}

	async fn search_(&self, collection: &str, call: &SearchCall) -> Result<SearchPage> {
		let response = self
			.client
			.get(format!("{}/documents/search", self.collection_url(collection)))
			.query(&search_params(call))
			.send()
			.await?;
		let wire: SearchResponseWire = checked(response).await?.json().await?;

		Ok(SearchPage {
			found: wire.found,
			hits: wire.hits.into_iter().map(|h| h.document).collect(),
		})
	}
}
impl SearchEngine for HttpSearchEngine {
	fn describe<'a>(
		&'a self,
		collection: &'a str,
	) -> BoxFuture<'a, Result<Option<CollectionInfo>>> {
		Box::pin(self.describe_(collection))
	}

	fn create<'a>(&'a self, schema: &'a CollectionSchema) -> BoxFuture<'a, Result<()>> {
		Box::pin(self.create_(schema))
	}

	fn add_fields<'a>(
		&'a self,
		collection: &'a str,
		fields: &'a [FieldSchema],
	) -> BoxFuture<'a, Result<()>> {
		Box::pin(self.add_fields_(collection, fields))
	}

	fn import<'a>(
		&'a self,
		collection: &'a str,
		documents: &'a [SearchDocument],
	) -> BoxFuture<'a, Result<ImportReport>> {
		Box::pin(self.import_(collection, documents))
	}

	fn search<'a>(
		&'a self,
		collection: &'a str,
		call: &'a SearchCall,
	) -> BoxFuture<'a, Result<SearchPage>> {
		Box::pin(self.search_(collection, call))
	}
}

#[derive(Debug, Deserialize)]
struct SearchResponseWire {
	#[serde(default)]
	found: u64,
	#[serde(default)]
	hits: Vec<HitWire>,
}

#[derive(Debug, Deserialize)]
struct HitWire {
	document: SearchDocument,
}

#[derive(Debug, Deserialize)]
struct ImportLineWire {
	success: bool,
	#[serde(default)]
	error: Option<String>,
}

async fn checked(response: Response) -> Result<Response> {
	let status = response.status();

	if status.is_success() {
		return Ok(response);
	}

	let body = response.text().await.unwrap_or_default();

	Err(Error::Status { status: status.as_u16(), message: compact(&body) })
}

fn compact(body: &str) -> String {
	let trimmed = body.trim();

	if trimmed.len() <= ERROR_BODY_CAP {
		return trimmed.into();
	}

	let mut cut = ERROR_BODY_CAP;

	while !trimmed.is_char_boundary(cut) {
		cut -= 1;
	}

	trimmed[..cut].into()
}

fn search_params(call: &SearchCall) -> Vec<(&'static str, String)> {
	let mut params = vec![("q", call.query.clone()), ("query_by", call.query_by.clone())];

	if !call.filter_by.is_empty() {
		params.push(("filter_by", call.filter_by.clone()));
	}
	if !call.sort_by.is_empty() {
		params.push(("sort_by", call.sort_by.clone()));
	}
	if let Some(page) = call.page {
		params.push(("page", page.to_string()));
	}
	if let Some(per_page) = call.per_page {
		params.push(("per_page", per_page.to_string()));
	}
	if let Some(offset) = call.offset {
		params.push(("offset", offset.to_string()));
	}
	if let Some(limit) = call.limit {
		params.push(("limit", limit.to_string()));
	}

	params
}

// One JSON object per line, one line per input document.
fn parse_import_report(body: &str) -> Result<ImportReport> {
	let mut outcomes = Vec::new();

	for line in body.lines() {
		let line = line.trim();

		if line.is_empty() {
			continue;
		}

		let Ok(wire) = serde_json::from_str::<ImportLineWire>(line) else {
			return Err(Error::UnexpectedResponse {
				message: format!("import response line is not a result object: {}", compact(line)),
			});
		};

		outcomes.push(ImportOutcome { success: wire.success, error: wire.error });
	}

	Ok(ImportReport { outcomes })
}
