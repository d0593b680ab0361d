//! Listing search: request validation, hint merging, ranking dispatch and
//! the tiered featured/rest blend.

pub mod filter;

mod personalize;

// std
use std::ops::Range;
// crates.io
use serde::{Deserialize, Serialize};
// self
use aqar_domain::{
	blend, document::SearchDocument, filters::FilterState, profile::PreferenceProfile, query,
	vocab::Purpose,
};
use aqar_engine::SearchCall;
use crate::{AqarService, Error, Result};
use self::personalize::Strategy;

/// Keyword matching covers the address and the agent name.
const QUERY_BY: &str = "address,agent_name";
const MAX_FREE_TEXT_CHARS: usize = 512;
/// Featured tier order. Rank ties break on recency.
const FEATURED_SORT: &str = "featured_rank:asc,updated_at:desc";
/// Rest tier order. The id tiebreak makes the order total, which keeps
/// offset pagination gapless when listings share a timestamp.
const REST_SORT: &str = "updated_at:desc,property_id:desc";

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SearchRequest {
	pub purpose: Purpose,
	pub country_id: i32,
	#[serde(default)]
	pub free_text: Option<String>,
	#[serde(default)]
	pub filters: FilterState,
	#[serde(default)]
	pub page: Option<u32>,
	#[serde(default)]
	pub page_size: Option<u32>,
	#[serde(default)]
	pub profile: Option<PreferenceProfile>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct SearchResponse {
	pub items: Vec<SearchDocument>,
	/// Total matches across the whole result set, with the featured tier
	/// counted only up to the configured cap.
	pub total_found: u64,
	pub page: u32,
	pub page_size: u32,
}

impl AqarService {
	pub async fn search(&self, request: SearchRequest) -> Result<SearchResponse> {
		let page = request.page.unwrap_or(1);

		if page == 0 {
			return Err(Error::InvalidRequest { message: "page starts at 1.".to_string() });
		}

		let page_size = request
			.page_size
			.unwrap_or(self.cfg.search.default_page_size)
			.clamp(1, self.cfg.search.max_page_size);
		let free_text = request.free_text.as_deref().unwrap_or("").trim();

		if free_text.chars().count() > MAX_FREE_TEXT_CHARS {
			return Err(Error::InvalidRequest {
				message: format!("free_text must stay within {MAX_FREE_TEXT_CHARS} characters."),
			});
		}

		let mut state = request.filters;

		// The caller's purpose and market are mandatory and must not be
		// overridden by anything parsed out of the free text.
		state.purpose = Some(request.purpose);
		state.country_id = Some(request.country_id);

		if !free_text.is_empty() {
			state.absorb(&query::parse(free_text));
		}

		let filter_by = filter::build_filter(&state);
		let query_text = filter::build_query(&state);

		match personalize::choose(request.profile.as_ref()) {
			Strategy::Boost(expression) =>
				self.boosted(&query_text, &filter_by, &expression, page, page_size).await,
			Strategy::Rerank =>
				self.reranked(&query_text, &filter_by, request.profile.as_ref(), page, page_size)
					.await,
			Strategy::FeaturedThenRecent =>
				self.featured_then_recent(&query_text, &filter_by, page, page_size).await,
		}
	}

	async fn boosted(
		&self,
		query: &str,
		filter_by: &str,
		expression: &str,
		page: u32,
		page_size: u32,
	) -> Result<SearchResponse> {
		let call = SearchCall {
			query: query.to_string(),
			query_by: QUERY_BY.to_string(),
			filter_by: filter_by.to_string(),
			sort_by: format!("{expression},updated_at:desc"),
			page: Some(page),
			per_page: Some(page_size),
			..Default::default()
		};
		let result = self.engine.search(&self.cfg.storage.engine.collection, &call).await?;

		Ok(SearchResponse { items: result.hits, total_found: result.found, page, page_size })
	}

	async fn reranked(
		&self,
		query: &str,
		filter_by: &str,
		profile: Option<&PreferenceProfile>,
		page: u32,
		page_size: u32,
	) -> Result<SearchResponse> {
		let call = SearchCall {
			query: query.to_string(),
			query_by: QUERY_BY.to_string(),
			filter_by: filter_by.to_string(),
			sort_by: REST_SORT.to_string(),
			page: Some(page),
			per_page: Some(page_size),
			..Default::default()
		};
		let mut result = self.engine.search(&self.cfg.storage.engine.collection, &call).await?;

		if let Some(profile) = profile {
			personalize::rerank_page(profile, &mut result.hits);
		}

		Ok(SearchResponse { items: result.hits, total_found: result.found, page, page_size })
	}

	/// Stock ordering: capped featured tier first, recency-ordered rest tier
	/// after it, stitched so consecutive pages never skip or repeat a listing.
	async fn featured_then_recent(
		&self,
		query: &str,
		filter_by: &str,
		page: u32,
		page_size: u32,
	) -> Result<SearchResponse> {
		let collection = &self.cfg.storage.engine.collection;
		let featured_filter = format!("{filter_by} && is_featured:=true");
		let rest_filter = format!("{filter_by} && is_featured:=false");
		let featured_total = self.tier_count(query, &featured_filter).await?;
		let rest_total = self.tier_count(query, &rest_filter).await?;
		let featured_count =
			featured_total.min(u64::from(self.cfg.search.featured_tier_cap)) as usize;
		let plan =
			blend::blend(featured_count, rest_total as usize, page_size as usize, page as usize);
		let mut items = Vec::with_capacity(plan.len());

		if !plan.featured.is_empty() {
			let call = window_call(query, &featured_filter, FEATURED_SORT, &plan.featured);

			items.extend(self.engine.search(collection, &call).await?.hits);
		}
		if !plan.rest.is_empty() {
			let call = window_call(query, &rest_filter, REST_SORT, &plan.rest);

			items.extend(self.engine.search(collection, &call).await?.hits);
		}

		Ok(SearchResponse {
			items,
			total_found: featured_count as u64 + rest_total,
			page,
			page_size,
		})
	}

	async fn tier_count(&self, query: &str, filter_by: &str) -> Result<u64> {
		let call = SearchCall {
			query: query.to_string(),
			query_by: QUERY_BY.to_string(),
			filter_by: filter_by.to_string(),
			page: Some(1),
			per_page: Some(1),
			..Default::default()
		};

		Ok(self.engine.search(&self.cfg.storage.engine.collection, &call).await?.found)
	}
}

fn window_call(query: &str, filter_by: &str, sort_by: &str, window: &Range<usize>) -> SearchCall {
	SearchCall {
		query: query.to_string(),
		query_by: QUERY_BY.to_string(),
		filter_by: filter_by.to_string(),
		sort_by: sort_by.to_string(),
		offset: Some(u32::try_from(window.start).unwrap_or(u32::MAX)),
		limit: Some(u32::try_from(window.len()).unwrap_or(u32::MAX)),
		..Default::default()
	}
}
