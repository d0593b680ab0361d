//! Chooses and applies a personalization strategy for one search request.

use std::cmp::Reverse;

use aqar_domain::{
	buckets::PriceBucket,
	document::SearchDocument,
	profile::{self, PreferenceProfile},
};

/// How a request gets ranked, in fixed precedence order. A precomputed boost
/// expression always wins over synthesis, which wins over client-side
/// reranking; a missing or not-ready profile keeps the stock ordering.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Strategy {
	Boost(String),
	Rerank,
	FeaturedThenRecent,
}

pub(crate) fn choose(profile: Option<&PreferenceProfile>) -> Strategy {
	let Some(profile) = profile else {
		return Strategy::FeaturedThenRecent;
	};

	if !profile.ready {
		return Strategy::FeaturedThenRecent;
	}
	if let Some(expression) = profile.boost_expression.as_deref()
		&& !expression.trim().is_empty()
	{
		return Strategy::Boost(expression.trim().to_string());
	}

	match synthesize_boost(profile) {
		Some(expression) => Strategy::Boost(expression),
		None => Strategy::Rerank,
	}
}

/// One weighted clause per histogram entry, in histogram order, wrapped as
/// an `_eval` sort expression. Returns `None` when every weight clamps to
/// zero, which sends the caller down the rerank path.
pub(crate) fn synthesize_boost(profile: &PreferenceProfile) -> Option<String> {
	let mut clauses = Vec::new();

	for (&bedrooms, &weight) in &profile.bedrooms {
		push_clause(&mut clauses, format!("bedrooms:={bedrooms}"), weight);
	}
	for (&bathrooms, &weight) in &profile.bathrooms {
		push_clause(&mut clauses, format!("bathrooms:={bathrooms}"), weight);
	}
	for (label, &weight) in &profile.price_buckets {
		// Unknown labels are producer bugs; skipping them keeps the
		// expression valid.
		let Some(bucket) = PriceBucket::from_label(label) else {
			continue;
		};
		let clause = match bucket.bounds() {
			(lower, Some(upper)) => format!("price:>={lower} && price:<{upper}"),
			(lower, None) => format!("price:>={lower}"),
		};

		push_clause(&mut clauses, clause, weight);
	}
	for (&type_id, &weight) in &profile.property_types {
		push_clause(&mut clauses, format!("property_type_ids:={type_id}"), weight);
	}
	for (feature, &weight) in &profile.features {
		push_clause(&mut clauses, format!("features:={feature}"), weight);
	}

	if clauses.is_empty() {
		return None;
	}

	Some(format!("_eval([{}]):desc", clauses.join(",")))
}

/// Reorders one fetched page in place by profile score, newest first within
/// a score, falling back to id so the order is total. Only the page is
/// reordered; engine-side pagination stays gapless because offsets are
/// computed before any reranking.
pub(crate) fn rerank_page(profile: &PreferenceProfile, hits: &mut [SearchDocument]) {
	hits.sort_by_cached_key(|document| {
		(
			Reverse(profile.score(document)),
			Reverse(document.updated_at),
			Reverse(document.property_id),
		)
	});
}

fn push_clause(clauses: &mut Vec<String>, condition: String, weight: u32) {
	let weight = profile::clamp_weight(weight);

	if weight == 0 {
		return;
	}

	clauses.push(format!("({condition}):{weight}"));
}
