use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{buckets::PriceBucket, document::SearchDocument};

/// Upper bound the engine accepts for a boost clause weight. Client-side
/// scoring clamps to the same bound so both ranking paths agree.
pub const MAX_BOOST_WEIGHT: u32 = 127;

/// Per-searcher interaction histograms computed by an upstream collaborator
/// and consumed read-only. Maps are ordered so synthesized boost clauses and
/// scores are deterministic for a given profile.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct PreferenceProfile {
	/// False while the collaborator is still accumulating signals; such a
	/// profile must not influence ranking.
	pub ready: bool,
	pub bedrooms: BTreeMap<u8, u32>,
	pub bathrooms: BTreeMap<u8, u32>,
	/// Keyed by [`PriceBucket::label`] values.
	pub price_buckets: BTreeMap<String, u32>,
	pub property_types: BTreeMap<i32, u32>,
	pub features: BTreeMap<String, u32>,
	/// Boost expression precomputed upstream. Takes precedence over
	/// synthesis from the histograms when present.
	pub boost_expression: Option<String>,
}

pub fn clamp_weight(weight: u32) -> u32 {
	weight.min(MAX_BOOST_WEIGHT)
}

impl PreferenceProfile {
	/// Affinity of one document to this profile: the sum of clamped histogram
	/// weights over every matching attribute. Mirrors what the engine-side
	/// boost expression computes.
	pub fn score(&self, document: &SearchDocument) -> u32 {
		let mut score = 0;

		if let Ok(bedrooms) = u8::try_from(document.bedrooms)
			&& let Some(weight) = self.bedrooms.get(&bedrooms)
		{
			score += clamp_weight(*weight);
		}
		if let Ok(bathrooms) = u8::try_from(document.bathrooms)
			&& let Some(weight) = self.bathrooms.get(&bathrooms)
		{
			score += clamp_weight(*weight);
		}
		if let Some(weight) = self.price_buckets.get(PriceBucket::of(document.price).label()) {
			score += clamp_weight(*weight);
		}

		for type_id in &document.property_type_ids {
			if let Some(weight) = self.property_types.get(type_id) {
				score += clamp_weight(*weight);
			}
		}
		for feature in &document.features {
			if let Some(weight) = self.features.get(feature.as_str()) {
				score += clamp_weight(*weight);
			}
		}

		score
	}
}
