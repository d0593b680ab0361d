use serde::{Deserialize, Serialize};

use crate::{query::QueryHints, vocab::Purpose};

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionStatus {
	Ready,
	OffPlan,
}

impl CompletionStatus {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Ready => "ready",
			Self::OffPlan => "off_plan",
		}
	}
}

/// Resolved search constraints after merging explicit caller filters with
/// parsed hints. This is the single input of the filter/query builder, so
/// everything the builder renders must be representable here.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct FilterState {
	pub purpose: Option<Purpose>,
	pub country_id: Option<i32>,
	pub price_min: Option<i64>,
	pub price_max: Option<i64>,
	pub area_sqft_min: Option<f64>,
	pub area_sqft_max: Option<f64>,
	pub bedrooms: Vec<u8>,
	pub bathrooms: Vec<u8>,
	pub property_type_ids: Vec<i32>,
	pub features: Vec<String>,
	pub agent_ids: Vec<i64>,
	pub completion_status: Option<CompletionStatus>,
	pub location: Option<String>,
	pub keyword: Option<String>,
}

impl FilterState {
	/// Folds parsed hints in. Explicit caller values always win; hints only
	/// fill fields the caller left unset. Keywords are the one additive
	/// field because both sides contribute search terms.
	pub fn absorb(&mut self, hints: &QueryHints) {
		if self.purpose.is_none() {
			self.purpose = hints.purpose;
		}
		if self.price_min.is_none() {
			self.price_min = hints.price_min;
		}
		if self.price_max.is_none() {
			self.price_max = hints.price_max;
		}
		if self.bedrooms.is_empty()
			&& let Some(bedrooms) = hints.bedrooms
		{
			self.bedrooms = vec![bedrooms];
		}
		if self.bathrooms.is_empty()
			&& let Some(bathrooms) = hints.bathrooms
		{
			self.bathrooms = vec![bathrooms];
		}
		if self.property_type_ids.is_empty() {
			self.property_type_ids = hints.property_type_ids.clone();
		}

		for feature in &hints.features {
			if !self.features.contains(feature) {
				self.features.push(feature.clone());
			}
		}

		if self.location.is_none() {
			self.location = hints.location.clone();
		}

		match (&mut self.keyword, &hints.keyword) {
			(Some(existing), Some(parsed)) => {
				existing.push(' ');
				existing.push_str(parsed);
			},
			(None, Some(parsed)) => self.keyword = Some(parsed.clone()),
			_ => {},
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::query;

	#[test]
	fn explicit_fields_beat_hints() {
		let mut state = FilterState {
			purpose: Some(Purpose::Rent),
			price_max: Some(80_000),
			bedrooms: vec![1, 2],
			..Default::default()
		};
		let hints = query::parse("3 bed villa for sale under 2m");

		state.absorb(&hints);
		assert_eq!(state.purpose, Some(Purpose::Rent));
		assert_eq!(state.price_max, Some(80_000));
		assert_eq!(state.bedrooms, vec![1, 2]);
		// Unset fields still pick the hints up.
		assert_eq!(state.property_type_ids, vec![2]);
	}

	#[test]
	fn hints_fill_unset_fields() {
		let mut state = FilterState::default();

		state.absorb(&query::parse("2 bath apartment near Jumeirah under 1.5m"));
		assert_eq!(state.bathrooms, vec![2]);
		assert_eq!(state.property_type_ids, vec![1]);
		assert_eq!(state.price_max, Some(1_500_000));
		assert_eq!(state.location.as_deref(), Some("Jumeirah"));
		assert_eq!(state.keyword, None);
	}

	#[test]
	fn keywords_append_instead_of_replacing() {
		let mut state =
			FilterState { keyword: Some("marina skyline".to_string()), ..Default::default() };
		let hints = QueryHints { keyword: Some("waterfront".to_string()), ..Default::default() };

		state.absorb(&hints);
		assert_eq!(state.keyword.as_deref(), Some("marina skyline waterfront"));
	}

	#[test]
	fn features_merge_without_duplicates() {
		let mut state = FilterState { features: vec!["gym".to_string()], ..Default::default() };
		let hints = QueryHints {
			features: vec!["gym".to_string(), "balcony".to_string()],
			..Default::default()
		};

		state.absorb(&hints);
		assert_eq!(state.features, vec!["gym".to_string(), "balcony".to_string()]);
	}

	#[test]
	fn completion_status_labels_are_stable() {
		assert_eq!(CompletionStatus::Ready.as_str(), "ready");
		assert_eq!(CompletionStatus::OffPlan.as_str(), "off_plan");
		assert_eq!(
			serde_json::from_str::<CompletionStatus>("\"off_plan\"").expect("deserialize"),
			CompletionStatus::OffPlan
		);
	}
}
