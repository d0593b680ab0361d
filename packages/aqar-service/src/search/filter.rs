//! Renders a [`FilterState`] into the engine's textual filter and query
//! expressions.
//!
//! The filter expression is a conjunction; every clause comes from a typed
//! field, and free-form strings are backtick-quoted with embedded backticks
//! stripped, so no caller value can change the expression's structure.

use std::fmt::Display;

use aqar_domain::filters::FilterState;

pub fn build_filter(state: &FilterState) -> String {
	let mut clauses = Vec::new();

	if let Some(purpose) = state.purpose {
		clauses.push(format!("purpose:={}", purpose.as_str()));
	}
	if let Some(country_id) = state.country_id {
		clauses.push(format!("country_id:={country_id}"));
	}

	// Inactive listings stay in the index for resurrection but must never
	// surface, whatever the caller asks for.
	clauses.push("status:=active".to_string());

	if let Some(price_min) = state.price_min {
		clauses.push(format!("price:>={price_min}"));
	}
	if let Some(price_max) = state.price_max {
		clauses.push(format!("price:<={price_max}"));
	}
	if let Some(area_min) = state.area_sqft_min {
		clauses.push(format!("area_sqft:>={area_min}"));
	}
	if let Some(area_max) = state.area_sqft_max {
		clauses.push(format!("area_sqft:<={area_max}"));
	}
	if !state.bedrooms.is_empty() {
		clauses.push(format!("bedrooms:=[{}]", join_values(&state.bedrooms)));
	}
	if !state.bathrooms.is_empty() {
		clauses.push(format!("bathrooms:=[{}]", join_values(&state.bathrooms)));
	}
	if !state.property_type_ids.is_empty() {
		clauses.push(format!("property_type_ids:=[{}]", join_values(&state.property_type_ids)));
	}
	if !state.features.is_empty() {
		let quoted = state.features.iter().map(|f| quote(f)).collect::<Vec<_>>();

		clauses.push(format!("features:=[{}]", quoted.join(",")));
	}
	if !state.agent_ids.is_empty() {
		clauses.push(format!("agent_id:=[{}]", join_values(&state.agent_ids)));
	}
	if let Some(completion) = state.completion_status {
		clauses.push(format!("completion_status:={}", completion.as_str()));
	}

	clauses.join(" && ")
}

/// Location and residual keywords become the full-text query. Everything
/// structured lives in the filter, so an empty text side means match-all.
pub fn build_query(state: &FilterState) -> String {
	let text = [state.location.as_deref(), state.keyword.as_deref()]
		.into_iter()
		.flatten()
		.collect::<Vec<_>>()
		.join(" ");

	if text.trim().is_empty() { "*".to_string() } else { text }
}

fn join_values<T>(values: &[T]) -> String
where
	T: Display,
{
	values.iter().map(T::to_string).collect::<Vec<_>>().join(",")
}

// Backticks delimit string literals in the engine's filter syntax and have
// no escape sequence, so embedded ones are dropped rather than escaped.
fn quote(value: &str) -> String {
	let cleaned = value.replace('`', "");

	format!("`{cleaned}`")
}
