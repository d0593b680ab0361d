use serde::{Deserialize, Serialize};

/// Flat projection of a listing as stored in the search collection. One
/// document per listing id; re-upserting the same projection is a no-op for
/// the index. Timestamps are epoch seconds because the engine sorts on
/// numeric fields only.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct SearchDocument {
	pub id: String,
	pub property_id: i64,
	pub country_id: i32,
	pub purpose: String,
	pub property_type_ids: Vec<i32>,
	pub price: i64,
	pub bedrooms: i32,
	pub bathrooms: i32,
	pub area_sqft: f64,
	pub area_sqm: f64,
	pub address: String,
	pub features: Vec<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub agent_id: Option<i64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub agent_name: Option<String>,
	pub status: String,
	pub completion_status: String,
	pub is_off_plan: bool,
	pub is_featured: bool,
	pub featured_rank: i32,
	pub image_urls: Vec<String>,
	pub created_at: i64,
	pub updated_at: i64,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn absent_agent_fields_are_omitted_from_the_wire_form() {
		let document = SearchDocument {
			id: "9".to_string(),
			property_id: 9,
			country_id: 1,
			purpose: "buy".to_string(),
			property_type_ids: vec![2],
			price: 3_200_000,
			bedrooms: 4,
			bathrooms: 5,
			area_sqft: 4_100.0,
			area_sqm: 380.9,
			address: "Palm Jumeirah".to_string(),
			features: vec!["swimming_pool".to_string()],
			agent_id: None,
			agent_name: None,
			status: "active".to_string(),
			completion_status: "ready".to_string(),
			is_off_plan: false,
			is_featured: true,
			featured_rank: 3,
			image_urls: vec!["https://img.aqar.dev/9/0.jpg".to_string()],
			created_at: 1_700_000_000,
			updated_at: 1_700_000_500,
		};
		let wire = serde_json::to_value(&document).expect("serialize document");

		assert!(wire.get("agent_id").is_none());
		assert_eq!(wire["id"], "9");
		assert_eq!(wire["updated_at"], 1_700_000_500);
	}
}
