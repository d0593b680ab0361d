use time::OffsetDateTime;

/// One listing joined with its agent and image rows.
///
/// `changed_at` is the greatest `updated_at` across the listing and its
/// related rows. The sync watermark orders rows by `(changed_at, id)`.
#[derive(Debug, sqlx::FromRow)]
pub struct ListingRow {
	pub id: i64,
	pub country_id: i32,
	pub purpose: String,
	pub property_type_ids: Vec<i32>,
	pub price: i64,
	pub bedrooms: i32,
	pub bathrooms: i32,
	pub area_sqft: f64,
	pub address: String,
	pub feature_ids: Vec<i32>,
	pub agent_id: Option<i64>,
	pub agent_name: Option<String>,
	pub status: String,
	pub completion_status: String,
	pub is_off_plan: bool,
	pub is_featured: bool,
	pub featured_rank: i32,
	pub image_urls: Vec<String>,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
	pub changed_at: OffsetDateTime,
}

#[derive(Debug, sqlx::FromRow)]
pub struct SyncLease {
	pub name: String,
	pub owner: String,
	pub expires_at: OffsetDateTime,
}
