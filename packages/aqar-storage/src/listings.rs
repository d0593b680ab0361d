use crate::{Error, Result, db::Db, models::ListingRow};
use aqar_domain::cursor::SyncCursor;

/// Listings whose effective change time lies beyond the cursor, oldest first.
///
/// A listing changes when its own row, its agent row, or any of its image
/// rows changes. The `(changed_at, id)` row comparison pairs with
/// [`SyncCursor::sees`] so repeated calls never return a row twice and never
/// skip one, even when many rows share one timestamp.
pub async fn changed_since(db: &Db, cursor: &SyncCursor, limit: u32) -> Result<Vec<ListingRow>> {
	if limit == 0 {
		return Err(Error::InvalidArgument("Batch size must be positive.".into()));
	}

	let rows = sqlx::query_as::<_, ListingRow>(
		"\
SELECT *
FROM (
\tSELECT
\t\tl.id,
\t\tl.country_id,
\t\tl.purpose,
\t\tl.property_type_ids,
\t\tl.price,
\t\tl.bedrooms,
\t\tl.bathrooms,
\t\tl.area_sqft,
\t\tl.address,
\t\tl.feature_ids,
\t\tl.agent_id,
\t\ta.name AS agent_name,
\t\tl.status,
\t\tl.completion_status,
\t\tl.is_off_plan,
\t\tl.is_featured,
\t\tl.featured_rank,
\t\tCOALESCE(i.urls, ARRAY[]::TEXT[]) AS image_urls,
\t\tl.created_at,
\t\tl.updated_at,
\t\tGREATEST(
\t\t\tl.updated_at,
\t\t\tCOALESCE(a.updated_at, l.updated_at),
\t\t\tCOALESCE(i.updated_at, l.updated_at)
\t\t) AS changed_at
\tFROM listings l
\tLEFT JOIN agents a ON a.agent_id = l.agent_id
\tLEFT JOIN LATERAL (
\t\tSELECT MAX(updated_at) AS updated_at, ARRAY_AGG(url ORDER BY position) AS urls
\t\tFROM listing_images
\t\tWHERE listing_id = l.id
\t) i ON TRUE
) t
WHERE (t.changed_at, t.id) > ($1, $2)
ORDER BY t.changed_at ASC, t.id ASC
LIMIT $3",
	)
	.bind(cursor.last_synced_at)
	.bind(cursor.last_property_id)
	.bind(i64::from(limit))
	.fetch_all(&db.pool)
	.await?;

	Ok(rows)
}
