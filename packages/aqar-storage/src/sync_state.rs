use time::OffsetDateTime;

use crate::{Result, db::Db};
use aqar_domain::cursor::SyncCursor;

const CURSOR_ROW_ID: i32 = 1;

pub async fn load_cursor(db: &Db) -> Result<Option<SyncCursor>> {
	let row: Option<(OffsetDateTime, i64)> =
		sqlx::query_as("SELECT last_synced_at, last_property_id FROM sync_state WHERE id = $1")
			.bind(CURSOR_ROW_ID)
			.fetch_optional(&db.pool)
			.await?;

	Ok(row.map(|(last_synced_at, last_property_id)| SyncCursor {
		last_synced_at,
		last_property_id,
	}))
}

pub async fn save_cursor(db: &Db, cursor: &SyncCursor) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO sync_state (id, last_synced_at, last_property_id, updated_at)
VALUES ($1, $2, $3, NOW())
ON CONFLICT (id) DO UPDATE
SET last_synced_at = EXCLUDED.last_synced_at,
\tlast_property_id = EXCLUDED.last_property_id,
\tupdated_at = NOW()",
	)
	.bind(CURSOR_ROW_ID)
	.bind(cursor.last_synced_at)
	.bind(cursor.last_property_id)
	.execute(&db.pool)
	.await?;

	Ok(())
}
