use time::{Duration, OffsetDateTime};

use crate::{Result, db::Db, models::SyncLease};

/// Claim a named lease, or return `None` if a live one is held elsewhere.
///
/// Single compare-and-set statement. The insert wins when no row exists; the
/// update wins only when the existing lease has expired, so a crashed holder
/// blocks others for at most `ttl_seconds`.
pub async fn try_acquire(
	db: &Db,
	name: &str,
	owner: &str,
	ttl_seconds: i64,
) -> Result<Option<SyncLease>> {
	let now = OffsetDateTime::now_utc();
	let expires_at = now + Duration::seconds(ttl_seconds);
	let lease = sqlx::query_as::<_, SyncLease>(
		"\
INSERT INTO sync_leases (name, owner, expires_at)
VALUES ($1, $2, $3)
ON CONFLICT (name) DO UPDATE
SET owner = EXCLUDED.owner, expires_at = EXCLUDED.expires_at
WHERE sync_leases.expires_at <= $4
RETURNING name, owner, expires_at",
	)
	.bind(name)
	.bind(owner)
	.bind(expires_at)
	.bind(now)
	.fetch_optional(&db.pool)
	.await?;

	Ok(lease)
}

/// Release a lease if this owner still holds it. Releasing a lease someone
/// else took over after expiry is a no-op.
pub async fn release(db: &Db, name: &str, owner: &str) -> Result<()> {
	sqlx::query("DELETE FROM sync_leases WHERE name = $1 AND owner = $2")
		.bind(name)
		.bind(owner)
		.execute(&db.pool)
		.await?;

	Ok(())
}
