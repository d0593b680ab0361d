use std::time::Duration;

use tokio::time;

use aqar_service::{AqarService, Error};

/// Drives synchronization passes on the configured interval until shutdown,
/// or a single pass with `once`. `force` applies to the first pass only;
/// later passes resume from the stored cursor.
pub async fn run_indexer(
	service: AqarService,
	once: bool,
	mut force: bool,
) -> color_eyre::Result<()> {
	let interval = Duration::from_secs(service.cfg.sync.interval_seconds);

	loop {
		match service.run_sync(force).await {
			Ok(report) => tracing::info!(
				upserted = report.upserted,
				last_property_id = report.new_last_property_id,
				"Synchronization pass finished."
			),
			Err(err) if once => return Err(err.into()),
			Err(Error::SyncBusy) =>
				tracing::info!("Skipped this pass; another runner holds the lease."),
			Err(err) => tracing::error!(error = %err, "Synchronization pass failed."),
		}

		if once {
			return Ok(());
		}

		force = false;

		time::sleep(interval).await;
	}
}
