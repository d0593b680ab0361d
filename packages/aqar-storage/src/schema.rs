pub fn render_schema() -> String {
	expand_includes(include_str!("../../../sql/init.sql"))
}

fn expand_includes(sql: &str) -> String {
	let mut out = String::new();

	for line in sql.lines() {
		let trimmed = line.trim();

		if let Some(path) = trimmed.strip_prefix("\\ir ") {
			match path.trim() {
				"tables/001_listings.sql" =>
					out.push_str(include_str!("../../../sql/tables/001_listings.sql")),
				"tables/002_agents.sql" =>
					out.push_str(include_str!("../../../sql/tables/002_agents.sql")),
				"tables/003_listing_images.sql" =>
					out.push_str(include_str!("../../../sql/tables/003_listing_images.sql")),
				"tables/004_sync_state.sql" =>
					out.push_str(include_str!("../../../sql/tables/004_sync_state.sql")),
				"tables/005_sync_leases.sql" =>
					out.push_str(include_str!("../../../sql/tables/005_sync_leases.sql")),
				_ => out.push_str(line),
			}
		} else {
			out.push_str(line);
		}

		out.push('\n');
	}

	out
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn render_schema_expands_every_include() {
		let sql = render_schema();

		assert!(!sql.contains("\\ir "));
		assert!(sql.contains("CREATE TABLE IF NOT EXISTS listings"));
		assert!(sql.contains("CREATE TABLE IF NOT EXISTS agents"));
		assert!(sql.contains("CREATE TABLE IF NOT EXISTS listing_images"));
		assert!(sql.contains("CREATE TABLE IF NOT EXISTS sync_state"));
		assert!(sql.contains("CREATE TABLE IF NOT EXISTS sync_leases"));
	}
}
