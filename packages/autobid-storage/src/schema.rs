/// The bootstrap script with every `\ir` include inlined.
pub fn render_schema() -> String {
	expand_includes(include_str!("../../../sql/init.sql"))
}

fn expand_includes(sql: &str) -> String {
	let mut out = String::new();

	for line in sql.lines() {
		let trimmed = line.trim();

		if let Some(path) = trimmed.strip_prefix("\\ir ") {
			match path.trim() {
				"tables/001_vehicle_manufacturers.sql" =>
					out.push_str(include_str!("../../../sql/tables/001_vehicle_manufacturers.sql")),
				"tables/002_vehicle_models.sql" =>
					out.push_str(include_str!("../../../sql/tables/002_vehicle_models.sql")),
				"tables/003_auctions.sql" =>
					out.push_str(include_str!("../../../sql/tables/003_auctions.sql")),
				"tables/004_auction_vehicles.sql" =>
					out.push_str(include_str!("../../../sql/tables/004_auction_vehicles.sql")),
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
	use crate::schema::render_schema;

	#[test]
	fn includes_are_inlined_in_dependency_order() {
		let sql = render_schema();
		let position = |table: &str| {
			sql.find(&format!("CREATE TABLE IF NOT EXISTS {table}"))
				.unwrap_or_else(|| panic!("Missing table {table}."))
		};

		assert!(!sql.contains("\\ir"));
		assert!(position("vehicle_manufacturers") < position("vehicle_models"));
		assert!(position("vehicle_models") < position("auction_vehicles"));
		assert!(position("auctions") < position("auction_vehicles"));
	}
}
