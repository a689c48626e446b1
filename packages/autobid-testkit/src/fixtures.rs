//! Row seeding for listing tests. The schema must already be applied.

use sqlx::PgPool;
use time::{Date, OffsetDateTime};

use crate::Result;

#[derive(Debug, Clone)]
pub struct VehicleSeed {
	pub id: i64,
	pub auction_id: i64,
	pub model_id: i64,
	pub manufacturing_date: Date,
	pub mileage: i64,
	pub active: bool,
}

/// Inserts `(id, name)` manufacturers.
pub async fn seed_manufacturers(pool: &PgPool, rows: &[(i64, &str)]) -> Result<()> {
	for (id, name) in rows {
		sqlx::query("INSERT INTO vehicle_manufacturers (id, name) VALUES ($1, $2)")
			.bind(id)
			.bind(name)
			.execute(pool)
			.await?;
	}

	Ok(())
}

/// Inserts `(id, manufacturer_id, name)` models.
pub async fn seed_models(pool: &PgPool, rows: &[(i64, i64, &str)]) -> Result<()> {
	for (id, manufacturer_id, name) in rows {
		sqlx::query("INSERT INTO vehicle_models (id, manufacturer_id, name) VALUES ($1, $2, $3)")
			.bind(id)
			.bind(manufacturer_id)
			.bind(name)
			.execute(pool)
			.await?;
	}

	Ok(())
}

pub async fn seed_auction(
	pool: &PgPool,
	id: i64,
	country: &str,
	end_datetime: OffsetDateTime,
) -> Result<()> {
	sqlx::query("INSERT INTO auctions (id, name, country, end_datetime) VALUES ($1, $2, $3, $4)")
		.bind(id)
		.bind(format!("Auction {id}"))
		.bind(country)
		.bind(end_datetime)
		.execute(pool)
		.await?;

	Ok(())
}

/// Inserts vehicles, taking the manufacturer from each model row.
pub async fn seed_vehicles(pool: &PgPool, rows: &[VehicleSeed]) -> Result<()> {
	for row in rows {
		sqlx::query(
			"\
INSERT INTO auction_vehicles (
	id, auction_id, manufacturer_id, model_id, manufacturing_date, mileage, engine, transmission,
	vin, start_price, active
)
SELECT $1, $2, m.manufacturer_id, m.id, $4, $5, 'diesel', 'manual', $6, 1000, $7
FROM vehicle_models m
WHERE m.id = $3",
		)
		.bind(row.id)
		.bind(row.auction_id)
		.bind(row.model_id)
		.bind(row.manufacturing_date)
		.bind(row.mileage)
		.bind(format!("WVWZZZ1JZXW{:06}", row.id))
		.bind(row.active)
		.execute(pool)
		.await?;
	}

	Ok(())
}
