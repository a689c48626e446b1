use sqlx::{PgPool, Postgres, QueryBuilder};

use autobid_domain::{Dimension, Predicate, VehicleField};

use crate::{
	Error, Result,
	models::{AuctionVehicle, AuctionVehicleCount, FacetRow, VehicleManufacturer, VehicleModel},
	sql,
};

const VEHICLE_SELECT: &str = "\
SELECT
	v.id,
	v.auction_id,
	v.manufacturer_id,
	m.name AS manufacturer,
	v.model_id,
	vm.name AS model,
	v.manufacturing_date,
	v.mileage,
	v.engine,
	v.transmission,
	v.vin,
	v.start_price,
	v.active
FROM auction_vehicles v
JOIN vehicle_manufacturers m ON m.id = v.manufacturer_id
JOIN vehicle_models vm ON vm.id = v.model_id
WHERE ";

/// One page of vehicles matching `predicate`, ordered by id.
pub async fn list_vehicles(
	pool: &PgPool,
	predicate: &Predicate<VehicleField>,
	offset: i64,
	limit: i64,
) -> Result<Vec<AuctionVehicle>> {
	check_page(offset, limit)?;

	let mut builder = QueryBuilder::<Postgres>::new(VEHICLE_SELECT);

	sql::push_predicate(&mut builder, predicate, "v");
	builder.push(" ORDER BY v.id LIMIT ");
	builder.push_bind(limit);
	builder.push(" OFFSET ");
	builder.push_bind(offset);

	Ok(builder.build_query_as().fetch_all(pool).await?)
}

pub async fn count_vehicles(pool: &PgPool, predicate: &Predicate<VehicleField>) -> Result<i64> {
	let mut builder =
		QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM auction_vehicles v WHERE ");

	sql::push_predicate(&mut builder, predicate, "v");

	Ok(builder.build_query_scalar().fetch_one(pool).await?)
}

/// Counts vehicles matching `predicate` grouped by one dimension.
///
/// Manufacturers and models are ordered by name, then id. Years are ordered numerically and carry
/// no id.
pub async fn facet_counts(
	pool: &PgPool,
	dimension: Dimension,
	predicate: &Predicate<VehicleField>,
) -> Result<Vec<FacetRow>> {
	let mut builder = match dimension {
		Dimension::Manufacturer => QueryBuilder::<Postgres>::new(
			"\
SELECT m.id AS id, m.name AS name, COUNT(*) AS count
FROM auction_vehicles v
JOIN vehicle_manufacturers m ON m.id = v.manufacturer_id
WHERE ",
		),
		Dimension::Model => QueryBuilder::<Postgres>::new(
			"\
SELECT vm.id AS id, vm.name AS name, COUNT(*) AS count
FROM auction_vehicles v
JOIN vehicle_models vm ON vm.id = v.model_id
WHERE ",
		),
		Dimension::RegistrationYear => QueryBuilder::<Postgres>::new(
			"\
SELECT NULL::bigint AS id, years.year::text AS name, years.count
FROM (
	SELECT EXTRACT(YEAR FROM v.manufacturing_date)::int AS year, COUNT(*) AS count
	FROM auction_vehicles v
	WHERE ",
		),
	};

	sql::push_predicate(&mut builder, predicate, "v");

	builder.push(match dimension {
		Dimension::Manufacturer => " GROUP BY m.id, m.name ORDER BY m.name, m.id",
		Dimension::Model => " GROUP BY vm.id, vm.name ORDER BY vm.name, vm.id",
		Dimension::RegistrationYear => " GROUP BY 1\n) AS years\nORDER BY years.year",
	});

	let rows: Vec<FacetRow> = builder.build_query_as().fetch_all(pool).await?;

	tracing::debug!(dimension = dimension.as_str(), values = rows.len(), "Computed facet counts.");

	Ok(rows)
}

/// Manufacturers among `ids` in one read. Unknown ids are absent; order is unspecified.
pub async fn manufacturers_by_ids(pool: &PgPool, ids: &[i64]) -> Result<Vec<VehicleManufacturer>> {
	if ids.is_empty() {
		return Ok(Vec::new());
	}

	let rows = sqlx::query_as::<_, VehicleManufacturer>(
		"SELECT id, name FROM vehicle_manufacturers WHERE id = ANY($1)",
	)
	.bind(ids)
	.fetch_all(pool)
	.await?;

	Ok(rows)
}

/// Models among `ids` in one read. Unknown ids are absent; order is unspecified.
pub async fn models_by_ids(pool: &PgPool, ids: &[i64]) -> Result<Vec<VehicleModel>> {
	if ids.is_empty() {
		return Ok(Vec::new());
	}

	let rows = sqlx::query_as::<_, VehicleModel>(
		"SELECT id, manufacturer_id, name FROM vehicle_models WHERE id = ANY($1)",
	)
	.bind(ids)
	.fetch_all(pool)
	.await?;

	Ok(rows)
}

/// Vehicle counts per auction in one grouped read. Auctions without vehicles are absent.
pub async fn count_by_auction(
	pool: &PgPool,
	auction_ids: &[i64],
) -> Result<Vec<AuctionVehicleCount>> {
	if auction_ids.is_empty() {
		return Ok(Vec::new());
	}

	let rows = sqlx::query_as::<_, AuctionVehicleCount>(
		"\
SELECT auction_id, COUNT(*) AS count
FROM auction_vehicles
WHERE auction_id = ANY($1)
GROUP BY auction_id",
	)
	.bind(auction_ids)
	.fetch_all(pool)
	.await?;

	Ok(rows)
}

pub(crate) fn check_page(offset: i64, limit: i64) -> Result<()> {
	if offset < 0 {
		return Err(Error::InvalidArgument(format!(
			"offset must be zero or greater, got {offset}."
		)));
	}
	if limit < 0 {
		return Err(Error::InvalidArgument(format!("limit must be zero or greater, got {limit}.")));
	}

	Ok(())
}
