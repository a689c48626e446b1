use sqlx::{PgPool, Postgres, QueryBuilder};

use autobid_domain::{AuctionField, Predicate};

use crate::{Error, Result, models::Auction, sql, vehicles::check_page};

/// One page of auctions matching `predicate`, ordered by close time then id.
pub async fn list_auctions(
	pool: &PgPool,
	predicate: &Predicate<AuctionField>,
	offset: i64,
	limit: i64,
) -> Result<Vec<Auction>> {
	check_page(offset, limit)?;

	let mut builder = QueryBuilder::<Postgres>::new(
		"SELECT a.id, a.name, a.country, a.end_datetime FROM auctions a WHERE ",
	);

	sql::push_predicate(&mut builder, predicate, "a");
	builder.push(" ORDER BY a.end_datetime, a.id LIMIT ");
	builder.push_bind(limit);
	builder.push(" OFFSET ");
	builder.push_bind(offset);

	Ok(builder.build_query_as().fetch_all(pool).await?)
}

pub async fn count_auctions(pool: &PgPool, predicate: &Predicate<AuctionField>) -> Result<i64> {
	let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM auctions a WHERE ");

	sql::push_predicate(&mut builder, predicate, "a");

	Ok(builder.build_query_scalar().fetch_one(pool).await?)
}

pub async fn auction_by_id(pool: &PgPool, id: i64) -> Result<Option<Auction>> {
	let row = sqlx::query_as::<_, Auction>(
		"SELECT id, name, country, end_datetime FROM auctions WHERE id = $1",
	)
	.bind(id)
	.fetch_optional(pool)
	.await?;

	Ok(row)
}

pub async fn require_auction(pool: &PgPool, id: i64) -> Result<Auction> {
	auction_by_id(pool, id).await?.ok_or_else(|| Error::NotFound(format!("auction {id}")))
}
