pub mod auctions;
pub mod facets;
pub mod time_serde;
pub mod vehicles;

mod error;

pub use auctions::{
	AuctionCarPreview, AuctionItem, AuctionListQuery, AuctionListResponse, AuctionResponse,
};
pub use error::{Error, Result};
pub use vehicles::{AuctionVehicleItem, VehicleListResponse};

use std::{collections::HashMap, future::Future, pin::Pin, sync::Arc, time::Duration};

use sqlx::PgPool;
use time::OffsetDateTime;

use autobid_config::Config;
use autobid_domain::{AuctionField, Dimension, FacetValue, Predicate, VehicleField};
use autobid_storage::{
	auctions as auction_rows,
	db::Db,
	models::{Auction, AuctionVehicle, VehicleManufacturer, VehicleModel},
	vehicles as vehicle_rows,
};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Read access to auction vehicles and their reference data.
///
/// Every predicate already carries the auction scope.
pub trait VehicleCatalog
where
	Self: Send + Sync,
{
	fn list_vehicles<'a>(
		&'a self,
		predicate: &'a Predicate<VehicleField>,
		offset: i64,
		limit: i64,
	) -> BoxFuture<'a, Result<Vec<AuctionVehicle>>>;

	fn count_vehicles<'a>(
		&'a self,
		predicate: &'a Predicate<VehicleField>,
	) -> BoxFuture<'a, Result<i64>>;

	/// Counts per value of `dimension`, in the dimension's display order.
	fn facet_counts<'a>(
		&'a self,
		dimension: Dimension,
		predicate: &'a Predicate<VehicleField>,
	) -> BoxFuture<'a, Result<Vec<FacetValue>>>;

	/// Manufacturers among `ids`, in one read. Unknown ids are absent; order is unspecified.
	fn manufacturers<'a>(
		&'a self,
		ids: &'a [i64],
	) -> BoxFuture<'a, Result<Vec<VehicleManufacturer>>>;

	/// Models among `ids`, in one read. Unknown ids are absent; order is unspecified.
	fn models<'a>(&'a self, ids: &'a [i64]) -> BoxFuture<'a, Result<Vec<VehicleModel>>>;

	/// Vehicle counts keyed by auction id. Auctions without vehicles may be absent.
	fn count_by_auction<'a>(
		&'a self,
		auction_ids: &'a [i64],
	) -> BoxFuture<'a, Result<HashMap<i64, i64>>>;
}

pub trait AuctionCatalog
where
	Self: Send + Sync,
{
	fn list_auctions<'a>(
		&'a self,
		predicate: &'a Predicate<AuctionField>,
		offset: i64,
		limit: i64,
	) -> BoxFuture<'a, Result<Vec<Auction>>>;

	fn count_auctions<'a>(
		&'a self,
		predicate: &'a Predicate<AuctionField>,
	) -> BoxFuture<'a, Result<i64>>;

	fn auction(&self, id: i64) -> BoxFuture<'_, Result<Option<Auction>>>;
}

/// Source of bid activity for auction vehicles.
pub trait BidSource
where
	Self: Send + Sync,
{
	/// Time of the newest bid per vehicle. Vehicles without bids are absent.
	fn latest_bids<'a>(
		&'a self,
		vehicle_ids: &'a [i64],
	) -> BoxFuture<'a, Result<HashMap<i64, OffsetDateTime>>>;
}

/// Postgres-backed catalogs sharing one pool.
#[derive(Clone)]
pub struct PgCatalog {
	pool: PgPool,
}
impl PgCatalog {
	pub fn new(pool: PgPool) -> Self {
		Self { pool }
	}
}

/// Bid source used until bidding is wired in; it never reports bids.
pub struct NoBids;

#[derive(Clone)]
pub struct Catalogs {
	pub vehicles: Arc<dyn VehicleCatalog>,
	pub auctions: Arc<dyn AuctionCatalog>,
	pub bids: Arc<dyn BidSource>,
}

pub struct AutobidService {
	pub cfg: Config,
	pub catalogs: Catalogs,
}

impl VehicleCatalog for PgCatalog {
	fn list_vehicles<'a>(
		&'a self,
		predicate: &'a Predicate<VehicleField>,
		offset: i64,
		limit: i64,
	) -> BoxFuture<'a, Result<Vec<AuctionVehicle>>> {
		Box::pin(async move {
			vehicle_rows::list_vehicles(&self.pool, predicate, offset, limit)
				.await
				.map_err(Error::from)
		})
	}

	fn count_vehicles<'a>(
		&'a self,
		predicate: &'a Predicate<VehicleField>,
	) -> BoxFuture<'a, Result<i64>> {
		Box::pin(async move {
			vehicle_rows::count_vehicles(&self.pool, predicate).await.map_err(Error::from)
		})
	}

	fn facet_counts<'a>(
		&'a self,
		dimension: Dimension,
		predicate: &'a Predicate<VehicleField>,
	) -> BoxFuture<'a, Result<Vec<FacetValue>>> {
		Box::pin(async move {
			let rows = vehicle_rows::facet_counts(&self.pool, dimension, predicate).await?;

			Ok::<_, Error>(rows.into_iter().map(FacetValue::from).collect())
		})
	}

	fn manufacturers<'a>(
		&'a self,
		ids: &'a [i64],
	) -> BoxFuture<'a, Result<Vec<VehicleManufacturer>>> {
		Box::pin(async move {
			vehicle_rows::manufacturers_by_ids(&self.pool, ids).await.map_err(Error::from)
		})
	}

	fn models<'a>(&'a self, ids: &'a [i64]) -> BoxFuture<'a, Result<Vec<VehicleModel>>> {
		Box::pin(async move {
			vehicle_rows::models_by_ids(&self.pool, ids).await.map_err(Error::from)
		})
	}

	fn count_by_auction<'a>(
		&'a self,
		auction_ids: &'a [i64],
	) -> BoxFuture<'a, Result<HashMap<i64, i64>>> {
		Box::pin(async move {
			let rows = vehicle_rows::count_by_auction(&self.pool, auction_ids).await?;

			Ok::<_, Error>(rows.into_iter().map(|row| (row.auction_id, row.count)).collect())
		})
	}
}

impl AuctionCatalog for PgCatalog {
	fn list_auctions<'a>(
		&'a self,
		predicate: &'a Predicate<AuctionField>,
		offset: i64,
		limit: i64,
	) -> BoxFuture<'a, Result<Vec<Auction>>> {
		Box::pin(async move {
			auction_rows::list_auctions(&self.pool, predicate, offset, limit)
				.await
				.map_err(Error::from)
		})
	}

	fn count_auctions<'a>(
		&'a self,
		predicate: &'a Predicate<AuctionField>,
	) -> BoxFuture<'a, Result<i64>> {
		Box::pin(async move {
			auction_rows::count_auctions(&self.pool, predicate).await.map_err(Error::from)
		})
	}

	fn auction(&self, id: i64) -> BoxFuture<'_, Result<Option<Auction>>> {
		Box::pin(async move {
			auction_rows::auction_by_id(&self.pool, id).await.map_err(Error::from)
		})
	}
}

impl BidSource for NoBids {
	fn latest_bids<'a>(
		&'a self,
		_vehicle_ids: &'a [i64],
	) -> BoxFuture<'a, Result<HashMap<i64, OffsetDateTime>>> {
		Box::pin(async { Ok::<_, Error>(HashMap::new()) })
	}
}

impl Catalogs {
	pub fn new(
		vehicles: Arc<dyn VehicleCatalog>,
		auctions: Arc<dyn AuctionCatalog>,
		bids: Arc<dyn BidSource>,
	) -> Self {
		Self { vehicles, auctions, bids }
	}

	pub fn postgres(pool: PgPool) -> Self {
		let catalog = Arc::new(PgCatalog::new(pool));

		Self { vehicles: catalog.clone(), auctions: catalog, bids: Arc::new(NoBids) }
	}
}

impl AutobidService {
	pub fn new(cfg: Config, db: Db) -> Self {
		Self { cfg, catalogs: Catalogs::postgres(db.pool) }
	}

	pub fn with_catalogs(cfg: Config, catalogs: Catalogs) -> Self {
		Self { cfg, catalogs }
	}

	/// Resolves a requested page size against the configured default and maximum.
	pub(crate) fn page_size(&self, size: Option<u32>) -> Result<i64> {
		let listing = &self.cfg.listing;
		let size = size.unwrap_or(listing.default_page_size);

		if size == 0 || size > listing.max_page_size {
			return Err(Error::invalid(format!(
				"size must be between 1 and {}, got {size}.",
				listing.max_page_size
			)));
		}

		Ok(size.into())
	}

	pub(crate) fn deadline(&self) -> Duration {
		Duration::from_millis(self.cfg.listing.facet_timeout_ms)
	}
}

pub(crate) fn check_offset(offset: i64) -> Result<()> {
	if offset < 0 {
		return Err(Error::invalid(format!("from must be zero or greater, got {offset}.")));
	}

	Ok(())
}

/// Runs `work` under `deadline`; expiry drops every pending read and yields [`Error::Timeout`].
pub(crate) async fn with_deadline<T, F>(
	operation: &'static str,
	deadline: Duration,
	work: F,
) -> Result<T>
where
	F: Future<Output = Result<T>>,
{
	match tokio::time::timeout(deadline, work).await {
		Ok(result) => result,
		Err(_) => {
			let timeout_ms = u64::try_from(deadline.as_millis()).unwrap_or(u64::MAX);

			tracing::warn!(operation, timeout_ms, "Deadline exceeded; pending reads dropped.");

			Err(Error::Timeout { operation, timeout_ms })
		},
	}
}
