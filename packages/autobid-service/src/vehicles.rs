use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use autobid_domain::{
	FacetSet, VEHICLE_FIELDS, VehicleQuery, bids, filter, vehicle_query::AUCTION_ID,
};
use autobid_storage::models::AuctionVehicle;

use crate::{AutobidService, Error, Result};

/// Oldest registration year a listing filter accepts.
pub const MIN_REGISTRATION_YEAR: i32 = 2000;
/// Most distinct manufacturer or model ids one listing request may select.
pub const MAX_SELECTED_IDS: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuctionVehicleItem {
	pub vehicle_id: i64,
	pub is_active: bool,
	pub manufacturer_id: i64,
	pub manufacturer: String,
	pub model_id: i64,
	pub model: String,
	#[serde(with = "crate::time_serde::date")]
	pub manufacturing_date: Date,
	pub mileage: i64,
	pub engine: String,
	pub transmission: String,
	pub vin: String,
	pub start_price: i64,
	#[serde(with = "crate::time_serde::option")]
	pub latest_bid_at: Option<OffsetDateTime>,
}
impl AuctionVehicleItem {
	fn from_row(row: AuctionVehicle, latest_bid_at: Option<OffsetDateTime>) -> Self {
		Self {
			vehicle_id: row.id,
			is_active: row.active,
			manufacturer_id: row.manufacturer_id,
			manufacturer: row.manufacturer,
			model_id: row.model_id,
			model: row.model,
			manufacturing_date: row.manufacturing_date,
			mileage: row.mileage,
			engine: row.engine,
			transmission: row.transmission,
			vin: row.vin,
			start_price: row.start_price,
			latest_bid_at,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleListResponse {
	pub total: i64,
	pub items: Vec<AuctionVehicleItem>,
	pub facets: FacetSet,
}

impl AutobidService {
	/// One page of an auction's vehicles with the total match count and facets.
	///
	/// Page, count, facets and bid lookup share the listing deadline; any failure fails the call.
	pub async fn list_auction_vehicles(
		&self,
		auction_id: i64,
		mut query: VehicleQuery,
	) -> Result<VehicleListResponse> {
		let limit = self.page_size(query.size)?;

		query.dedup_selections();
		validate_vehicle_query(&query, OffsetDateTime::now_utc().year())?;

		let filters = query.main_filters().with(AUCTION_ID, auction_id);
		let predicate = filter::compile(&filters, &VEHICLE_FIELDS);
		let page = async {
			let rows =
				self.catalogs.vehicles.list_vehicles(&predicate, query.offset, limit).await?;
			let vehicle_ids = rows.iter().map(|row| row.id).collect::<Vec<_>>();
			let latest_bids = self.catalogs.bids.latest_bids(&vehicle_ids).await?;

			Ok::<_, Error>((rows, latest_bids))
		};
		let listing = async {
			if self.catalogs.auctions.auction(auction_id).await?.is_none() {
				return Err(Error::not_found("Auction", auction_id));
			}

			tokio::try_join!(
				page,
				self.catalogs.vehicles.count_vehicles(&predicate),
				self.collect_facets(auction_id, &query),
			)
		};
		let ((rows, latest_bids), total, facets) =
			crate::with_deadline("list_auction_vehicles", self.deadline(), listing).await?;
		let items = bids::order_by_latest_bid(rows, |row| row.id, &latest_bids)
			.into_iter()
			.map(|row| {
				let latest_bid_at = latest_bids.get(&row.id).copied();

				AuctionVehicleItem::from_row(row, latest_bid_at)
			})
			.collect();

		Ok(VehicleListResponse { total, items, facets })
	}
}

/// Rejects out-of-range bounds, inverted ranges and oversized id selections.
pub fn validate_vehicle_query(query: &VehicleQuery, current_year: i32) -> Result<()> {
	crate::check_offset(query.offset)?;

	for (name, ids) in
		[("manufacturer_ids", &query.manufacturer_ids), ("model_ids", &query.model_ids)]
	{
		if ids.len() > MAX_SELECTED_IDS {
			return Err(Error::invalid(format!(
				"{name} accepts at most {MAX_SELECTED_IDS} ids, got {}.",
				ids.len()
			)));
		}
	}

	for (name, year) in [
		("registration_year_from", query.registration_year_from),
		("registration_year_to", query.registration_year_to),
	] {
		if let Some(year) = year
			&& !(MIN_REGISTRATION_YEAR..=current_year).contains(&year)
		{
			return Err(Error::invalid(format!(
				"{name} must be between {MIN_REGISTRATION_YEAR} and {current_year}, got {year}."
			)));
		}
	}
	for (name, mileage) in
		[("mileage_from", query.mileage_from), ("mileage_to", query.mileage_to)]
	{
		if let Some(mileage) = mileage
			&& mileage < 0
		{
			return Err(Error::invalid(format!("{name} must be zero or greater, got {mileage}.")));
		}
	}

	if let (Some(from), Some(to)) = (query.registration_year_from, query.registration_year_to)
		&& from > to
	{
		return Err(Error::invalid(
			"registration_year_from must not be after registration_year_to.",
		));
	}
	if let (Some(from), Some(to)) = (query.mileage_from, query.mileage_to)
		&& from > to
	{
		return Err(Error::invalid("mileage_from must not exceed mileage_to."));
	}

	Ok(())
}
