use std::collections::HashMap;

use futures::future;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use autobid_domain::{
	AUCTION_FIELDS, AuctionStatus, FilterSpec, VEHICLE_FIELDS, auction, filter,
	vehicle_query::{ACTIVE, AUCTION_ID},
};
use autobid_storage::models::{Auction, AuctionVehicle};

use crate::{AutobidService, Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuctionListQuery {
	#[serde(rename = "from", alias = "offset")]
	pub offset: i64,
	pub size: Option<u32>,
	pub country: Option<String>,
	pub status: Option<String>,
}
impl AuctionListQuery {
	/// The requested status; an empty value means no status filter.
	pub fn status(&self) -> Result<Option<AuctionStatus>> {
		match self.status.as_deref().map(str::trim) {
			None | Some("") => Ok(None),
			Some(raw) => AuctionStatus::parse(raw).map(Some).ok_or_else(|| {
				Error::invalid(format!("status must be active or closed, got {raw:?}."))
			}),
		}
	}

	pub fn country(&self) -> Result<Option<&str>> {
		match self.country.as_deref().map(str::trim) {
			None | Some("") => Ok(None),
			Some(code) if code.chars().count() == 2 => Ok(Some(code)),
			Some(code) => Err(Error::invalid(format!(
				"country must be a two-letter code, got {code:?}."
			))),
		}
	}

	/// Filters for this query with status resolved against `now`.
	pub fn filters(&self, now: OffsetDateTime) -> Result<FilterSpec> {
		let mut filters = FilterSpec::new();

		if let Some(country) = self.country()? {
			filters.set(auction::COUNTRY, country);
		}
		if let Some(status) = self.status()? {
			status.apply(&mut filters, now);
		}

		Ok(filters)
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuctionCarPreview {
	pub id: i64,
	pub manufacturer_id: i64,
	pub manufacturer: String,
	pub model_id: i64,
	pub model: String,
	pub mileage: i64,
	#[serde(with = "crate::time_serde::date")]
	pub manufacturing_date: Date,
}
impl From<AuctionVehicle> for AuctionCarPreview {
	fn from(row: AuctionVehicle) -> Self {
		Self {
			id: row.id,
			manufacturer_id: row.manufacturer_id,
			manufacturer: row.manufacturer,
			model_id: row.model_id,
			model: row.model,
			mileage: row.mileage,
			manufacturing_date: row.manufacturing_date,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuctionItem {
	pub id: i64,
	pub country: String,
	pub name: String,
	pub car_count: i64,
	#[serde(with = "crate::time_serde")]
	pub close_date: OffsetDateTime,
	pub status: AuctionStatus,
	pub car_preview: Vec<AuctionCarPreview>,
}
impl AuctionItem {
	fn from_row(
		row: Auction,
		now: OffsetDateTime,
		car_count: i64,
		car_preview: Vec<AuctionCarPreview>,
	) -> Self {
		Self {
			id: row.id,
			status: AuctionStatus::at(now, row.end_datetime),
			country: row.country,
			name: row.name,
			car_count,
			close_date: row.end_datetime,
			car_preview,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuctionListResponse {
	pub total: i64,
	pub items: Vec<AuctionItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuctionResponse {
	pub auction: AuctionItem,
}

impl AutobidService {
	pub async fn list_auctions(&self, query: AuctionListQuery) -> Result<AuctionListResponse> {
		self.list_auctions_at(query, OffsetDateTime::now_utc()).await
	}

	/// Lists auctions with status derived at `now`: active ones first, then closed, each by close
	/// time.
	pub async fn list_auctions_at(
		&self,
		query: AuctionListQuery,
		now: OffsetDateTime,
	) -> Result<AuctionListResponse> {
		let limit = self.page_size(query.size)?;

		crate::check_offset(query.offset)?;

		let predicate = filter::compile(&query.filters(now)?, &AUCTION_FIELDS);
		let listing = async {
			let (rows, total) = tokio::try_join!(
				self.catalogs.auctions.list_auctions(&predicate, query.offset, limit),
				self.catalogs.auctions.count_auctions(&predicate),
			)?;
			let auction_ids = rows.iter().map(|row| row.id).collect::<Vec<_>>();
			let (car_counts, previews) = tokio::try_join!(
				self.catalogs.vehicles.count_by_auction(&auction_ids),
				future::try_join_all(auction_ids.iter().map(|id| self.car_preview(*id))),
			)?;

			Ok::<_, Error>((rows, total, car_counts, previews))
		};
		let (rows, total, car_counts, previews) =
			crate::with_deadline("list_auctions", self.deadline(), listing).await?;
		let mut items = assemble(rows, now, &car_counts, previews);

		auction::sort_by_status(&mut items, |item| (item.status, item.close_date));

		Ok(AuctionListResponse { total, items })
	}

	/// A single auction with its vehicle count. Previews are only built for list views.
	pub async fn get_auction(&self, auction_id: i64) -> Result<AuctionResponse> {
		let lookup = async {
			let Some(row) = self.catalogs.auctions.auction(auction_id).await? else {
				return Err(Error::not_found("Auction", auction_id));
			};
			let car_counts = self.catalogs.vehicles.count_by_auction(&[auction_id]).await?;

			Ok::<_, Error>((row, car_counts))
		};
		let (row, car_counts) =
			crate::with_deadline("get_auction", self.deadline(), lookup).await?;
		let car_count = car_counts.get(&auction_id).copied().unwrap_or(0);

		Ok(AuctionResponse {
			auction: AuctionItem::from_row(row, OffsetDateTime::now_utc(), car_count, Vec::new()),
		})
	}

	async fn car_preview(&self, auction_id: i64) -> Result<Vec<AuctionCarPreview>> {
		let filters = FilterSpec::new().with(AUCTION_ID, auction_id).with(ACTIVE, true);
		let predicate = filter::compile(&filters, &VEHICLE_FIELDS);
		let limit = self.cfg.listing.preview_vehicles.into();
		let rows = self.catalogs.vehicles.list_vehicles(&predicate, 0, limit).await?;

		Ok(rows.into_iter().map(AuctionCarPreview::from).collect())
	}
}

fn assemble(
	rows: Vec<Auction>,
	now: OffsetDateTime,
	car_counts: &HashMap<i64, i64>,
	previews: Vec<Vec<AuctionCarPreview>>,
) -> Vec<AuctionItem> {
	rows.into_iter()
		.zip(previews)
		.map(|(row, preview)| {
			let car_count = car_counts.get(&row.id).copied().unwrap_or(0);

			AuctionItem::from_row(row, now, car_count, preview)
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use time::OffsetDateTime;

	use autobid_domain::{
		FilterValue,
		auction::{COUNTRY, END_DATETIME_GT},
	};

	use crate::{Error, auctions::AuctionListQuery};

	#[test]
	fn empty_status_and_country_mean_no_filter() {
		let query = AuctionListQuery {
			status: Some(String::new()),
			country: Some(" ".to_string()),
			..Default::default()
		};

		assert!(query.filters(OffsetDateTime::UNIX_EPOCH).expect("filters").is_empty());
	}

	#[test]
	fn status_becomes_close_time_bound() {
		let now = OffsetDateTime::UNIX_EPOCH;
		let query = AuctionListQuery {
			status: Some("active".to_string()),
			country: Some("DE".to_string()),
			..Default::default()
		};
		let filters = query.filters(now).expect("filters");

		assert_eq!(filters.get(COUNTRY), Some(&FilterValue::Text("DE".to_string())));
		assert_eq!(filters.get(END_DATETIME_GT), Some(&FilterValue::DateTime(now)));
	}

	#[test]
	fn unknown_status_is_rejected() {
		let query = AuctionListQuery { status: Some("pending".to_string()), ..Default::default() };

		assert!(matches!(
			query.filters(OffsetDateTime::UNIX_EPOCH),
			Err(Error::InvalidRequest { .. })
		));
	}

	#[test]
	fn country_must_be_two_letters() {
		let query = AuctionListQuery { country: Some("DEU".to_string()), ..Default::default() };

		assert!(query.country().is_err());
	}
}
