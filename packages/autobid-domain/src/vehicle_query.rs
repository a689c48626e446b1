use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use time::{Date, Month};

use crate::{
	facet::Dimension,
	filter::{FilterSpec, FilterValue},
};

pub const AUCTION_ID: &str = "auction_id";
pub const ACTIVE: &str = "active";
pub const MANUFACTURER_ID: &str = "manufacturer_id";
pub const MODEL_ID: &str = "model_id";
pub const MILEAGE_GTE: &str = "mileage__gte";
pub const MILEAGE_LTE: &str = "mileage__lte";
pub const MANUFACTURING_DATE_GTE: &str = "manufacturing_date__gte";
pub const MANUFACTURING_DATE_LTE: &str = "manufacturing_date__lte";

/// Caller-facing filter parameters for the vehicles of one auction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleQuery {
	#[serde(rename = "from", alias = "offset")]
	pub offset: i64,
	pub size: Option<u32>,
	pub is_active: Option<bool>,
	pub model_ids: Vec<i64>,
	pub manufacturer_ids: Vec<i64>,
	pub registration_year_from: Option<i32>,
	pub registration_year_to: Option<i32>,
	pub mileage_from: Option<i64>,
	pub mileage_to: Option<i64>,
}
impl VehicleQuery {
	/// Filters shared by every query, excluding the manufacturer and model selections.
	pub fn base_filters(&self) -> FilterSpec {
		let mut filters = FilterSpec::new();

		if let Some(active) = self.is_active {
			filters.set(ACTIVE, active);
		}
		if let Some(mileage) = self.mileage_from {
			filters.set(MILEAGE_GTE, mileage);
		}
		if let Some(mileage) = self.mileage_to {
			filters.set(MILEAGE_LTE, mileage);
		}
		if let Some(year) = self.registration_year_from {
			filters.set_opt(
				MANUFACTURING_DATE_GTE,
				Date::from_calendar_date(year, Month::January, 1).ok().map(FilterValue::Date),
			);
		}
		if let Some(year) = self.registration_year_to {
			filters.set_opt(
				MANUFACTURING_DATE_LTE,
				Date::from_calendar_date(year, Month::December, 31).ok().map(FilterValue::Date),
			);
		}

		filters
	}

	/// Every active filter; used for the item page and its total count.
	pub fn main_filters(&self) -> FilterSpec {
		let mut filters = self.base_filters();

		if !self.model_ids.is_empty() {
			filters.set(MODEL_ID, self.model_ids.clone());
		}
		if !self.manufacturer_ids.is_empty() {
			filters.set(MANUFACTURER_ID, self.manufacturer_ids.clone());
		}

		filters
	}

	/// Every active filter except the dimension's own.
	pub fn facet_filters(&self, dimension: Dimension) -> FilterSpec {
		self.main_filters().without(dimension.exclusion_keys())
	}

	/// Drops repeated manufacturer and model ids, keeping the first occurrence of each.
	pub fn dedup_selections(&mut self) {
		dedup_in_order(&mut self.manufacturer_ids);
		dedup_in_order(&mut self.model_ids);
	}
}

fn dedup_in_order(ids: &mut Vec<i64>) {
	let mut seen = HashSet::with_capacity(ids.len());

	ids.retain(|id| seen.insert(*id));
}
