use time::{Date, OffsetDateTime};

use autobid_domain::{AuctionField, FacetValue, FilterRecord, FilterValue, VehicleField};

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Auction {
	pub id: i64,
	pub name: String,
	pub country: String,
	pub end_datetime: OffsetDateTime,
}
impl FilterRecord<AuctionField> for Auction {
	fn field_value(&self, field: AuctionField) -> Option<FilterValue> {
		Some(match field {
			AuctionField::Id => FilterValue::Int(self.id),
			AuctionField::Name => FilterValue::Text(self.name.clone()),
			AuctionField::Country => FilterValue::Text(self.country.clone()),
			AuctionField::EndDatetime => FilterValue::DateTime(self.end_datetime),
		})
	}
}

/// One auction vehicle joined with its manufacturer and model names.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct AuctionVehicle {
	pub id: i64,
	pub auction_id: i64,
	pub manufacturer_id: i64,
	pub manufacturer: String,
	pub model_id: i64,
	pub model: String,
	pub manufacturing_date: Date,
	pub mileage: i64,
	pub engine: String,
	pub transmission: String,
	pub vin: String,
	pub start_price: i64,
	pub active: bool,
}
impl FilterRecord<VehicleField> for AuctionVehicle {
	fn field_value(&self, field: VehicleField) -> Option<FilterValue> {
		Some(match field {
			VehicleField::Id => FilterValue::Int(self.id),
			VehicleField::AuctionId => FilterValue::Int(self.auction_id),
			VehicleField::ManufacturerId => FilterValue::Int(self.manufacturer_id),
			VehicleField::ModelId => FilterValue::Int(self.model_id),
			VehicleField::ManufacturingDate => FilterValue::Date(self.manufacturing_date),
			VehicleField::Mileage => FilterValue::Int(self.mileage),
			VehicleField::Engine => FilterValue::Text(self.engine.clone()),
			VehicleField::Transmission => FilterValue::Text(self.transmission.clone()),
			VehicleField::Active => FilterValue::Bool(self.active),
			VehicleField::StartPrice => FilterValue::Int(self.start_price),
		})
	}
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct VehicleManufacturer {
	pub id: i64,
	pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct VehicleModel {
	pub id: i64,
	pub manufacturer_id: i64,
	pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct FacetRow {
	pub id: Option<i64>,
	pub name: String,
	pub count: i64,
}
impl From<FacetRow> for FacetValue {
	fn from(row: FacetRow) -> Self {
		Self { id: row.id, name: row.name, count: row.count }
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct AuctionVehicleCount {
	pub auction_id: i64,
	pub count: i64,
}
