use crate::filter::FieldTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VehicleField {
	Id,
	AuctionId,
	ManufacturerId,
	ModelId,
	ManufacturingDate,
	Mileage,
	Engine,
	Transmission,
	Active,
	StartPrice,
}
impl VehicleField {
	/// Column name in `auction_vehicles`.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Id => "id",
			Self::AuctionId => "auction_id",
			Self::ManufacturerId => "manufacturer_id",
			Self::ModelId => "model_id",
			Self::ManufacturingDate => "manufacturing_date",
			Self::Mileage => "mileage",
			Self::Engine => "engine",
			Self::Transmission => "transmission",
			Self::Active => "active",
			Self::StartPrice => "start_price",
		}
	}
}

pub const VEHICLE_FIELDS: FieldTable<VehicleField> = FieldTable::new(
	"auction_vehicle",
	&[
		("id", VehicleField::Id),
		("auction_id", VehicleField::AuctionId),
		("manufacturer_id", VehicleField::ManufacturerId),
		("model_id", VehicleField::ModelId),
		("manufacturing_date", VehicleField::ManufacturingDate),
		("mileage", VehicleField::Mileage),
		("engine", VehicleField::Engine),
		("transmission", VehicleField::Transmission),
		("active", VehicleField::Active),
		("start_price", VehicleField::StartPrice),
	],
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuctionField {
	Id,
	Name,
	Country,
	EndDatetime,
}
impl AuctionField {
	/// Column name in `auctions`.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Id => "id",
			Self::Name => "name",
			Self::Country => "country",
			Self::EndDatetime => "end_datetime",
		}
	}
}

pub const AUCTION_FIELDS: FieldTable<AuctionField> = FieldTable::new(
	"auction",
	&[
		("id", AuctionField::Id),
		("name", AuctionField::Name),
		("country", AuctionField::Country),
		("end_datetime", AuctionField::EndDatetime),
	],
);
