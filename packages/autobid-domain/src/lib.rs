pub mod auction;
pub mod bids;
pub mod facet;
pub mod fields;
pub mod filter;
pub mod vehicle_query;

pub use auction::AuctionStatus;
pub use facet::{Dimension, FacetKey, FacetSet, FacetValue};
pub use fields::{AUCTION_FIELDS, AuctionField, VEHICLE_FIELDS, VehicleField};
pub use filter::{FieldTable, FilterRecord, FilterSpec, FilterValue, Predicate, RangeOp};
pub use vehicle_query::VehicleQuery;
