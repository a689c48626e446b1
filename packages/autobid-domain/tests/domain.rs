use time::{Date, Duration, OffsetDateTime, macros::date};

use autobid_domain::{
	AuctionStatus, FacetValue, FilterRecord, FilterSpec, FilterValue, VEHICLE_FIELDS,
	VehicleField, auction, facet, filter,
};

struct Vehicle {
	id: i64,
	manufacturer_id: i64,
	mileage: i64,
	manufacturing_date: Date,
}
impl FilterRecord<VehicleField> for Vehicle {
	fn field_value(&self, field: VehicleField) -> Option<FilterValue> {
		match field {
			VehicleField::Id => Some(FilterValue::Int(self.id)),
			VehicleField::ManufacturerId => Some(FilterValue::Int(self.manufacturer_id)),
			VehicleField::Mileage => Some(FilterValue::Int(self.mileage)),
			VehicleField::ManufacturingDate => Some(FilterValue::Date(self.manufacturing_date)),
			_ => None,
		}
	}
}

fn fleet() -> Vec<Vehicle> {
	[50_000, 100_000, 150_000]
		.into_iter()
		.enumerate()
		.map(|(index, mileage)| Vehicle {
			id: index as i64 + 1,
			manufacturer_id: 1,
			mileage,
			manufacturing_date: date!(2020 - 06 - 01),
		})
		.collect()
}

fn mileages(filters: &FilterSpec) -> Vec<i64> {
	let predicate = filter::compile(filters, &VEHICLE_FIELDS);

	fleet()
		.into_iter()
		.filter(|vehicle| predicate.matches(vehicle))
		.map(|vehicle| vehicle.mileage)
		.collect()
}

fn entry(id: Option<i64>, name: &str, count: i64) -> FacetValue {
	FacetValue { id, name: name.to_string(), count }
}

#[test]
fn mileage_from_is_inclusive() {
	let filters = FilterSpec::new().with("mileage__gte", 100_000_i64);

	assert_eq!(mileages(&filters), vec![100_000, 150_000]);
}

#[test]
fn mileage_between_is_inclusive_range() {
	let filters = FilterSpec::new().with("mileage__between", vec![75_000_i64, 125_000]);

	assert_eq!(mileages(&filters), vec![100_000]);
}

#[test]
fn between_with_wrong_arity_is_a_no_op() {
	let one = FilterSpec::new().with("mileage__between", vec![75_000_i64]);
	let three = FilterSpec::new().with("mileage__between", vec![1_i64, 2, 3]);

	assert!(filter::compile(&one, &VEHICLE_FIELDS).is_unconstrained());
	assert!(filter::compile(&three, &VEHICLE_FIELDS).is_unconstrained());
	assert_eq!(mileages(&one), vec![50_000, 100_000, 150_000]);
	assert_eq!(mileages(&three), vec![50_000, 100_000, 150_000]);
}

#[test]
fn unknown_suffixed_field_has_no_effect() {
	let base = FilterSpec::new().with("mileage__lte", 100_000_i64);
	let extended =
		base.clone().with("horsepower__gte", 300_i64).with("colour__between", vec![1_i64, 2]);

	assert_eq!(
		filter::compile(&base, &VEHICLE_FIELDS),
		filter::compile(&extended, &VEHICLE_FIELDS)
	);
}

#[test]
fn unknown_bare_field_has_no_effect() {
	let filters =
		FilterSpec::new().with("status", "closed").with("datetime", date!(2024 - 01 - 01));

	assert!(filter::compile(&filters, &VEHICLE_FIELDS).is_unconstrained());
}

#[test]
fn actual_count_replaces_seed() {
	let merged = facet::merge(vec![entry(Some(5), "BMW", 0)], vec![entry(Some(5), "BMW", 3)]);

	assert_eq!(merged, vec![entry(Some(5), "BMW", 3)]);
}

#[test]
fn unmatched_seed_stays_at_zero() {
	let merged = facet::merge(vec![entry(Some(7), "Audi", 0)], Vec::new());

	assert_eq!(merged, vec![entry(Some(7), "Audi", 0)]);
}

#[test]
fn merge_orders_seeds_before_new_actuals() {
	let merged = facet::merge(
		vec![entry(Some(9), "Volvo", 0), entry(Some(2), "BMW", 0)],
		vec![entry(Some(1), "Audi", 4), entry(Some(2), "BMW", 2), entry(Some(3), "Opel", 1)],
	);

	assert_eq!(
		merged,
		vec![
			entry(Some(9), "Volvo", 0),
			entry(Some(2), "BMW", 2),
			entry(Some(1), "Audi", 4),
			entry(Some(3), "Opel", 1),
		]
	);
}

#[test]
fn derived_status_sort_puts_closed_last() {
	let now = OffsetDateTime::UNIX_EPOCH + Duration::days(10_000);
	let mut auctions = vec![
		("A", now + Duration::hours(1)),
		("B", now - Duration::hours(1)),
		("C", now + Duration::hours(2)),
	];

	auction::sort_by_status(&mut auctions, |(_, close)| (AuctionStatus::at(now, *close), *close));

	assert_eq!(auctions.iter().map(|(name, _)| *name).collect::<Vec<_>>(), vec!["A", "C", "B"]);
}
