use time::{Date, Duration, OffsetDateTime, macros::date};

use autobid_config::Postgres;
use autobid_domain::{
	AUCTION_FIELDS, Dimension, FilterSpec, Predicate, VEHICLE_FIELDS, VehicleField, filter,
};
use autobid_storage::{auctions, db::Db, vehicles};
use autobid_testkit::{
	TestDatabase,
	fixtures::{self, VehicleSeed},
};

fn vehicle(
	id: i64,
	auction_id: i64,
	model_id: i64,
	manufacturing_date: Date,
	mileage: i64,
	active: bool,
) -> VehicleSeed {
	VehicleSeed { id, auction_id, model_id, manufacturing_date, mileage, active }
}

async fn seeded(test_db: &TestDatabase) -> Db {
	let cfg = Postgres { dsn: test_db.dsn().to_string(), pool_max_conns: 2 };
	let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");

	let now = OffsetDateTime::now_utc();

	fixtures::seed_manufacturers(&db.pool, &[(1, "Audi"), (2, "BMW")])
		.await
		.expect("Failed to seed manufacturers.");
	fixtures::seed_models(&db.pool, &[(10, 1, "A4"), (20, 2, "X5")])
		.await
		.expect("Failed to seed models.");
	fixtures::seed_auction(&db.pool, 100, "DE", now + Duration::hours(1))
		.await
		.expect("Failed to seed auction.");
	fixtures::seed_auction(&db.pool, 200, "NL", now - Duration::hours(1))
		.await
		.expect("Failed to seed auction.");
	fixtures::seed_vehicles(
		&db.pool,
		&[
			vehicle(1, 100, 10, date!(2019 - 05 - 01), 50_000, true),
			vehicle(2, 100, 10, date!(2020 - 05 - 01), 100_000, true),
			vehicle(3, 100, 20, date!(2020 - 07 - 01), 150_000, false),
			vehicle(4, 200, 20, date!(2021 - 01 - 01), 10_000, true),
		],
	)
	.await
	.expect("Failed to seed vehicles.");

	db
}

fn vehicle_predicate(filters: FilterSpec) -> Predicate<VehicleField> {
	filter::compile(&filters.with("auction_id", 100_i64), &VEHICLE_FIELDS)
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set AUTOBID_PG_DSN to run."]
async fn mileage_bounds_are_inclusive() {
	let Some(base_dsn) = autobid_testkit::env_dsn() else {
		eprintln!("Skipping mileage_bounds_are_inclusive; set AUTOBID_PG_DSN to run this test.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = seeded(&test_db).await;
	let predicate = vehicle_predicate(FilterSpec::new().with("mileage__gte", 100_000_i64));
	let page = vehicles::list_vehicles(&db.pool, &predicate, 0, 10).await.expect("page");
	let total = vehicles::count_vehicles(&db.pool, &predicate).await.expect("count");

	assert_eq!(
		page.iter().map(|vehicle| vehicle.mileage).collect::<Vec<_>>(),
		vec![100_000, 150_000]
	);
	assert_eq!(total, 2);

	let predicate =
		vehicle_predicate(FilterSpec::new().with("mileage__between", vec![75_000_i64, 125_000]));
	let page = vehicles::list_vehicles(&db.pool, &predicate, 0, 10).await.expect("page");

	assert_eq!(page.iter().map(|vehicle| vehicle.id).collect::<Vec<_>>(), vec![2]);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set AUTOBID_PG_DSN to run."]
async fn facets_group_by_dimension() {
	let Some(base_dsn) = autobid_testkit::env_dsn() else {
		eprintln!("Skipping facets_group_by_dimension; set AUTOBID_PG_DSN to run this test.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = seeded(&test_db).await;
	let predicate = vehicle_predicate(FilterSpec::new());
	let manufacturers = vehicles::facet_counts(&db.pool, Dimension::Manufacturer, &predicate)
		.await
		.expect("manufacturer facets");
	let years = vehicles::facet_counts(&db.pool, Dimension::RegistrationYear, &predicate)
		.await
		.expect("year facets");

	assert_eq!(
		manufacturers.iter().map(|row| (row.id, row.name.as_str(), row.count)).collect::<Vec<_>>(),
		vec![(Some(1), "Audi", 2), (Some(2), "BMW", 1)]
	);
	assert_eq!(
		years.iter().map(|row| (row.id, row.name.as_str(), row.count)).collect::<Vec<_>>(),
		vec![(None, "2019", 1), (None, "2020", 2)]
	);

	let empty = vehicle_predicate(FilterSpec::new().with("model_id", Vec::<i64>::new()));

	assert_eq!(vehicles::count_vehicles(&db.pool, &empty).await.expect("count"), 0);

	// More ids than a statement may carry as separate parameters.
	let wide = vehicle_predicate(
		FilterSpec::new().with("model_id", (1..=70_000_i64).collect::<Vec<_>>()),
	);

	assert_eq!(vehicles::count_vehicles(&db.pool, &wide).await.expect("count"), 3);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set AUTOBID_PG_DSN to run."]
async fn lookups_and_auction_reads() {
	let Some(base_dsn) = autobid_testkit::env_dsn() else {
		eprintln!("Skipping lookups_and_auction_reads; set AUTOBID_PG_DSN to run this test.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = seeded(&test_db).await;

	let manufacturers =
		vehicles::manufacturers_by_ids(&db.pool, &[2, 42]).await.expect("manufacturer lookup");

	assert_eq!(
		manufacturers.into_iter().map(|row| (row.id, row.name)).collect::<Vec<_>>(),
		vec![(2, "BMW".to_string())]
	);
	assert!(vehicles::models_by_ids(&db.pool, &[99]).await.expect("model lookup").is_empty());

	let counts = vehicles::count_by_auction(&db.pool, &[100, 200, 300]).await.expect("counts");
	let mut counts = counts.iter().map(|row| (row.auction_id, row.count)).collect::<Vec<_>>();

	counts.sort_unstable();

	assert_eq!(counts, vec![(100, 3), (200, 1)]);

	let predicate = filter::compile(&FilterSpec::new().with("country", "NL"), &AUCTION_FIELDS);
	let page = auctions::list_auctions(&db.pool, &predicate, 0, 10).await.expect("auctions");

	assert_eq!(page.iter().map(|auction| auction.id).collect::<Vec<_>>(), vec![200]);
	assert_eq!(auctions::count_auctions(&db.pool, &predicate).await.expect("count"), 1);
	assert!(matches!(
		auctions::require_auction(&db.pool, 999).await,
		Err(autobid_storage::Error::NotFound(_))
	));

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
