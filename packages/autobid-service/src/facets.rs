//! Facet aggregation for one auction's vehicles.
//!
//! Each dimension is counted under every active filter except its own, so a selection never
//! narrows the options offered next to it. Selected manufacturers, models and years are seeded
//! with zero counts and merged with the actual counts, so a selection stays visible even when
//! nothing matches it.

use std::{collections::HashMap, time::Instant};

use autobid_domain::{
	Dimension, FacetSet, FacetValue, VEHICLE_FIELDS, VehicleQuery, facet, filter,
	vehicle_query::AUCTION_ID,
};

use crate::{AutobidService, Result};

impl AutobidService {
	/// Facets for the vehicles of `auction_id` under `query`, bounded by the listing deadline.
	pub async fn vehicle_facets(&self, auction_id: i64, query: &VehicleQuery) -> Result<FacetSet> {
		let work = self.collect_facets(auction_id, query);

		crate::with_deadline("vehicle_facets", self.deadline(), work).await
	}

	/// Runs the three counts and both seed lookups concurrently, one read each. The first failure
	/// cancels the rest and no partial set is returned.
	pub(crate) async fn collect_facets(
		&self,
		auction_id: i64,
		query: &VehicleQuery,
	) -> Result<FacetSet> {
		let started = Instant::now();
		let (manufacturers, models, years, selected_manufacturers, selected_models) =
			tokio::try_join!(
				self.dimension_counts(Dimension::Manufacturer, auction_id, query),
				self.dimension_counts(Dimension::Model, auction_id, query),
				self.dimension_counts(Dimension::RegistrationYear, auction_id, query),
				self.lookup_seeds(Dimension::Manufacturer, &query.manufacturer_ids),
				self.lookup_seeds(Dimension::Model, &query.model_ids),
			)?;
		let selected_years =
			facet::year_seed(query.registration_year_from, query.registration_year_to);
		let facets = FacetSet {
			manufacturers: facet::merge(selected_manufacturers, manufacturers),
			models: facet::merge(selected_models, models),
			registration_years: facet::merge(selected_years, years),
		};

		tracing::debug!(
			auction_id,
			manufacturers = facets.manufacturers.len(),
			models = facets.models.len(),
			registration_years = facets.registration_years.len(),
			elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
			"Collected vehicle facets."
		);

		Ok(facets)
	}

	async fn dimension_counts(
		&self,
		dimension: Dimension,
		auction_id: i64,
		query: &VehicleQuery,
	) -> Result<Vec<FacetValue>> {
		let filters = query.facet_filters(dimension).with(AUCTION_ID, auction_id);
		let predicate = filter::compile(&filters, &VEHICLE_FIELDS);

		self.catalogs.vehicles.facet_counts(dimension, &predicate).await
	}

	/// Zero-count seeds for the selected ids of a looked-up dimension, one catalog read per call.
	async fn lookup_seeds(&self, dimension: Dimension, ids: &[i64]) -> Result<Vec<FacetValue>> {
		if !dimension.requires_lookup() || ids.is_empty() {
			return Ok(Vec::new());
		}

		let found: Vec<(i64, String)> = match dimension {
			Dimension::Manufacturer => self
				.catalogs
				.vehicles
				.manufacturers(ids)
				.await?
				.into_iter()
				.map(|row| (row.id, row.name))
				.collect(),
			Dimension::Model => self
				.catalogs
				.vehicles
				.models(ids)
				.await?
				.into_iter()
				.map(|row| (row.id, row.name))
				.collect(),
			Dimension::RegistrationYear => Vec::new(),
		};

		Ok(seed_in_request_order(ids, found))
	}
}

/// Seeds follow the caller's id order, whatever order the lookup returned rows in.
fn seed_in_request_order<I>(ids: &[i64], found: I) -> Vec<FacetValue>
where
	I: IntoIterator<Item = (i64, String)>,
{
	let mut names: HashMap<i64, String> = found.into_iter().collect();

	facet::seed_from_lookups(ids.iter().map(|id| names.remove(id).map(|name| (*id, name))))
}
