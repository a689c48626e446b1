use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::vehicle_query::{
	MANUFACTURER_ID, MANUFACTURING_DATE_GTE, MANUFACTURING_DATE_LTE, MODEL_ID,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetValue {
	pub id: Option<i64>,
	pub name: String,
	pub count: i64,
}
impl FacetValue {
	/// A seed entry for a value the caller selected, before counts are known.
	pub fn selected(id: Option<i64>, name: impl Into<String>) -> Self {
		Self { id, name: name.into(), count: 0 }
	}

	pub fn key(&self) -> FacetKey {
		match self.id {
			Some(id) => FacetKey::Id(id),
			None => FacetKey::Name(self.name.clone()),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FacetKey {
	Id(i64),
	Name(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetSet {
	pub manufacturers: Vec<FacetValue>,
	pub models: Vec<FacetValue>,
	pub registration_years: Vec<FacetValue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacetSort {
	ByName,
	ByYear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
	Manufacturer,
	Model,
	RegistrationYear,
}
impl Dimension {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Manufacturer => "manufacturer",
			Self::Model => "model",
			Self::RegistrationYear => "registration_year",
		}
	}

	/// Filter keys dropped when counting this dimension, so its own selection never narrows it.
	pub fn exclusion_keys(self) -> &'static [&'static str] {
		match self {
			Self::Manufacturer => &[MANUFACTURER_ID],
			Self::Model => &[MODEL_ID],
			Self::RegistrationYear => &[MANUFACTURING_DATE_GTE, MANUFACTURING_DATE_LTE],
		}
	}

	/// Manufacturer and model selections are ids that must resolve before they are seeded. Years
	/// are derived from a date column, so they seed straight from the requested range.
	pub fn requires_lookup(self) -> bool {
		matches!(self, Self::Manufacturer | Self::Model)
	}

	pub fn sort(self) -> FacetSort {
		match self {
			Self::Manufacturer | Self::Model => FacetSort::ByName,
			Self::RegistrationYear => FacetSort::ByYear,
		}
	}

	pub fn sort_facets(self, facets: &mut [FacetValue]) {
		match self.sort() {
			FacetSort::ByName => facets.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id))),
			FacetSort::ByYear => facets.sort_by(|a, b| {
				match (a.name.parse::<i32>(), b.name.parse::<i32>()) {
					(Ok(lhs), Ok(rhs)) => lhs.cmp(&rhs),
					_ => a.name.cmp(&b.name),
				}
			}),
		}
	}
}

/// Merges seeded selections with actual counts.
///
/// Seeds keep their order and a zero count unless an actual entry shares their key, in which case
/// the actual entry replaces them in place. Actual entries with new keys follow in their own order.
pub fn merge(selected: Vec<FacetValue>, actual: Vec<FacetValue>) -> Vec<FacetValue> {
	let mut merged: Vec<FacetValue> = Vec::with_capacity(selected.len() + actual.len());
	let mut index: HashMap<FacetKey, usize> = HashMap::new();

	for facet in selected.into_iter().chain(actual) {
		let key = facet.key();

		match index.get(&key) {
			Some(&position) => merged[position] = facet,
			None => {
				index.insert(key, merged.len());
				merged.push(facet);
			},
		}
	}

	merged
}

/// Builds zero-count seeds from existence lookups, in request order.
///
/// Ids that did not resolve are dropped.
pub fn seed_from_lookups<I, S>(resolved: I) -> Vec<FacetValue>
where
	I: IntoIterator<Item = Option<(i64, S)>>,
	S: Into<String>,
{
	resolved.into_iter().flatten().map(|(id, name)| FacetValue::selected(Some(id), name)).collect()
}

/// Every year of the inclusive range, or nothing when either bound is missing.
pub fn year_seed(from: Option<i32>, to: Option<i32>) -> Vec<FacetValue> {
	match (from, to) {
		(Some(from), Some(to)) =>
			(from..=to).map(|year| FacetValue::selected(None, year.to_string())).collect(),
		_ => Vec::new(),
	}
}

#[cfg(test)]
mod tests {
	use crate::facet::{Dimension, FacetValue, merge, seed_from_lookups, year_seed};

	fn facet(id: Option<i64>, name: &str, count: i64) -> FacetValue {
		FacetValue { id, name: name.to_string(), count }
	}

	#[test]
	fn duplicate_seeds_keep_first_position() {
		let merged = merge(
			vec![facet(Some(1), "Audi", 0), facet(Some(2), "BMW", 0), facet(Some(1), "Audi", 0)],
			Vec::new(),
		);

		assert_eq!(merged, vec![facet(Some(1), "Audi", 0), facet(Some(2), "BMW", 0)]);
	}

	#[test]
	fn names_key_values_without_ids() {
		let merged = merge(
			vec![facet(None, "2020", 0), facet(None, "2021", 0)],
			vec![facet(None, "2019", 4), facet(None, "2021", 2)],
		);

		assert_eq!(
			merged,
			vec![facet(None, "2020", 0), facet(None, "2021", 2), facet(None, "2019", 4)]
		);
	}

	#[test]
	fn unresolved_lookups_are_dropped() {
		let seeds = seed_from_lookups(vec![Some((3, "Volvo")), None, Some((1, "Audi"))]);

		assert_eq!(seeds, vec![facet(Some(3), "Volvo", 0), facet(Some(1), "Audi", 0)]);
	}

	#[test]
	fn year_seed_needs_both_bounds() {
		assert!(year_seed(Some(2020), None).is_empty());
		assert!(year_seed(None, Some(2020)).is_empty());
		assert!(year_seed(Some(2021), Some(2020)).is_empty());
		assert_eq!(
			year_seed(Some(2019), Some(2021)),
			vec![facet(None, "2019", 0), facet(None, "2020", 0), facet(None, "2021", 0)]
		);
	}

	#[test]
	fn years_sort_numerically() {
		let mut facets =
			vec![facet(None, "2010", 1), facet(None, "999", 1), facet(None, "2001", 1)];

		Dimension::RegistrationYear.sort_facets(&mut facets);

		assert_eq!(
			facets.iter().map(|facet| facet.name.as_str()).collect::<Vec<_>>(),
			vec!["999", "2001", "2010"]
		);
	}

	#[test]
	fn only_id_dimensions_need_lookups() {
		assert!(Dimension::Manufacturer.requires_lookup());
		assert!(Dimension::Model.requires_lookup());
		assert!(!Dimension::RegistrationYear.requires_lookup());
	}
}
