//! Filter specifications and their compilation into typed predicates.
//!
//! A [`FilterSpec`] is a flat, ordered set of optional filter keys. A key is either a bare field
//! name (equality, or membership when the value is a list) or a field name carrying one of the
//! [`RangeOp`] suffixes. [`compile`] resolves field names through a per-entity [`FieldTable`] and
//! turns every usable key into a [`Predicate`] clause. Keys that cannot be used are ignored and
//! logged, never rejected.

use std::{
	cmp::Ordering,
	fmt::{Debug, Display, Formatter},
};

use time::{Date, OffsetDateTime};

#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
	Bool(bool),
	Int(i64),
	Date(Date),
	DateTime(OffsetDateTime),
	Text(String),
	List(Vec<FilterValue>),
}
impl FilterValue {
	pub fn is_list(&self) -> bool {
		matches!(self, Self::List(_))
	}

	/// Orders two scalar values of the same kind. Mixed kinds and lists are incomparable.
	pub fn compare(&self, other: &Self) -> Option<Ordering> {
		match (self, other) {
			(Self::Bool(lhs), Self::Bool(rhs)) => Some(lhs.cmp(rhs)),
			(Self::Int(lhs), Self::Int(rhs)) => Some(lhs.cmp(rhs)),
			(Self::Date(lhs), Self::Date(rhs)) => Some(lhs.cmp(rhs)),
			(Self::DateTime(lhs), Self::DateTime(rhs)) => Some(lhs.cmp(rhs)),
			(Self::Text(lhs), Self::Text(rhs)) => Some(lhs.cmp(rhs)),
			_ => None,
		}
	}
}

impl From<bool> for FilterValue {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}

impl From<i64> for FilterValue {
	fn from(value: i64) -> Self {
		Self::Int(value)
	}
}

impl From<i32> for FilterValue {
	fn from(value: i32) -> Self {
		Self::Int(value.into())
	}
}

impl From<Date> for FilterValue {
	fn from(value: Date) -> Self {
		Self::Date(value)
	}
}

impl From<OffsetDateTime> for FilterValue {
	fn from(value: OffsetDateTime) -> Self {
		Self::DateTime(value)
	}
}

impl From<String> for FilterValue {
	fn from(value: String) -> Self {
		Self::Text(value)
	}
}

impl From<&str> for FilterValue {
	fn from(value: &str) -> Self {
		Self::Text(value.to_string())
	}
}

impl<T> From<Vec<T>> for FilterValue
where
	T: Into<FilterValue>,
{
	fn from(values: Vec<T>) -> Self {
		Self::List(values.into_iter().map(Into::into).collect())
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeOp {
	Gte,
	Lte,
	Gt,
	Lt,
	Between,
}
impl RangeOp {
	pub const ALL: [Self; 5] = [Self::Gte, Self::Lte, Self::Gt, Self::Lt, Self::Between];

	pub fn suffix(self) -> &'static str {
		match self {
			Self::Gte => "__gte",
			Self::Lte => "__lte",
			Self::Gt => "__gt",
			Self::Lt => "__lt",
			Self::Between => "__between",
		}
	}

	/// Splits a filter key into its base field name and range operator, if any.
	pub fn split(key: &str) -> (&str, Option<Self>) {
		for op in Self::ALL {
			if let Some(base) = key.strip_suffix(op.suffix()) {
				return (base, Some(op));
			}
		}

		(key, None)
	}
}

/// Ordered mapping from filter key to optional value.
///
/// Setting a key that is already present replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
	entries: Vec<(String, Option<FilterValue>)>,
}
impl FilterSpec {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with(mut self, key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
		self.set(key, value);

		self
	}

	pub fn set(&mut self, key: impl Into<String>, value: impl Into<FilterValue>) -> &mut Self {
		self.set_opt(key, Some(value.into()))
	}

	pub fn set_opt(&mut self, key: impl Into<String>, value: Option<FilterValue>) -> &mut Self {
		let key = key.into();

		match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
			Some((_, slot)) => *slot = value,
			None => self.entries.push((key, value)),
		}

		self
	}

	pub fn get(&self, key: &str) -> Option<&FilterValue> {
		self.entries
			.iter()
			.find(|(existing, _)| existing == key)
			.and_then(|(_, value)| value.as_ref())
	}

	pub fn contains_key(&self, key: &str) -> bool {
		self.entries.iter().any(|(existing, _)| existing == key)
	}

	/// Returns a copy of this spec without the given keys.
	pub fn without(&self, keys: &[&str]) -> Self {
		Self {
			entries: self
				.entries
				.iter()
				.filter(|(key, _)| !keys.contains(&key.as_str()))
				.cloned()
				.collect(),
		}
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&FilterValue>)> {
		self.entries.iter().map(|(key, value)| (key.as_str(), value.as_ref()))
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

/// Registry of the filterable fields of one entity.
#[derive(Debug)]
pub struct FieldTable<F>
where
	F: 'static,
{
	entity: &'static str,
	fields: &'static [(&'static str, F)],
}
impl<F> FieldTable<F>
where
	F: Copy,
{
	pub const fn new(entity: &'static str, fields: &'static [(&'static str, F)]) -> Self {
		Self { entity, fields }
	}

	pub fn entity(&self) -> &'static str {
		self.entity
	}

	pub fn resolve(&self, name: &str) -> Option<F> {
		self.fields.iter().find(|(field_name, _)| *field_name == name).map(|(_, field)| *field)
	}
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate<F> {
	And(Vec<Predicate<F>>),
	Eq { field: F, value: FilterValue },
	In { field: F, values: Vec<FilterValue> },
	Gt { field: F, value: FilterValue },
	Gte { field: F, value: FilterValue },
	Lt { field: F, value: FilterValue },
	Lte { field: F, value: FilterValue },
	Between { field: F, low: FilterValue, high: FilterValue },
}
impl<F> Predicate<F> {
	pub fn is_unconstrained(&self) -> bool {
		match self {
			Self::And(clauses) => clauses.iter().all(Self::is_unconstrained),
			_ => false,
		}
	}

	/// Top-level clauses of this predicate; a leaf is its own single clause.
	pub fn clauses(&self) -> &[Self] {
		match self {
			Self::And(clauses) => clauses,
			_ => std::slice::from_ref(self),
		}
	}
}
impl<F> Predicate<F>
where
	F: Copy,
{
	/// Evaluates the predicate against an in-memory record.
	///
	/// Missing values never match, and values of different kinds never compare.
	pub fn matches<R>(&self, record: &R) -> bool
	where
		R: FilterRecord<F> + ?Sized,
	{
		match self {
			Self::And(clauses) => clauses.iter().all(|clause| clause.matches(record)),
			Self::Eq { field, value } =>
				compare_field(record, *field, value) == Some(Ordering::Equal),
			Self::In { field, values } => values
				.iter()
				.any(|value| compare_field(record, *field, value) == Some(Ordering::Equal)),
			Self::Gt { field, value } =>
				compare_field(record, *field, value) == Some(Ordering::Greater),
			Self::Gte { field, value } => matches!(
				compare_field(record, *field, value),
				Some(Ordering::Greater | Ordering::Equal)
			),
			Self::Lt { field, value } =>
				compare_field(record, *field, value) == Some(Ordering::Less),
			Self::Lte { field, value } => matches!(
				compare_field(record, *field, value),
				Some(Ordering::Less | Ordering::Equal)
			),
			Self::Between { field, low, high } =>
				matches!(
					compare_field(record, *field, low),
					Some(Ordering::Greater | Ordering::Equal)
				) && matches!(
					compare_field(record, *field, high),
					Some(Ordering::Less | Ordering::Equal)
				),
		}
	}
}

/// Read access to the filterable values of one entity row.
pub trait FilterRecord<F> {
	fn field_value(&self, field: F) -> Option<FilterValue>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
	UnknownField,
	BetweenArity,
	ListComparison,
}
impl SkipReason {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::UnknownField => "unknown_field",
			Self::BetweenArity => "between_requires_two_values",
			Self::ListComparison => "comparison_requires_scalar",
		}
	}
}

impl Display for SkipReason {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Compiles every usable key of `filters` into a conjunction of clauses.
///
/// `None` values are skipped silently; unusable keys are skipped with a debug log.
pub fn compile<F>(filters: &FilterSpec, table: &FieldTable<F>) -> Predicate<F>
where
	F: Copy + Debug,
{
	let mut clauses = Vec::new();

	for (key, value) in filters.iter() {
		let Some(value) = value else {
			continue;
		};

		match compile_clause(key, value, table) {
			Ok(clause) => clauses.push(clause),
			Err(reason) => {
				tracing::debug!(entity = table.entity(), key, %reason, "Ignoring filter key.");
			},
		}
	}

	Predicate::And(clauses)
}

pub fn compile_clause<F>(
	key: &str,
	value: &FilterValue,
	table: &FieldTable<F>,
) -> Result<Predicate<F>, SkipReason>
where
	F: Copy,
{
	let (base, op) = RangeOp::split(key);
	let field = table.resolve(base).ok_or(SkipReason::UnknownField)?;
	let Some(op) = op else {
		return Ok(match value {
			FilterValue::List(values) => Predicate::In { field, values: values.clone() },
			scalar => Predicate::Eq { field, value: scalar.clone() },
		});
	};

	let scalar = || {
		if value.is_list() { Err(SkipReason::ListComparison) } else { Ok(value.clone()) }
	};

	match op {
		RangeOp::Between => match value {
			FilterValue::List(bounds) if bounds.len() == 2 =>
				Ok(Predicate::Between { field, low: bounds[0].clone(), high: bounds[1].clone() }),
			_ => Err(SkipReason::BetweenArity),
		},
		RangeOp::Gte => Ok(Predicate::Gte { field, value: scalar()? }),
		RangeOp::Lte => Ok(Predicate::Lte { field, value: scalar()? }),
		RangeOp::Gt => Ok(Predicate::Gt { field, value: scalar()? }),
		RangeOp::Lt => Ok(Predicate::Lt { field, value: scalar()? }),
	}
}

fn compare_field<F, R>(record: &R, field: F, value: &FilterValue) -> Option<Ordering>
where
	R: FilterRecord<F> + ?Sized,
{
	record.field_value(field)?.compare(value)
}

#[cfg(test)]
mod tests {
	use time::macros::date;

	use crate::filter::{
		FieldTable, FilterRecord, FilterSpec, FilterValue, Predicate, RangeOp, SkipReason,
		compile, compile_clause,
	};

	#[derive(Debug, Clone, Copy, PartialEq, Eq)]
	enum Field {
		Mileage,
		Made,
		Active,
	}

	const FIELDS: FieldTable<Field> = FieldTable::new(
		"car",
		&[("mileage", Field::Mileage), ("made", Field::Made), ("active", Field::Active)],
	);

	struct Car {
		mileage: i64,
		made: time::Date,
		active: bool,
	}
	impl FilterRecord<Field> for Car {
		fn field_value(&self, field: Field) -> Option<FilterValue> {
			Some(match field {
				Field::Mileage => FilterValue::Int(self.mileage),
				Field::Made => FilterValue::Date(self.made),
				Field::Active => FilterValue::Bool(self.active),
			})
		}
	}

	#[test]
	fn split_recognizes_every_suffix() {
		assert_eq!(RangeOp::split("mileage__gte"), ("mileage", Some(RangeOp::Gte)));
		assert_eq!(RangeOp::split("mileage__lte"), ("mileage", Some(RangeOp::Lte)));
		assert_eq!(RangeOp::split("mileage__gt"), ("mileage", Some(RangeOp::Gt)));
		assert_eq!(RangeOp::split("mileage__lt"), ("mileage", Some(RangeOp::Lt)));
		assert_eq!(RangeOp::split("mileage__between"), ("mileage", Some(RangeOp::Between)));
		assert_eq!(RangeOp::split("mileage"), ("mileage", None));
		assert_eq!(RangeOp::split("mileage__eq"), ("mileage__eq", None));
	}

	#[test]
	fn set_replaces_in_place() {
		let mut spec = FilterSpec::new().with("a", 1_i64).with("b", 2_i64);

		spec.set("a", 3_i64);

		assert_eq!(spec.iter().map(|(key, _)| key).collect::<Vec<_>>(), vec!["a", "b"]);
		assert_eq!(spec.get("a"), Some(&FilterValue::Int(3)));
	}

	#[test]
	fn none_values_are_never_compiled() {
		let mut spec = FilterSpec::new();

		spec.set_opt("mileage", None);

		assert!(compile(&spec, &FIELDS).is_unconstrained());
	}

	#[test]
	fn bare_list_compiles_to_membership() {
		let spec = FilterSpec::new().with("mileage", vec![1_i64, 2]);

		assert_eq!(
			compile(&spec, &FIELDS).clauses(),
			&[Predicate::In {
				field: Field::Mileage,
				values: vec![FilterValue::Int(1), FilterValue::Int(2)],
			}]
		);
	}

	#[test]
	fn unknown_suffixed_field_is_skipped() {
		let skipped = compile_clause("colour__gte", &FilterValue::Int(1), &FIELDS);

		assert_eq!(skipped, Err(SkipReason::UnknownField));
	}

	#[test]
	fn comparison_with_list_is_skipped() {
		let skipped = compile_clause("mileage__gt", &FilterValue::from(vec![1_i64]), &FIELDS);

		assert_eq!(skipped, Err(SkipReason::ListComparison));
	}

	#[test]
	fn between_on_dates_is_inclusive() {
		let spec = FilterSpec::new()
			.with("made__between", vec![date!(2020 - 01 - 01), date!(2020 - 12 - 31)]);
		let predicate = compile(&spec, &FIELDS);
		let car = |made| Car { mileage: 0, made, active: true };

		assert!(predicate.matches(&car(date!(2020 - 01 - 01))));
		assert!(predicate.matches(&car(date!(2020 - 12 - 31))));
		assert!(!predicate.matches(&car(date!(2021 - 01 - 01))));
	}

	#[test]
	fn mixed_kinds_never_match() {
		let predicate = compile(&FilterSpec::new().with("active", 1_i64), &FIELDS);

		assert!(!predicate.matches(&Car { mileage: 1, made: date!(2020 - 01 - 01), active: true }));
	}

	#[test]
	fn empty_membership_matches_nothing() {
		let predicate = compile(&FilterSpec::new().with("mileage", Vec::<i64>::new()), &FIELDS);

		assert!(!predicate.matches(&Car { mileage: 1, made: date!(2020 - 01 - 01), active: true }));
	}
}
