//! Rendering of compiled filter predicates into parameterized SQL.
//!
//! Every value is bound, never interpolated. Column names come from the field tags, so no caller
//! input reaches the statement text.

use sqlx::{Postgres, QueryBuilder};

use autobid_domain::{AuctionField, FilterValue, Predicate, VehicleField};

/// A field tag that maps to a column.
pub trait Column: Copy {
	fn column(self) -> &'static str;
}

impl Column for VehicleField {
	fn column(self) -> &'static str {
		self.as_str()
	}
}

impl Column for AuctionField {
	fn column(self) -> &'static str {
		self.as_str()
	}
}

/// Appends `predicate` as a boolean SQL expression.
///
/// `alias` qualifies every column (`"v"` renders `v.mileage`). An empty conjunction renders `TRUE`
/// and an empty membership renders `FALSE`. A clause whose operand is itself a list can never
/// match, so it renders `FALSE` as well.
pub fn push_predicate<F>(
	builder: &mut QueryBuilder<'_, Postgres>,
	predicate: &Predicate<F>,
	alias: &str,
) where
	F: Column,
{
	match predicate {
		Predicate::And(clauses) => {
			if clauses.is_empty() {
				builder.push("TRUE");

				return;
			}

			builder.push("(");

			for (index, clause) in clauses.iter().enumerate() {
				if index > 0 {
					builder.push(" AND ");
				}

				push_predicate(builder, clause, alias);
			}

			builder.push(")");
		},
		Predicate::Eq { field, value } => push_comparison(builder, alias, *field, "=", value),
		Predicate::Gt { field, value } => push_comparison(builder, alias, *field, ">", value),
		Predicate::Gte { field, value } => push_comparison(builder, alias, *field, ">=", value),
		Predicate::Lt { field, value } => push_comparison(builder, alias, *field, "<", value),
		Predicate::Lte { field, value } => push_comparison(builder, alias, *field, "<=", value),
		Predicate::In { field, values } => {
			if values.is_empty() || values.iter().any(FilterValue::is_list) {
				builder.push("FALSE");

				return;
			}

			push_column(builder, alias, *field);
			push_membership(builder, values);
		},
		Predicate::Between { field, low, high } => {
			if low.is_list() || high.is_list() {
				builder.push("FALSE");

				return;
			}

			push_column(builder, alias, *field);
			builder.push(" BETWEEN ");
			push_value(builder, low);
			builder.push(" AND ");
			push_value(builder, high);
		},
	}
}

fn push_comparison<F>(
	builder: &mut QueryBuilder<'_, Postgres>,
	alias: &str,
	field: F,
	op: &str,
	value: &FilterValue,
) where
	F: Column,
{
	if value.is_list() {
		builder.push("FALSE");

		return;
	}

	push_column(builder, alias, field);
	builder.push(" ");
	builder.push(op);
	builder.push(" ");
	push_value(builder, value);
}

/// Integer and text lists bind as one array parameter (`= ANY($n)`), so the statement does not
/// grow with the list. Other lists fall back to `IN` with one parameter per value.
fn push_membership(builder: &mut QueryBuilder<'_, Postgres>, values: &[FilterValue]) {
	let ints = values
		.iter()
		.map(|value| match value {
			FilterValue::Int(value) => Some(*value),
			_ => None,
		})
		.collect::<Option<Vec<i64>>>();

	if let Some(ints) = ints {
		builder.push(" = ANY(");
		builder.push_bind(ints);
		builder.push(")");

		return;
	}

	let texts = values
		.iter()
		.map(|value| match value {
			FilterValue::Text(value) => Some(value.clone()),
			_ => None,
		})
		.collect::<Option<Vec<String>>>();

	if let Some(texts) = texts {
		builder.push(" = ANY(");
		builder.push_bind(texts);
		builder.push(")");

		return;
	}

	builder.push(" IN (");

	for (index, value) in values.iter().enumerate() {
		if index > 0 {
			builder.push(", ");
		}

		push_value(builder, value);
	}

	builder.push(")");
}

fn push_column<F>(builder: &mut QueryBuilder<'_, Postgres>, alias: &str, field: F)
where
	F: Column,
{
	if !alias.is_empty() {
		builder.push(alias);
		builder.push(".");
	}

	builder.push(field.column());
}

fn push_value(builder: &mut QueryBuilder<'_, Postgres>, value: &FilterValue) {
	match value {
		FilterValue::Bool(value) => builder.push_bind(*value),
		FilterValue::Int(value) => builder.push_bind(*value),
		FilterValue::Date(value) => builder.push_bind(*value),
		FilterValue::DateTime(value) => builder.push_bind(*value),
		FilterValue::Text(value) => builder.push_bind(value.clone()),
		// Callers reject lists before reaching here.
		FilterValue::List(_) => builder.push("NULL"),
	};
}

#[cfg(test)]
mod tests {
	use sqlx::{Postgres, QueryBuilder};
	use time::macros::date;

	use autobid_domain::{FilterSpec, VEHICLE_FIELDS, filter};

	use crate::sql::push_predicate;

	fn render(filters: &FilterSpec) -> String {
		let predicate = filter::compile(filters, &VEHICLE_FIELDS);
		let mut builder = QueryBuilder::<Postgres>::new("SELECT 1 FROM auction_vehicles v WHERE ");

		push_predicate(&mut builder, &predicate, "v");

		builder.sql().to_string()
	}

	#[test]
	fn empty_spec_renders_true() {
		assert_eq!(render(&FilterSpec::new()), "SELECT 1 FROM auction_vehicles v WHERE TRUE");
	}

	#[test]
	fn clauses_render_in_key_order_with_binds() {
		let filters = FilterSpec::new()
			.with("auction_id", 7_i64)
			.with("mileage__gte", 50_000_i64)
			.with("manufacturing_date__lte", date!(2021 - 12 - 31))
			.with("model_id", vec![1_i64, 2, 3]);

		assert_eq!(
			render(&filters),
			"SELECT 1 FROM auction_vehicles v WHERE (v.auction_id = $1 AND v.mileage >= $2 AND \
			 v.manufacturing_date <= $3 AND v.model_id = ANY($4))"
		);
	}

	#[test]
	fn between_renders_inclusive_range() {
		let filters = FilterSpec::new().with("mileage__between", vec![1_i64, 9]);

		assert_eq!(
			render(&filters),
			"SELECT 1 FROM auction_vehicles v WHERE (v.mileage BETWEEN $1 AND $2)"
		);
	}

	#[test]
	fn wide_membership_binds_one_array() {
		let ids = (1..=70_000_i64).collect::<Vec<_>>();
		let filters = FilterSpec::new().with("manufacturer_id", ids);

		assert_eq!(
			render(&filters),
			"SELECT 1 FROM auction_vehicles v WHERE (v.manufacturer_id = ANY($1))"
		);
	}

	#[test]
	fn date_membership_binds_each_value() {
		let filters = FilterSpec::new()
			.with("manufacturing_date", vec![date!(2020 - 01 - 01), date!(2021 - 01 - 01)]);

		assert_eq!(
			render(&filters),
			"SELECT 1 FROM auction_vehicles v WHERE (v.manufacturing_date IN ($1, $2))"
		);
	}

	#[test]
	fn empty_membership_renders_false() {
		let filters = FilterSpec::new().with("model_id", Vec::<i64>::new());

		assert_eq!(render(&filters), "SELECT 1 FROM auction_vehicles v WHERE (FALSE)");
	}

	#[test]
	fn unknown_keys_never_reach_sql() {
		let filters = FilterSpec::new().with("colour", "red").with("horsepower__gt", 100_i64);

		assert_eq!(render(&filters), "SELECT 1 FROM auction_vehicles v WHERE TRUE");
	}
}
