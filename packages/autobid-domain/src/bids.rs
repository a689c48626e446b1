use std::{cmp::Reverse, collections::HashMap};

use time::OffsetDateTime;

/// Orders items by the time of their latest bid, newest first.
///
/// Items without bid data follow in their original relative order.
pub fn order_by_latest_bid<T, K>(
	mut items: Vec<T>,
	vehicle_id: K,
	latest_bid_at: &HashMap<i64, OffsetDateTime>,
) -> Vec<T>
where
	K: Fn(&T) -> i64,
{
	items.sort_by_key(|item| {
		let bid_at = latest_bid_at.get(&vehicle_id(item)).copied();

		(bid_at.is_none(), bid_at.map(Reverse))
	});

	items
}
