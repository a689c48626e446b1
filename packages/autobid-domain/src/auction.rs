use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::filter::FilterSpec;

pub const COUNTRY: &str = "country";
pub const END_DATETIME_GT: &str = "end_datetime__gt";
pub const END_DATETIME_LTE: &str = "end_datetime__lte";

/// Auction status derived from its close time; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuctionStatus {
	Active,
	Closed,
}
impl AuctionStatus {
	pub fn at(now: OffsetDateTime, close_time: OffsetDateTime) -> Self {
		if close_time > now { Self::Active } else { Self::Closed }
	}

	pub fn parse(raw: &str) -> Option<Self> {
		match raw {
			"active" => Some(Self::Active),
			"closed" => Some(Self::Closed),
			_ => None,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Active => "active",
			Self::Closed => "closed",
		}
	}

	pub fn rank(self) -> u8 {
		match self {
			Self::Active => 0,
			Self::Closed => 1,
		}
	}

	/// Adds the close-time bound equivalent to this status at `now`.
	pub fn apply(self, filters: &mut FilterSpec, now: OffsetDateTime) {
		match self {
			Self::Active => filters.set(END_DATETIME_GT, now),
			Self::Closed => filters.set(END_DATETIME_LTE, now),
		};
	}
}

/// Active auctions first, then closed ones; each group ascending by close time.
pub fn sort_by_status<T, K>(items: &mut [T], key: K)
where
	K: Fn(&T) -> (AuctionStatus, OffsetDateTime),
{
	items.sort_by_key(|item| {
		let (status, close_time) = key(item);

		(status.rank(), close_time)
	});
}
