use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	#[serde(default)]
	pub listing: Listing,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	#[serde(default = "default_log_level")]
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Listing {
	#[serde(default = "default_page_size")]
	pub default_page_size: u32,
	#[serde(default = "default_max_page_size")]
	pub max_page_size: u32,
	/// Deadline for the whole facet fan-out of a single request.
	#[serde(default = "default_facet_timeout_ms")]
	pub facet_timeout_ms: u64,
	/// Number of active vehicles previewed per auction in the auction list.
	#[serde(default = "default_preview_vehicles")]
	pub preview_vehicles: u32,
}
impl Default for Listing {
	fn default() -> Self {
		Self {
			default_page_size: default_page_size(),
			max_page_size: default_max_page_size(),
			facet_timeout_ms: default_facet_timeout_ms(),
			preview_vehicles: default_preview_vehicles(),
		}
	}
}

pub(crate) fn default_log_level() -> String {
	"info".to_string()
}

fn default_page_size() -> u32 {
	10
}

fn default_max_page_size() -> u32 {
	100
}

fn default_facet_timeout_ms() -> u64 {
	5_000
}

fn default_preview_vehicles() -> u32 {
	5
}
