use std::time::Instant;

use axum::{
	Json, Router,
	body::Body,
	extract::{
		Path, Query, State,
		rejection::{JsonRejection, PathRejection, QueryRejection},
	},
	http::{Request, StatusCode},
	middleware::{self, Next},
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::Serialize;

use autobid_domain::VehicleQuery;
use autobid_service::{
	AuctionListQuery, AuctionListResponse, AuctionResponse, Error as ServiceError,
	VehicleListResponse,
};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/auctions", get(list_auctions))
		.route("/v1/auctions/{auction_id}", get(get_auction))
		.route("/v1/auctions/{auction_id}/vehicles", post(list_auction_vehicles))
		.layer(middleware::from_fn(log_request))
		.with_state(state)
}

async fn log_request(req: Request<Body>, next: Next) -> Response {
	let method = req.method().clone();
	let path = req.uri().path().to_owned();
	let started = Instant::now();
	let response = next.run(req).await;

	tracing::info!(
		%method,
		path = %path,
		status = response.status().as_u16(),
		elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
		"Handled request."
	);

	response
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn list_auctions(
	State(state): State<AppState>,
	query: Result<Query<AuctionListQuery>, QueryRejection>,
) -> Result<Json<AuctionListResponse>, ApiError> {
	let Query(query) = query?;
	let response = state.service.list_auctions(query).await?;

	Ok(Json(response))
}

async fn get_auction(
	State(state): State<AppState>,
	auction_id: Result<Path<i64>, PathRejection>,
) -> Result<Json<AuctionResponse>, ApiError> {
	let Path(auction_id) = auction_id?;
	let response = state.service.get_auction(auction_id).await?;

	Ok(Json(response))
}

async fn list_auction_vehicles(
	State(state): State<AppState>,
	auction_id: Result<Path<i64>, PathRejection>,
	query: Result<Json<VehicleQuery>, JsonRejection>,
) -> Result<Json<VehicleListResponse>, ApiError> {
	let Path(auction_id) = auction_id?;
	let Json(query) = query?;
	let response = state.service.list_auction_vehicles(auction_id, query).await?;

	Ok(Json(response))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: &'static str,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: &'static str,
	message: String,
}
impl ApiError {
	fn new(status: StatusCode, error_code: &'static str, message: impl Into<String>) -> Self {
		Self { status, error_code, message: message.into() }
	}

	fn invalid(message: impl Into<String>) -> Self {
		Self::new(StatusCode::BAD_REQUEST, "invalid_request", message)
	}
}

impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		match err {
			ServiceError::InvalidRequest { message } => Self::invalid(message),
			ServiceError::NotFound { message } =>
				Self::new(StatusCode::NOT_FOUND, "not_found", message),
			ServiceError::Timeout { .. } =>
				Self::new(StatusCode::GATEWAY_TIMEOUT, "timeout", err.to_string()),
			ServiceError::Storage { message } => {
				tracing::error!(error = %message, "Listing request failed in storage.");

				Self::new(
					StatusCode::INTERNAL_SERVER_ERROR,
					"storage_error",
					"Listing storage is unavailable.",
				)
			},
		}
	}
}

impl From<QueryRejection> for ApiError {
	fn from(rejection: QueryRejection) -> Self {
		Self::invalid(rejection.body_text())
	}
}

impl From<PathRejection> for ApiError {
	fn from(rejection: PathRejection) -> Self {
		Self::invalid(rejection.body_text())
	}
}

impl From<JsonRejection> for ApiError {
	fn from(rejection: JsonRejection) -> Self {
		Self::invalid(rejection.body_text())
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}
