//! REST surface of the booking backend.
//!
//! Endpoints:
//! - `GET  /`           — health payload
//! - `GET  /api/slots`  — available slots, optional `date` filter
//! - `POST /api/book`   — atomic reservation + booking confirmation
//!
//! Domain conflicts (slot taken or unknown) come back as `400` with a
//! `detail` string; malformed bodies are rejected by the extractors before
//! any handler runs.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use carbot_core::{Booking, CustomerDetails, Slot, SlotStore, SlotTime, TicketGenerator};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SlotStore>,
    pub tickets: Arc<TicketGenerator>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_health))
        .route("/api/slots", get(get_available_slots))
        .route("/api/book", post(book_car_service))
        .with_state(state)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Default, Deserialize)]
pub struct SlotsQuery {
    pub date: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SlotsResponse {
    pub success: bool,
    pub total_slots: usize,
    pub slots: Vec<Slot>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct BookingRequest {
    pub customer_name: String,
    pub phone: String,
    pub car_model: String,
    pub service_type: String,
    pub date: NaiveDate,
    pub time: SlotTime,
}

#[derive(Clone, Debug, Serialize)]
pub struct BookingResponse {
    pub success: bool,
    pub ticket_id: String,
    pub customer_name: String,
    pub phone: String,
    pub car_model: String,
    pub service_type: String,
    pub date: NaiveDate,
    pub time: SlotTime,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ApiError {
    pub detail: String,
}

pub async fn root_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "running",
        service: "Car Service Booking API",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn get_available_slots(
    State(state): State<AppState>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<SlotsResponse>, (StatusCode, Json<ApiError>)> {
    let date_filter = match query.date.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
        None => None,
        Some(raw) => Some(NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
            (
                StatusCode::BAD_REQUEST,
                Json(ApiError {
                    detail: format!("invalid date filter `{raw}` (expected YYYY-MM-DD)"),
                }),
            )
        })?),
    };

    let reference = Local::now().naive_local();
    let slots = state.store.list_available(reference, date_filter);

    info!(
        event_name = "slots.listed",
        total = slots.len(),
        date_filter = ?date_filter,
        "availability query served"
    );

    Ok(Json(SlotsResponse { success: true, total_slots: slots.len(), slots }))
}

pub async fn book_car_service(
    State(state): State<AppState>,
    Json(request): Json<BookingRequest>,
) -> Result<(StatusCode, Json<BookingResponse>), (StatusCode, Json<ApiError>)> {
    let slot = state.store.reserve(request.date, request.time).map_err(|err| {
        warn!(
            event_name = "booking.slot_unavailable",
            date = %request.date,
            time = %request.time,
            "booking rejected"
        );
        (StatusCode::BAD_REQUEST, Json(ApiError { detail: err.to_string() }))
    })?;

    let ticket = state.tickets.next();
    let booking = Booking::confirm(
        ticket,
        CustomerDetails {
            customer_name: request.customer_name,
            phone: request.phone,
            car_model: request.car_model,
            service_type: request.service_type,
        },
        slot.date,
        slot.time,
    );

    info!(
        event_name = "booking.confirmed",
        ticket_id = %booking.ticket_id,
        date = %booking.date,
        time = %booking.time,
        "booking confirmed"
    );

    let message = format!("Booking confirmed! Ticket: {}", booking.ticket_id);
    Ok((
        StatusCode::CREATED,
        Json(BookingResponse {
            success: true,
            ticket_id: booking.ticket_id.to_string(),
            customer_name: booking.customer_name,
            phone: booking.phone,
            car_model: booking.car_model,
            service_type: booking.service_type,
            date: booking.date,
            time: booking.time,
            message,
        }),
    ))
}
