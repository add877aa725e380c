use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::AppState;
use crate::booking;
use crate::error::Error;
use crate::models::*;
use crate::scheduling::{generate_slots, parse_date, Interval};

const DEFAULT_PAGE_SIZE: u32 = 20;
const MAX_PAGE_SIZE: u32 = 100;

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Appointments
// ============================================================

pub async fn create_appointment(
    State(state): State<AppState>,
    Json(input): Json<CreateAppointmentInput>,
) -> Result<(StatusCode, Json<AppointmentEnvelope>), Error> {
    let appointment = booking::create(&state.db, state.notifier.as_ref(), input)?;
    Ok((
        StatusCode::CREATED,
        Json(AppointmentEnvelope {
            success: true,
            message: "Appointment booked".to_string(),
            appointment,
        }),
    ))
}

pub async fn update_appointment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateAppointmentInput>,
) -> Result<Json<AppointmentEnvelope>, Error> {
    let appointment = booking::update(&state.db, state.notifier.as_ref(), id, input)?;
    Ok(Json(AppointmentEnvelope {
        success: true,
        message: "Appointment updated".to_string(),
        appointment,
    }))
}

pub async fn delete_appointment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageEnvelope>, Error> {
    booking::delete(&state.db, state.notifier.as_ref(), id)?;
    Ok(Json(MessageEnvelope {
        success: true,
        message: "Appointment deleted".to_string(),
    }))
}

pub async fn get_appointment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AppointmentEnvelope>, Error> {
    let appointment = state
        .db
        .get_appointment(id)?
        .ok_or(Error::NotFound("appointment"))?;
    Ok(Json(AppointmentEnvelope {
        success: true,
        message: "OK".to_string(),
        appointment,
    }))
}

/// Admin-scope listing: every appointment, oldest first.
pub async fn list_appointments(
    State(state): State<AppState>,
) -> Result<Json<AppointmentListEnvelope>, Error> {
    let appointments = state.db.get_all_appointments()?;
    Ok(Json(AppointmentListEnvelope {
        success: true,
        appointments,
        pagination: None,
    }))
}

/// Query parameters for the own-scope listing. Auth is out of scope, so
/// the scope is an explicit staff id rather than a session principal.
#[derive(Debug, Deserialize)]
pub struct MyAppointmentsQuery {
    #[serde(rename = "staffId")]
    pub staff_id: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    /// Free-text search over name, details, reason, assignee and time.
    pub q: Option<String>,
}

pub async fn my_appointments(
    State(state): State<AppState>,
    Query(query): Query<MyAppointmentsQuery>,
) -> Result<Json<AppointmentListEnvelope>, Error> {
    let staff_id = query
        .staff_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::Validation("staffId is required".to_string()))?;

    let page = query.page.unwrap_or(1).max(1);
    let limit = query
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);

    let (appointments, total) =
        state
            .db
            .search_appointments(staff_id, query.q.as_deref(), page, limit)?;

    let total_pages = total.div_ceil(u64::from(limit));
    Ok(Json(AppointmentListEnvelope {
        success: true,
        appointments,
        pagination: Some(Pagination {
            page,
            limit,
            total,
            total_pages,
        }),
    }))
}

// ============================================================
// Available slots
// ============================================================

#[derive(Debug, Deserialize)]
pub struct AvailableSlotsQuery {
    #[serde(rename = "employeId")]
    pub employe_id: String,
    pub date: String,
}

pub async fn available_slots(
    State(state): State<AppState>,
    Query(query): Query<AvailableSlotsQuery>,
) -> Result<Json<AvailableSlotsEnvelope>, Error> {
    let day = parse_date(&query.date)?;
    let existing = state
        .db
        .appointments_for_staff_day(&query.employe_id, &day.to_string())?;

    // Rows the interval parser cannot read are shown in the day listing
    // but cannot mask slots.
    let booked: Vec<Interval> = existing
        .iter()
        .filter_map(|a| {
            Interval::from_parts(&a.date, &a.time, a.duration_hours)
                .map_err(|e| {
                    tracing::warn!(appointment = %a.id, "unreadable appointment in slot scan: {}", e);
                })
                .ok()
        })
        .collect();

    let available_slots = generate_slots(&state.window, day, &booked);
    let appointments = existing.iter().map(DayAppointment::from).collect();

    Ok(Json(AvailableSlotsEnvelope {
        success: true,
        available_slots,
        appointments,
    }))
}
