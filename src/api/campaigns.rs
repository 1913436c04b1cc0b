//! Automated campaign endpoints.

use axum::{extract::State, Json};
use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::Deserialize;

use crate::error::Result;
use crate::retention::CampaignReport;
use crate::server::AppState;
use crate::template::Channel;

#[derive(Debug, Deserialize)]
pub struct ReminderCampaignRequest {
    pub appointments: Vec<serde_json::Value>,
    /// Clinic-local reference time; defaults to now
    pub now: Option<NaiveDateTime>,
    /// Overrides the configured reminder channel
    pub channel: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WinBackCampaignRequest {
    pub patients: Vec<serde_json::Value>,
    /// Clinic-local reference date; defaults to today
    pub today: Option<NaiveDate>,
    /// Overrides the configured win-back channel
    pub channel: Option<String>,
}

fn parse_channel(channel: Option<&str>) -> Result<Option<Channel>> {
    Ok(channel.map(str::parse::<Channel>).transpose()?)
}

/// POST /api/v1/campaigns/reminders
#[tracing::instrument(
    name = "http.run_reminders",
    skip(state, request),
    fields(appointments = request.appointments.len())
)]
pub async fn run_reminders(
    State(state): State<AppState>,
    Json(request): Json<ReminderCampaignRequest>,
) -> Result<Json<CampaignReport>> {
    let now = request.now.unwrap_or_else(|| Local::now().naive_local());
    let channel = parse_channel(request.channel.as_deref())?;
    let report = state
        .controller
        .send_reminders(&request.appointments, now, channel)
        .await?;
    Ok(Json(report))
}

/// POST /api/v1/campaigns/win-back
#[tracing::instrument(
    name = "http.run_win_back",
    skip(state, request),
    fields(patients = request.patients.len())
)]
pub async fn run_win_back(
    State(state): State<AppState>,
    Json(request): Json<WinBackCampaignRequest>,
) -> Result<Json<CampaignReport>> {
    let today = request.today.unwrap_or_else(|| Local::now().date_naive());
    let channel = parse_channel(request.channel.as_deref())?;
    let report = state
        .controller
        .send_win_back(&request.patients, today, channel)
        .await?;
    Ok(Json(report))
}
