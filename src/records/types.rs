//! Typed records for the entities a retention message can target

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejection produced while normalizing an incoming record
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("{entity} record must be a JSON object")]
    NotAnObject { entity: &'static str },

    #[error("{entity} record is missing {field}")]
    MissingField {
        entity: &'static str,
        field: &'static str,
    },

    #[error("{entity} record has invalid {field}: {reason}")]
    InvalidField {
        entity: &'static str,
        field: &'static str,
        reason: String,
    },
}

impl RecordError {
    pub fn entity(&self) -> &'static str {
        match self {
            RecordError::NotAnObject { entity }
            | RecordError::MissingField { entity, .. }
            | RecordError::InvalidField { entity, .. } => entity,
        }
    }
}

pub type RecordResult<T> = Result<T, RecordError>;

/// How a patient can be reached
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    #[default]
    Scheduled,
    Confirmed,
    Completed,
    Cancelled,
    NoShow,
}

impl AppointmentStatus {
    /// Whether the appointment is still expected to happen
    pub fn is_pending(&self) -> bool {
        matches!(self, AppointmentStatus::Scheduled | AppointmentStatus::Confirmed)
    }
}

/// A scheduled appointment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub patient_name: String,
    pub contact: Contact,
    /// Clinic-local start time
    pub starts_at: NaiveDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub procedure: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub professional: Option<String>,
    pub status: AppointmentStatus,
}

/// A patient who has not visited for a while
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DormantPatient {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub contact: Contact,
    pub last_visit: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_procedure: Option<String>,
}

impl DormantPatient {
    /// Whole days between the last visit and `today`
    pub fn days_since_last_visit(&self, today: NaiveDate) -> i64 {
        (today - self.last_visit).num_days()
    }
}

/// A patient waiting for an earlier slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitlistEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub patient_name: String,
    pub contact: Contact,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub procedure: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub professional: Option<String>,
    /// Slot being offered, when one is attached
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offered_slot: Option<NaiveDateTime>,
}

/// The entity a message is being prepared for
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "record", rename_all = "snake_case")]
pub enum Recipient {
    Appointment(Appointment),
    DormantPatient(DormantPatient),
    Waitlist(WaitlistEntry),
}

impl Recipient {
    pub fn display_name(&self) -> &str {
        match self {
            Recipient::Appointment(a) => &a.patient_name,
            Recipient::DormantPatient(p) => &p.name,
            Recipient::Waitlist(w) => &w.patient_name,
        }
    }

    pub fn contact(&self) -> &Contact {
        match self {
            Recipient::Appointment(a) => &a.contact,
            Recipient::DormantPatient(p) => &p.contact,
            Recipient::Waitlist(w) => &w.contact,
        }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            Recipient::Appointment(a) => a.id.as_deref(),
            Recipient::DormantPatient(p) => p.id.as_deref(),
            Recipient::Waitlist(w) => w.id.as_deref(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Recipient::Appointment(_) => "appointment",
            Recipient::DormantPatient(_) => "dormant_patient",
            Recipient::Waitlist(_) => "waitlist",
        }
    }
}
