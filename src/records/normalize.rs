//! Parse/validate boundary for incoming entity records.
//!
//! Dashboard payloads are loosely shaped: ids may be numbers or strings,
//! optional fields may be missing or null, and field names show up in both
//! camelCase and snake_case. Each `normalize_*` function accepts that shape
//! and returns either a typed record or a [`RecordError`].

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use lazy_static::lazy_static;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::metrics::RecordMetrics;

use super::types::{
    Appointment, AppointmentStatus, Contact, DormantPatient, Recipient, RecordError,
    RecordResult, WaitlistEntry,
};

lazy_static! {
    static ref EMAIL: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

const APPOINTMENT: &str = "appointment";
const DORMANT_PATIENT: &str = "dormant_patient";
const WAITLIST: &str = "waitlist";

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Recipient as it arrives in a request body, before normalization
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", content = "record", rename_all = "snake_case")]
pub enum RecipientPayload {
    Appointment(serde_json::Value),
    DormantPatient(serde_json::Value),
    Waitlist(serde_json::Value),
}

impl RecipientPayload {
    /// Rejected payloads are counted per entity in the records metric
    pub fn normalize(&self) -> RecordResult<Recipient> {
        let result = match self {
            RecipientPayload::Appointment(v) => {
                normalize_appointment(v).map(Recipient::Appointment)
            }
            RecipientPayload::DormantPatient(v) => {
                normalize_dormant_patient(v).map(Recipient::DormantPatient)
            }
            RecipientPayload::Waitlist(v) => normalize_waitlist_entry(v).map(Recipient::Waitlist),
        };

        if let Err(e) = &result {
            RecordMetrics::record_rejected(e.entity());
        }
        result
    }
}

/// String, number or boolean; whatever the dashboard happened to send
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Scalar {
    fn text(&self) -> Option<String> {
        let text = match self {
            Scalar::Text(s) => s.trim().to_string(),
            Scalar::Int(n) => n.to_string(),
            Scalar::Float(n) => n.to_string(),
            Scalar::Bool(b) => b.to_string(),
        };
        (!text.is_empty()).then_some(text)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawAppointment {
    id: Option<Scalar>,
    #[serde(alias = "patient_name", alias = "patient")]
    patient_name: Option<Scalar>,
    phone: Option<Scalar>,
    email: Option<Scalar>,
    #[serde(alias = "starts_at", alias = "start", alias = "dateTime")]
    starts_at: Option<Scalar>,
    date: Option<Scalar>,
    time: Option<Scalar>,
    #[serde(alias = "treatment")]
    procedure: Option<Scalar>,
    #[serde(alias = "dentist")]
    professional: Option<Scalar>,
    status: Option<Scalar>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawDormantPatient {
    id: Option<Scalar>,
    #[serde(alias = "patient_name", alias = "patientName")]
    name: Option<Scalar>,
    phone: Option<Scalar>,
    email: Option<Scalar>,
    #[serde(alias = "last_visit")]
    last_visit: Option<Scalar>,
    #[serde(alias = "last_procedure")]
    last_procedure: Option<Scalar>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawWaitlistEntry {
    id: Option<Scalar>,
    #[serde(alias = "patient_name", alias = "name")]
    patient_name: Option<Scalar>,
    phone: Option<Scalar>,
    email: Option<Scalar>,
    #[serde(alias = "treatment")]
    procedure: Option<Scalar>,
    #[serde(alias = "dentist")]
    professional: Option<Scalar>,
    #[serde(alias = "offered_slot", alias = "slot")]
    offered_slot: Option<Scalar>,
    date: Option<Scalar>,
    time: Option<Scalar>,
}

/// Normalize an appointment record
pub fn normalize_appointment(value: &serde_json::Value) -> RecordResult<Appointment> {
    let raw: RawAppointment = parse_object(APPOINTMENT, value)?;

    let starts_at = match text(&raw.starts_at) {
        Some(s) => parse_datetime(APPOINTMENT, "starts_at", &s)?,
        None => {
            let date = required(APPOINTMENT, "date", &raw.date)?;
            let time = required(APPOINTMENT, "time", &raw.time)?;
            let time = parse_time(APPOINTMENT, "time", &time)?;
            parse_date(APPOINTMENT, "date", &date)?.and_time(time)
        }
    };

    let status = match text(&raw.status) {
        Some(s) => parse_status(&s)?,
        None => AppointmentStatus::default(),
    };

    Ok(Appointment {
        id: text(&raw.id),
        patient_name: required(APPOINTMENT, "patient_name", &raw.patient_name)?,
        contact: contact(APPOINTMENT, &raw.phone, &raw.email)?,
        starts_at,
        procedure: text(&raw.procedure),
        professional: text(&raw.professional),
        status,
    })
}

/// Normalize a dormant-patient record
pub fn normalize_dormant_patient(value: &serde_json::Value) -> RecordResult<DormantPatient> {
    let raw: RawDormantPatient = parse_object(DORMANT_PATIENT, value)?;
    let last_visit = required(DORMANT_PATIENT, "last_visit", &raw.last_visit)?;

    Ok(DormantPatient {
        id: text(&raw.id),
        name: required(DORMANT_PATIENT, "name", &raw.name)?,
        contact: contact(DORMANT_PATIENT, &raw.phone, &raw.email)?,
        last_visit: parse_date(DORMANT_PATIENT, "last_visit", &last_visit)?,
        last_procedure: text(&raw.last_procedure),
    })
}

/// Normalize a waitlist entry
pub fn normalize_waitlist_entry(value: &serde_json::Value) -> RecordResult<WaitlistEntry> {
    let raw: RawWaitlistEntry = parse_object(WAITLIST, value)?;

    let offered_slot = match (text(&raw.offered_slot), text(&raw.date), text(&raw.time)) {
        (Some(slot), _, _) => Some(parse_datetime(WAITLIST, "offered_slot", &slot)?),
        (None, Some(date), Some(time)) => Some(
            parse_date(WAITLIST, "date", &date)?.and_time(parse_time(WAITLIST, "time", &time)?),
        ),
        (None, Some(_), None) => {
            return Err(RecordError::MissingField {
                entity: WAITLIST,
                field: "time",
            })
        }
        (None, None, Some(_)) => {
            return Err(RecordError::MissingField {
                entity: WAITLIST,
                field: "date",
            })
        }
        (None, None, None) => None,
    };

    Ok(WaitlistEntry {
        id: text(&raw.id),
        patient_name: required(WAITLIST, "patient_name", &raw.patient_name)?,
        contact: contact(WAITLIST, &raw.phone, &raw.email)?,
        procedure: text(&raw.procedure),
        professional: text(&raw.professional),
        offered_slot,
    })
}

fn parse_object<T: DeserializeOwned>(
    entity: &'static str,
    value: &serde_json::Value,
) -> RecordResult<T> {
    if !value.is_object() {
        return Err(RecordError::NotAnObject { entity });
    }
    serde_json::from_value(value.clone()).map_err(|e| RecordError::InvalidField {
        entity,
        field: "record",
        reason: e.to_string(),
    })
}

fn text(value: &Option<Scalar>) -> Option<String> {
    value.as_ref().and_then(Scalar::text)
}

fn required(
    entity: &'static str,
    field: &'static str,
    value: &Option<Scalar>,
) -> RecordResult<String> {
    text(value).ok_or(RecordError::MissingField { entity, field })
}

fn invalid(entity: &'static str, field: &'static str, reason: impl Into<String>) -> RecordError {
    RecordError::InvalidField {
        entity,
        field,
        reason: reason.into(),
    }
}

fn contact(
    entity: &'static str,
    phone: &Option<Scalar>,
    email: &Option<Scalar>,
) -> RecordResult<Contact> {
    let phone = text(phone)
        .map(|p| normalize_phone(entity, &p))
        .transpose()?;

    let email = match text(email) {
        Some(e) if EMAIL.is_match(&e) => Some(e.to_lowercase()),
        Some(e) => return Err(invalid(entity, "email", format!("not an address: {}", e))),
        None => None,
    };

    Ok(Contact { phone, email })
}

/// Keep digits and a leading `+`; 8 to 15 digits
fn normalize_phone(entity: &'static str, raw: &str) -> RecordResult<String> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if !(8..=15).contains(&digits.len()) {
        return Err(invalid(
            entity,
            "phone",
            format!("expected 8-15 digits, got {}", digits.len()),
        ));
    }

    if raw.trim_start().starts_with('+') {
        Ok(format!("+{}", digits))
    } else {
        Ok(digits)
    }
}

fn parse_status(raw: &str) -> RecordResult<AppointmentStatus> {
    let key = raw.trim().to_lowercase().replace(['-', ' '], "_");
    match key.as_str() {
        "scheduled" | "pending" => Ok(AppointmentStatus::Scheduled),
        "confirmed" => Ok(AppointmentStatus::Confirmed),
        "completed" | "done" => Ok(AppointmentStatus::Completed),
        "cancelled" | "canceled" => Ok(AppointmentStatus::Cancelled),
        "no_show" | "missed" => Ok(AppointmentStatus::NoShow),
        _ => Err(invalid(APPOINTMENT, "status", format!("unknown status: {}", raw))),
    }
}

fn parse_datetime(
    entity: &'static str,
    field: &'static str,
    raw: &str,
) -> RecordResult<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.naive_local());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .ok_or_else(|| invalid(entity, field, format!("unrecognized date/time: {}", raw)))
}

fn parse_date(entity: &'static str, field: &'static str, raw: &str) -> RecordResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d/%m/%Y"))
        .or_else(|_| parse_datetime(entity, field, raw).map(|dt| dt.date()).map_err(|_| ()))
        .map_err(|_| invalid(entity, field, format!("unrecognized date: {}", raw)))
}

fn parse_time(entity: &'static str, field: &'static str, raw: &str) -> RecordResult<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| invalid(entity, field, format!("unrecognized time: {}", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_appointment_with_numeric_id_and_split_datetime() {
        let appointment = normalize_appointment(&json!({
            "id": 42,
            "patientName": "Ana Souza",
            "phone": "(11) 98765-4321",
            "date": "2024-05-10",
            "time": "14:00",
            "procedure": "Limpeza",
            "professional": "Dr. Carlos",
            "status": "Confirmed"
        }))
        .unwrap();

        assert_eq!(appointment.id.as_deref(), Some("42"));
        assert_eq!(appointment.contact.phone.as_deref(), Some("11987654321"));
        assert_eq!(
            appointment.starts_at,
            NaiveDate::from_ymd_opt(2024, 5, 10)
                .unwrap()
                .and_hms_opt(14, 0, 0)
                .unwrap()
        );
        assert_eq!(appointment.status, AppointmentStatus::Confirmed);
    }

    #[test]
    fn test_appointment_snake_case_and_rfc3339() {
        let appointment = normalize_appointment(&json!({
            "patient_name": "Bruno",
            "starts_at": "2024-05-10T09:30:00-03:00",
            "email": "Bruno@Example.com",
            "procedure": null
        }))
        .unwrap();

        assert_eq!(appointment.starts_at.format("%H:%M").to_string(), "09:30");
        assert_eq!(appointment.contact.email.as_deref(), Some("bruno@example.com"));
        assert_eq!(appointment.procedure, None);
        assert_eq!(appointment.status, AppointmentStatus::Scheduled);
    }

    #[test]
    fn test_appointment_missing_name_is_rejected() {
        let err = normalize_appointment(&json!({
            "patientName": "   ",
            "startsAt": "2024-05-10T09:30:00"
        }))
        .unwrap_err();

        assert_eq!(
            err,
            RecordError::MissingField {
                entity: "appointment",
                field: "patient_name"
            }
        );
    }

    #[test]
    fn test_appointment_bad_inputs() {
        assert!(matches!(
            normalize_appointment(&json!("not an object")),
            Err(RecordError::NotAnObject { .. })
        ));
        assert!(matches!(
            normalize_appointment(&json!({"patientName": "Ana", "startsAt": "amanhã"})),
            Err(RecordError::InvalidField { field: "starts_at", .. })
        ));
        assert!(matches!(
            normalize_appointment(&json!({"patientName": "Ana", "date": "2024-05-10"})),
            Err(RecordError::MissingField { field: "time", .. })
        ));
        assert!(matches!(
            normalize_appointment(&json!({
                "patientName": "Ana",
                "startsAt": "2024-05-10T09:30",
                "phone": "123"
            })),
            Err(RecordError::InvalidField { field: "phone", .. })
        ));
        assert!(matches!(
            normalize_appointment(&json!({
                "patientName": "Ana",
                "startsAt": "2024-05-10T09:30",
                "status": "rescheduled"
            })),
            Err(RecordError::InvalidField { field: "status", .. })
        ));
    }

    #[test]
    fn test_dormant_patient_accepts_brazilian_date() {
        let patient = normalize_dormant_patient(&json!({
            "id": "p-7",
            "name": "Carla",
            "phone": "+55 11 91234-5678",
            "lastVisit": "03/01/2023",
            "lastProcedure": "Restauração"
        }))
        .unwrap();

        assert_eq!(patient.last_visit, NaiveDate::from_ymd_opt(2023, 1, 3).unwrap());
        assert_eq!(patient.contact.phone.as_deref(), Some("+5511912345678"));
        assert_eq!(
            patient.days_since_last_visit(NaiveDate::from_ymd_opt(2023, 1, 13).unwrap()),
            10
        );
    }

    #[test]
    fn test_dormant_patient_rejects_invalid_email() {
        assert!(matches!(
            normalize_dormant_patient(&json!({
                "name": "Carla",
                "lastVisit": "2023-01-03",
                "email": "carla-at-example"
            })),
            Err(RecordError::InvalidField { field: "email", .. })
        ));
    }

    #[test]
    fn test_waitlist_slot_is_optional() {
        let entry =
            normalize_waitlist_entry(&json!({"name": "Davi", "procedure": "Canal"})).unwrap();
        assert_eq!(entry.offered_slot, None);

        let entry = normalize_waitlist_entry(&json!({
            "patientName": "Davi",
            "date": "12/06/2024",
            "time": "08:15"
        }))
        .unwrap();
        assert_eq!(
            entry.offered_slot.map(|s| s.format("%d/%m/%Y %H:%M").to_string()),
            Some("12/06/2024 08:15".to_string())
        );

        assert!(matches!(
            normalize_waitlist_entry(&json!({"patientName": "Davi", "date": "2024-06-12"})),
            Err(RecordError::MissingField { field: "time", .. })
        ));
    }

    #[test]
    fn test_recipient_payload_dispatches_by_kind() {
        let payload: RecipientPayload = serde_json::from_value(json!({
            "kind": "dormant_patient",
            "record": {"name": "Eva", "lastVisit": "2022-11-30"}
        }))
        .unwrap();

        let recipient = payload.normalize().unwrap();
        assert_eq!(recipient.kind(), "dormant_patient");
        assert_eq!(recipient.display_name(), "Eva");
    }

    #[test]
    fn test_rejected_payload_is_counted() {
        let counter = crate::metrics::RECORDS_REJECTED_TOTAL.with_label_values(&[WAITLIST]);
        let before = counter.get();

        let payload: RecipientPayload = serde_json::from_value(json!({
            "kind": "waitlist",
            "record": {"procedure": "Canal"}
        }))
        .unwrap();

        assert!(payload.normalize().is_err());
        assert!(counter.get() > before);
    }
}
