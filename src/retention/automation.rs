//! Recipient selection rules for the automated campaigns

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::records::{Appointment, DormantPatient};

/// Whether `appointment` should get a reminder at `now`.
///
/// Pending appointments starting after `now` and no later than
/// `hours_before` hours from it qualify.
pub fn is_reminder_due(appointment: &Appointment, now: NaiveDateTime, hours_before: u32) -> bool {
    let horizon = now + Duration::hours(i64::from(hours_before));
    appointment.status.is_pending()
        && appointment.starts_at > now
        && appointment.starts_at <= horizon
}

/// Whether `patient` has been away for at least `dormant_after_days`
pub fn is_dormant(patient: &DormantPatient, today: NaiveDate, dormant_after_days: u32) -> bool {
    patient.days_since_last_visit(today) >= i64::from(dormant_after_days)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{AppointmentStatus, Contact};

    fn at(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn appointment(starts_at: NaiveDateTime, status: AppointmentStatus) -> Appointment {
        Appointment {
            id: None,
            patient_name: "Ana".to_string(),
            contact: Contact::default(),
            starts_at,
            procedure: None,
            professional: None,
            status,
        }
    }

    #[test]
    fn test_reminder_window() {
        let now = at(10, 8);
        assert!(is_reminder_due(&appointment(at(10, 14), AppointmentStatus::Scheduled), now, 24));
        assert!(is_reminder_due(&appointment(at(11, 8), AppointmentStatus::Confirmed), now, 24));
        assert!(!is_reminder_due(&appointment(at(11, 9), AppointmentStatus::Scheduled), now, 24));
        assert!(!is_reminder_due(&appointment(at(10, 7), AppointmentStatus::Scheduled), now, 24));
        assert!(!is_reminder_due(&appointment(at(10, 14), AppointmentStatus::Cancelled), now, 24));
    }

    #[test]
    fn test_dormancy_threshold() {
        let patient = DormantPatient {
            id: None,
            name: "Carla".to_string(),
            contact: Contact::default(),
            last_visit: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            last_procedure: None,
        };

        assert!(is_dormant(&patient, NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(), 30));
        assert!(!is_dormant(&patient, NaiveDate::from_ymd_opt(2024, 1, 30).unwrap(), 30));
    }
}
