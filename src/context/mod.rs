//! Substitution context assembly.
//!
//! Turns whichever entity is selected for a message into the
//! token-name to display-string map the resolver consumes. Dates and times
//! are formatted here, the resolver does no formatting.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::records::{Appointment, DormantPatient, Recipient, WaitlistEntry};
use crate::template::SubstitutionContext;

const DATE_FORMAT: &str = "%d/%m/%Y";
const TIME_FORMAT: &str = "%H:%M";

/// Placeholder vocabulary documented to template authors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    PatientName,
    Date,
    Time,
    Procedure,
    Professional,
    ClinicName,
    LastVisit,
}

impl Token {
    pub const ALL: [Token; 7] = [
        Token::PatientName,
        Token::Date,
        Token::Time,
        Token::Procedure,
        Token::Professional,
        Token::ClinicName,
        Token::LastVisit,
    ];

    /// Name as written between braces in a template
    pub fn name(&self) -> &'static str {
        match self {
            Token::PatientName => "patientName",
            Token::Date => "date",
            Token::Time => "time",
            Token::Procedure => "procedure",
            Token::Professional => "professional",
            Token::ClinicName => "clinicName",
            Token::LastVisit => "lastVisit",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Token::PatientName => "Recipient display name",
            Token::Date => "Appointment or offered slot date (dd/mm/yyyy)",
            Token::Time => "Appointment or offered slot time (HH:MM)",
            Token::Procedure => "Procedure or treatment",
            Token::Professional => "Responsible professional",
            Token::ClinicName => "Clinic display name",
            Token::LastVisit => "Date of the last visit (dd/mm/yyyy)",
        }
    }

    /// `{name}` literal
    pub fn placeholder(&self) -> String {
        format!("{{{}}}", self.name())
    }
}

/// Documentation entry for one token
#[derive(Debug, Clone, Serialize)]
pub struct TokenInfo {
    pub placeholder: String,
    pub description: &'static str,
}

/// Documented token list
pub fn token_catalog() -> Vec<TokenInfo> {
    Token::ALL
        .iter()
        .map(|t| TokenInfo {
            placeholder: t.placeholder(),
            description: t.description(),
        })
        .collect()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn format_time(datetime: NaiveDateTime) -> String {
    datetime.format(TIME_FORMAT).to_string()
}

/// Builds substitution contexts with the clinic's fixed fields
pub struct ContextBuilder<'a> {
    clinic_name: &'a str,
}

impl<'a> ContextBuilder<'a> {
    pub fn new(clinic_name: &'a str) -> Self {
        Self { clinic_name }
    }

    pub fn build(&self, recipient: &Recipient) -> SubstitutionContext {
        match recipient {
            Recipient::Appointment(a) => self.for_appointment(a),
            Recipient::DormantPatient(p) => self.for_dormant_patient(p),
            Recipient::Waitlist(w) => self.for_waitlist_entry(w),
        }
    }

    pub fn for_appointment(&self, appointment: &Appointment) -> SubstitutionContext {
        let mut context = self.base(&appointment.patient_name);
        put(&mut context, Token::Date, Some(format_date(appointment.starts_at.date())));
        put(&mut context, Token::Time, Some(format_time(appointment.starts_at)));
        put(&mut context, Token::Procedure, appointment.procedure.clone());
        put(&mut context, Token::Professional, appointment.professional.clone());
        context
    }

    pub fn for_dormant_patient(&self, patient: &DormantPatient) -> SubstitutionContext {
        let mut context = self.base(&patient.name);
        put(&mut context, Token::LastVisit, Some(format_date(patient.last_visit)));
        put(&mut context, Token::Procedure, patient.last_procedure.clone());
        context
    }

    pub fn for_waitlist_entry(&self, entry: &WaitlistEntry) -> SubstitutionContext {
        let mut context = self.base(&entry.patient_name);
        put(&mut context, Token::Procedure, entry.procedure.clone());
        put(&mut context, Token::Professional, entry.professional.clone());
        if let Some(slot) = entry.offered_slot {
            put(&mut context, Token::Date, Some(format_date(slot.date())));
            put(&mut context, Token::Time, Some(format_time(slot)));
        }
        context
    }

    fn base(&self, patient_name: &str) -> SubstitutionContext {
        let mut context = SubstitutionContext::new();
        put(&mut context, Token::PatientName, Some(patient_name.to_string()));
        put(&mut context, Token::ClinicName, Some(self.clinic_name.to_string()));
        context
    }
}

fn put(context: &mut SubstitutionContext, token: Token, value: Option<String>) {
    if let Some(value) = value {
        context.insert(token.name().to_string(), value);
    }
}
