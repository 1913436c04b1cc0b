//! Entity records that retention messages are built from.

mod normalize;
mod types;

pub use normalize::{
    normalize_appointment, normalize_dormant_patient, normalize_waitlist_entry, RecipientPayload,
};
pub use types::{
    Appointment, AppointmentStatus, Contact, DormantPatient, Recipient, RecordError, RecordResult,
    WaitlistEntry,
};
