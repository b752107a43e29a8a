//! intake-core: Shared patient-registration types and validation
//!
//! This crate provides the registration form data model, the per-section
//! validation rules, the multi-step wizard controller, and the small
//! date/masking utilities shared by the HTTP server.

pub mod dates;
pub mod mask;
pub mod registration;
pub mod submission;
pub mod validate;
pub mod wizard;

// Re-export our types
pub use registration::{
    Address, ConsentSignatory, EmergencyContact, Employer, Gender, Guarantor, InsurancePolicy,
    ParentGuardian, PatientInfo, PhoneNumbers, RegistrationForm,
};
pub use submission::{SubmissionResponse, new_submission_id};
pub use validate::{FieldError, validate_form};
pub use wizard::{FormStep, RegistrationDraft, Wizard, WizardError};
