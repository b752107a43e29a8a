//! Registration form validation.
//!
//! Mirrors the rules the browser form enforces so the server never trusts the
//! client: required fields, format regexes, the per-record "at least one
//! phone number" invariant, consent booleans, and the signatory age rule.
//! Errors carry dotted field paths (`patient.homeAddress.zipCode`) that the
//! client maps back onto inputs.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;

use crate::dates;
use crate::registration::{
    Address, ConsentSignatory, EmergencyContact, Guarantor, InsurancePolicy, ParentGuardian,
    PatientInfo, RegistrationForm,
};

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\(\d{3}\) \d{3}-\d{4}$").unwrap());
static SSN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{3}-\d{2}-\d{4}$").unwrap());
static ZIP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{5}(-\d{4})?$").unwrap());
// Pragmatic email check, not an RFC 5322 parser
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

/// Minimum signatory age in years
pub const SIGNATORY_MIN_AGE: i32 = 18;

/// A single validation failure, addressed by dotted field path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub path: String,
    pub message: String,
}

impl FieldError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Treat present-but-blank optional strings as absent, matching the form's
/// behavior of posting empty strings for untouched inputs.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn require(errors: &mut Vec<FieldError>, path: &str, value: &str, what: &str) {
    if value.trim().is_empty() {
        errors.push(FieldError::new(path, format!("{what} is required")));
    }
}

fn check_phone(errors: &mut Vec<FieldError>, path: &str, value: &str) {
    if !PHONE_RE.is_match(value) {
        errors.push(FieldError::new(
            path,
            "Phone number must be in format (XXX) XXX-XXXX",
        ));
    }
}

fn check_optional_phone(errors: &mut Vec<FieldError>, path: &str, value: &Option<String>) {
    if let Some(v) = present(value) {
        check_phone(errors, path, v);
    }
}

fn check_required_phone(errors: &mut Vec<FieldError>, path: &str, value: &str) {
    if value.trim().is_empty() {
        errors.push(FieldError::new(path, "Phone number is required"));
    } else {
        check_phone(errors, path, value);
    }
}

fn check_email(errors: &mut Vec<FieldError>, path: &str, value: &str) {
    if !EMAIL_RE.is_match(value.trim()) {
        errors.push(FieldError::new(path, "Invalid email address"));
    }
}

fn check_date(errors: &mut Vec<FieldError>, path: &str, value: &str) {
    if !dates::is_valid_date(value) {
        errors.push(FieldError::new(
            path,
            "Date must be a valid date in MM-DD-YYYY format",
        ));
    }
}

fn check_ssn(errors: &mut Vec<FieldError>, path: &str, value: &Option<String>) {
    if let Some(v) = present(value) {
        if !SSN_RE.is_match(v) {
            errors.push(FieldError::new(path, "SSN must be in format XXX-XX-XXXX"));
        }
    }
}

fn check_address(errors: &mut Vec<FieldError>, path: &str, address: &Address) {
    require(
        errors,
        &format!("{path}.street"),
        &address.street,
        "Street address",
    );
    require(errors, &format!("{path}.city"), &address.city, "City");
    if address.state.len() != 2 || !address.state.bytes().all(|b| b.is_ascii_alphabetic()) {
        errors.push(FieldError::new(
            format!("{path}.state"),
            "State must be a 2-letter code",
        ));
    }
    if !ZIP_RE.is_match(&address.zip_code) {
        errors.push(FieldError::new(
            format!("{path}.zipCode"),
            "Invalid ZIP code",
        ));
    }
}

/// Patient section: names, birth date, address, home/cell phones (one
/// required), optional SSN and email.
pub fn validate_patient(patient: &PatientInfo, path: &str, errors: &mut Vec<FieldError>) {
    require(
        errors,
        &format!("{path}.firstName"),
        &patient.first_name,
        "First name",
    );
    require(
        errors,
        &format!("{path}.lastName"),
        &patient.last_name,
        "Last name",
    );
    check_date(errors, &format!("{path}.dateOfBirth"), &patient.date_of_birth);
    check_ssn(
        errors,
        &format!("{path}.socialSecurityNumber"),
        &patient.social_security_number,
    );
    check_address(errors, &format!("{path}.homeAddress"), &patient.home_address);

    let phones = &patient.phone_numbers;
    check_optional_phone(errors, &format!("{path}.phoneNumbers.home"), &phones.home);
    check_optional_phone(errors, &format!("{path}.phoneNumbers.cell"), &phones.cell);
    if present(&phones.home).is_none() && present(&phones.cell).is_none() {
        errors.push(FieldError::new(
            format!("{path}.phoneNumbers"),
            "At least one phone number is required",
        ));
    }

    if let Some(email) = present(&patient.email) {
        check_email(errors, &format!("{path}.email"), email);
    }
}

/// Guardian section: names, relationship, cell/work phones (one required),
/// required email.
pub fn validate_guardian(guardian: &ParentGuardian, path: &str, errors: &mut Vec<FieldError>) {
    require(
        errors,
        &format!("{path}.firstName"),
        &guardian.first_name,
        "First name",
    );
    require(
        errors,
        &format!("{path}.lastName"),
        &guardian.last_name,
        "Last name",
    );
    require(
        errors,
        &format!("{path}.relationship"),
        &guardian.relationship,
        "Relationship",
    );
    check_email(errors, &format!("{path}.email"), &guardian.email);

    let phones = &guardian.phone_numbers;
    check_optional_phone(errors, &format!("{path}.phoneNumbers.cell"), &phones.cell);
    check_optional_phone(errors, &format!("{path}.phoneNumbers.work"), &phones.work);
    if present(&phones.cell).is_none() && present(&phones.work).is_none() {
        errors.push(FieldError::new(
            format!("{path}.phoneNumbers"),
            "At least one phone number is required",
        ));
    }
}

/// Insurance section: carrier, policy/subscriber identity; group number is
/// optional.
pub fn validate_insurance(policy: &InsurancePolicy, path: &str, errors: &mut Vec<FieldError>) {
    require(
        errors,
        &format!("{path}.companyName"),
        &policy.company_name,
        "Insurance company name",
    );
    require(
        errors,
        &format!("{path}.policyNumber"),
        &policy.policy_number,
        "Policy number",
    );
    require(
        errors,
        &format!("{path}.subscriberName"),
        &policy.subscriber_name,
        "Subscriber name",
    );
    check_date(
        errors,
        &format!("{path}.subscriberDateOfBirth"),
        &policy.subscriber_date_of_birth,
    );
    require(
        errors,
        &format!("{path}.subscriberRelationship"),
        &policy.subscriber_relationship,
        "Subscriber relationship",
    );
}

/// Guarantor section: identity, address, one required phone, required email,
/// optional SSN and employer.
pub fn validate_guarantor(guarantor: &Guarantor, path: &str, errors: &mut Vec<FieldError>) {
    require(
        errors,
        &format!("{path}.firstName"),
        &guarantor.first_name,
        "First name",
    );
    require(
        errors,
        &format!("{path}.lastName"),
        &guarantor.last_name,
        "Last name",
    );
    require(
        errors,
        &format!("{path}.relationshipToPatient"),
        &guarantor.relationship_to_patient,
        "Relationship to patient",
    );
    check_ssn(
        errors,
        &format!("{path}.socialSecurityNumber"),
        &guarantor.social_security_number,
    );
    check_address(errors, &format!("{path}.address"), &guarantor.address);
    check_required_phone(errors, &format!("{path}.phoneNumber"), &guarantor.phone_number);
    check_email(errors, &format!("{path}.email"), &guarantor.email);

    if let Some(employer) = &guarantor.employer {
        check_optional_phone(
            errors,
            &format!("{path}.employer.phoneNumber"),
            &employer.phone_number,
        );
    }
}

/// Emergency contact: identity plus any one of home/cell/work phone.
pub fn validate_emergency_contact(
    contact: &EmergencyContact,
    path: &str,
    errors: &mut Vec<FieldError>,
) {
    require(
        errors,
        &format!("{path}.firstName"),
        &contact.first_name,
        "First name",
    );
    require(
        errors,
        &format!("{path}.lastName"),
        &contact.last_name,
        "Last name",
    );
    require(
        errors,
        &format!("{path}.relationship"),
        &contact.relationship,
        "Relationship",
    );

    let phones = &contact.phone_numbers;
    check_optional_phone(errors, &format!("{path}.phoneNumbers.home"), &phones.home);
    check_optional_phone(errors, &format!("{path}.phoneNumbers.cell"), &phones.cell);
    check_optional_phone(errors, &format!("{path}.phoneNumbers.work"), &phones.work);
    if present(&phones.home).is_none()
        && present(&phones.cell).is_none()
        && present(&phones.work).is_none()
    {
        errors.push(FieldError::new(
            format!("{path}.phoneNumbers"),
            "At least one phone number is required",
        ));
    }
}

/// Consent signatory: identity, signature, and the 18-or-older rule,
/// evaluated against the given calendar date.
pub fn validate_signatory(
    signatory: &ConsentSignatory,
    path: &str,
    today: NaiveDate,
    errors: &mut Vec<FieldError>,
) {
    require(
        errors,
        &format!("{path}.signatoryName"),
        &signatory.signatory_name,
        "Signatory name",
    );
    require(
        errors,
        &format!("{path}.relationshipToPatient"),
        &signatory.relationship_to_patient,
        "Relationship to patient",
    );
    require(
        errors,
        &format!("{path}.electronicSignature"),
        &signatory.electronic_signature,
        "Electronic signature",
    );
    check_date(errors, &format!("{path}.dateSigned"), &signatory.date_signed);

    let dob_path = format!("{path}.signatoryDateOfBirth");
    if !dates::is_valid_date(&signatory.signatory_date_of_birth) {
        errors.push(FieldError::new(
            dob_path,
            "Date must be a valid date in MM-DD-YYYY format",
        ));
    } else {
        match dates::age_in_years(&signatory.signatory_date_of_birth, today) {
            Some(age) if age >= SIGNATORY_MIN_AGE => {}
            _ => errors.push(FieldError::new(
                dob_path,
                format!("Signatory must be at least {SIGNATORY_MIN_AGE} years old"),
            )),
        }
    }
}

/// The three consent flags must all be affirmative.
pub fn validate_consents(form: &RegistrationForm, errors: &mut Vec<FieldError>) {
    if !form.consent_to_treatment {
        errors.push(FieldError::new(
            "consentToTreatment",
            "Consent to treatment is required",
        ));
    }
    if !form.hipaa_acknowledgment {
        errors.push(FieldError::new(
            "hipaaAcknowledgment",
            "HIPAA acknowledgment is required",
        ));
    }
    if !form.financial_policy_agreement {
        errors.push(FieldError::new(
            "financialPolicyAgreement",
            "Financial policy agreement is required",
        ));
    }
}

/// Validate the complete aggregate with the signatory age taken against
/// `today`. Returns all failures, not just the first.
pub fn validate_form_at(form: &RegistrationForm, today: NaiveDate) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();

    validate_patient(&form.patient, "patient", &mut errors);
    validate_guardian(&form.parent_guardian1, "parentGuardian1", &mut errors);
    if let Some(guardian) = &form.parent_guardian2 {
        validate_guardian(guardian, "parentGuardian2", &mut errors);
    }
    validate_insurance(&form.primary_insurance, "primaryInsurance", &mut errors);
    if let Some(policy) = &form.secondary_insurance {
        validate_insurance(policy, "secondaryInsurance", &mut errors);
    }
    validate_guarantor(&form.guarantor, "guarantor", &mut errors);
    validate_emergency_contact(&form.emergency_contact1, "emergencyContact1", &mut errors);
    if let Some(contact) = &form.emergency_contact2 {
        validate_emergency_contact(contact, "emergencyContact2", &mut errors);
    }
    validate_signatory(&form.consent_signatory, "consentSignatory", today, &mut errors);
    validate_consents(form, &mut errors);

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// Validate the complete aggregate as of the local calendar date
pub fn validate_form(form: &RegistrationForm) -> Result<(), Vec<FieldError>> {
    validate_form_at(form, chrono::Local::now().date_naive())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::registration::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 1).unwrap()
    }

    pub(crate) fn sample_patient() -> PatientInfo {
        PatientInfo {
            first_name: "Riley".into(),
            last_name: "Morgan".into(),
            date_of_birth: "04-02-2019".into(),
            gender: Gender::Female,
            social_security_number: None,
            home_address: Address {
                street: "812 Sycamore Valley Rd".into(),
                city: "Danville".into(),
                state: "CA".into(),
                zip_code: "94526".into(),
            },
            phone_numbers: PhoneNumbers {
                home: None,
                cell: Some("(925) 555-0142".into()),
                work: None,
            },
            email: None,
        }
    }

    pub(crate) fn sample_guardian() -> ParentGuardian {
        ParentGuardian {
            first_name: "Dana".into(),
            last_name: "Morgan".into(),
            relationship: "Mother".into(),
            phone_numbers: PhoneNumbers {
                home: None,
                cell: Some("(925) 555-0142".into()),
                work: None,
            },
            email: "dana.morgan@example.com".into(),
            is_primary_contact: true,
        }
    }

    pub(crate) fn sample_insurance() -> InsurancePolicy {
        InsurancePolicy {
            is_primary: true,
            company_name: "Blue Shield of California".into(),
            policy_number: "XEA904416702".into(),
            group_number: Some("982200".into()),
            subscriber_name: "Dana Morgan".into(),
            subscriber_date_of_birth: "09-14-1988".into(),
            subscriber_relationship: "Parent".into(),
        }
    }

    pub(crate) fn sample_guarantor() -> Guarantor {
        Guarantor {
            first_name: "Dana".into(),
            last_name: "Morgan".into(),
            relationship_to_patient: "Mother".into(),
            social_security_number: Some("123-45-6789".into()),
            address: Address {
                street: "812 Sycamore Valley Rd".into(),
                city: "Danville".into(),
                state: "CA".into(),
                zip_code: "94526".into(),
            },
            phone_number: "(925) 555-0142".into(),
            email: "dana.morgan@example.com".into(),
            employer: None,
        }
    }

    pub(crate) fn sample_contact() -> EmergencyContact {
        EmergencyContact {
            first_name: "Jo".into(),
            last_name: "Whitfield".into(),
            relationship: "Aunt".into(),
            phone_numbers: PhoneNumbers {
                home: Some("(925) 555-0177".into()),
                cell: None,
                work: None,
            },
        }
    }

    pub(crate) fn sample_signatory() -> ConsentSignatory {
        ConsentSignatory {
            signatory_name: "Dana Morgan".into(),
            signatory_date_of_birth: "09-14-1988".into(),
            relationship_to_patient: "Mother".into(),
            electronic_signature: "Dana Morgan".into(),
            date_signed: "08-01-2026".into(),
        }
    }

    pub(crate) fn sample_form() -> RegistrationForm {
        RegistrationForm {
            patient: sample_patient(),
            parent_guardian1: sample_guardian(),
            parent_guardian2: None,
            primary_insurance: sample_insurance(),
            secondary_insurance: None,
            guarantor: sample_guarantor(),
            emergency_contact1: sample_contact(),
            emergency_contact2: None,
            consent_signatory: sample_signatory(),
            consent_to_treatment: true,
            hipaa_acknowledgment: true,
            financial_policy_agreement: true,
            submission_id: None,
            submission_timestamp: None,
        }
    }

    #[test]
    fn accepts_a_complete_form() {
        assert_eq!(validate_form_at(&sample_form(), today()), Ok(()));
    }

    #[test]
    fn rejects_malformed_phone() {
        let mut form = sample_form();
        form.patient.phone_numbers.cell = Some("925-555-0142".into());
        let errors = validate_form_at(&form, today()).unwrap_err();
        assert!(errors.iter().any(|e| e.path == "patient.phoneNumbers.cell"
            && e.message.contains("(XXX) XXX-XXXX")));
    }

    #[test]
    fn requires_at_least_one_patient_phone() {
        let mut form = sample_form();
        form.patient.phone_numbers = PhoneNumbers::default();
        let errors = validate_form_at(&form, today()).unwrap_err();
        assert!(errors.iter().any(|e| e.path == "patient.phoneNumbers"));
    }

    #[test]
    fn blank_phone_counts_as_absent() {
        let mut form = sample_form();
        form.patient.phone_numbers = PhoneNumbers {
            home: Some("  ".into()),
            cell: Some(String::new()),
            work: None,
        };
        let errors = validate_form_at(&form, today()).unwrap_err();
        // The blanks must not trigger format errors, only the cross-field rule
        assert_eq!(
            errors
                .iter()
                .filter(|e| e.path.starts_with("patient.phoneNumbers"))
                .count(),
            1
        );
    }

    #[test]
    fn guardian_work_phone_satisfies_the_phone_rule() {
        let mut form = sample_form();
        form.parent_guardian1.phone_numbers = PhoneNumbers {
            home: None,
            cell: None,
            work: Some("(925) 555-0190".into()),
        };
        assert_eq!(validate_form_at(&form, today()), Ok(()));
    }

    #[test]
    fn rejects_impossible_birth_date() {
        let mut form = sample_form();
        form.patient.date_of_birth = "02-30-2020".into();
        let errors = validate_form_at(&form, today()).unwrap_err();
        assert!(errors.iter().any(|e| e.path == "patient.dateOfBirth"));
    }

    #[test]
    fn rejects_bad_ssn_and_zip() {
        let mut form = sample_form();
        form.guarantor.social_security_number = Some("12-345-678".into());
        form.guarantor.address.zip_code = "9452".into();
        let errors = validate_form_at(&form, today()).unwrap_err();
        assert!(errors.iter().any(|e| e.path == "guarantor.socialSecurityNumber"));
        assert!(errors.iter().any(|e| e.path == "guarantor.address.zipCode"));
    }

    #[test]
    fn accepts_zip_plus_four() {
        let mut form = sample_form();
        form.guarantor.address.zip_code = "94526-1234".into();
        assert_eq!(validate_form_at(&form, today()), Ok(()));
    }

    #[test]
    fn rejects_signatory_under_18() {
        let mut form = sample_form();
        form.consent_signatory.signatory_date_of_birth = "09-14-2010".into();
        let errors = validate_form_at(&form, today()).unwrap_err();
        assert!(errors.iter().any(|e| {
            e.path == "consentSignatory.signatoryDateOfBirth"
                && e.message.contains("at least 18")
        }));
    }

    #[test]
    fn accepts_signatory_on_exact_18th_birthday() {
        let mut form = sample_form();
        form.consent_signatory.signatory_date_of_birth = "08-01-2008".into();
        assert_eq!(validate_form_at(&form, today()), Ok(()));
    }

    #[test]
    fn all_three_consents_are_required() {
        let mut form = sample_form();
        form.consent_to_treatment = false;
        form.hipaa_acknowledgment = false;
        form.financial_policy_agreement = false;
        let errors = validate_form_at(&form, today()).unwrap_err();
        let paths: Vec<_> = errors.iter().map(|e| e.path.as_str()).collect();
        assert!(paths.contains(&"consentToTreatment"));
        assert!(paths.contains(&"hipaaAcknowledgment"));
        assert!(paths.contains(&"financialPolicyAgreement"));
    }

    #[test]
    fn optional_sections_are_validated_when_present() {
        let mut form = sample_form();
        form.emergency_contact2 = Some(EmergencyContact {
            first_name: String::new(),
            last_name: "Whitfield".into(),
            relationship: "Uncle".into(),
            phone_numbers: PhoneNumbers::default(),
        });
        let errors = validate_form_at(&form, today()).unwrap_err();
        assert!(errors.iter().any(|e| e.path == "emergencyContact2.firstName"));
        assert!(errors.iter().any(|e| e.path == "emergencyContact2.phoneNumbers"));
    }

    #[test]
    fn collects_errors_across_sections() {
        let mut form = sample_form();
        form.patient.first_name = String::new();
        form.guarantor.email = "nope".into();
        form.primary_insurance.policy_number = String::new();
        let errors = validate_form_at(&form, today()).unwrap_err();
        assert!(errors.len() >= 3);
    }
}
