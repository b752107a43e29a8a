//! Registration form data model.
//!
//! Wire names are camelCase to match the payload the browser form posts.
//! Every record lives for a single request: deserialized, validated,
//! rendered to the PDF transcript, emailed, and discarded.

use serde::{Deserialize, Serialize};

/// Patient gender as offered by the form
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Gender {
    Male,
    Female,
    Other,
    PreferNotToSay,
}

impl Gender {
    /// Wire-format label, used verbatim in the PDF and email transcripts
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
            Gender::PreferNotToSay => "prefer-not-to-say",
        }
    }
}

/// US postal address
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: String,
    pub city: String,
    /// Two-letter state code
    pub state: String,
    /// 5-digit or ZIP+4
    pub zip_code: String,
}

/// Phone numbers for a record. Which slots are meaningful depends on the
/// record — the patient form shows home/cell, guardians cell/work, emergency
/// contacts all three. Validation enforces the per-record "at least one" rule.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct PhoneNumbers {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cell: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work: Option<String>,
}

/// Patient demographics
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PatientInfo {
    pub first_name: String,
    pub last_name: String,
    /// MM-DD-YYYY
    pub date_of_birth: String,
    pub gender: Gender,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub social_security_number: Option<String>,
    pub home_address: Address,
    #[serde(default)]
    pub phone_numbers: PhoneNumbers,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Parent or legal guardian
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ParentGuardian {
    pub first_name: String,
    pub last_name: String,
    pub relationship: String,
    #[serde(default)]
    pub phone_numbers: PhoneNumbers,
    pub email: String,
    pub is_primary_contact: bool,
}

/// One insurance policy. Card photos travel as multipart file parts, not
/// inside the JSON payload, so they are not part of this record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InsurancePolicy {
    pub is_primary: bool,
    pub company_name: String,
    pub policy_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_number: Option<String>,
    pub subscriber_name: String,
    /// MM-DD-YYYY
    pub subscriber_date_of_birth: String,
    pub subscriber_relationship: String,
}

/// Guarantor employer details
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Employer {
    pub name: String,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

/// Party financially responsible for billing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Guarantor {
    pub first_name: String,
    pub last_name: String,
    pub relationship_to_patient: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub social_security_number: Option<String>,
    pub address: Address,
    pub phone_number: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employer: Option<Employer>,
}

/// Emergency contact
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyContact {
    pub first_name: String,
    pub last_name: String,
    pub relationship: String,
    #[serde(default)]
    pub phone_numbers: PhoneNumbers,
}

/// The adult completing and signing the form. Must be 18 or older.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConsentSignatory {
    pub signatory_name: String,
    /// MM-DD-YYYY
    pub signatory_date_of_birth: String,
    pub relationship_to_patient: String,
    pub electronic_signature: String,
    /// MM-DD-YYYY
    pub date_signed: String,
}

/// Complete registration payload as submitted by the form
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationForm {
    pub patient: PatientInfo,
    pub parent_guardian1: ParentGuardian,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_guardian2: Option<ParentGuardian>,
    pub primary_insurance: InsurancePolicy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_insurance: Option<InsurancePolicy>,
    pub guarantor: Guarantor,
    pub emergency_contact1: EmergencyContact,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_contact2: Option<EmergencyContact>,
    pub consent_signatory: ConsentSignatory,
    pub consent_to_treatment: bool,
    pub hipaa_acknowledgment: bool,
    pub financial_policy_agreement: bool,
    /// Assigned server-side at submission
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission_id: Option<String>,
    /// RFC 3339, assigned server-side at submission
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission_timestamp: Option<String>,
}

impl RegistrationForm {
    /// "First Last" of the patient, used in the email subject and audit log
    pub fn patient_name(&self) -> String {
        format!("{} {}", self.patient.first_name, self.patient.last_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gender_uses_kebab_case_on_the_wire() {
        let json = serde_json::to_string(&Gender::PreferNotToSay).unwrap();
        assert_eq!(json, "\"prefer-not-to-say\"");

        let parsed: Gender = serde_json::from_str("\"male\"").unwrap();
        assert_eq!(parsed, Gender::Male);
    }

    #[test]
    fn missing_phone_numbers_object_defaults_to_empty() {
        let json = serde_json::json!({
            "firstName": "Avery",
            "lastName": "Quinn",
            "relationship": "Mother",
            "email": "avery@example.com",
            "isPrimaryContact": true
        });
        let guardian: ParentGuardian = serde_json::from_value(json).unwrap();
        assert!(guardian.phone_numbers.cell.is_none());
        assert!(guardian.phone_numbers.work.is_none());
    }

    #[test]
    fn address_round_trips_with_camel_case_keys() {
        let addr = Address {
            street: "123 Oak St".into(),
            city: "Danville".into(),
            state: "CA".into(),
            zip_code: "94526".into(),
        };
        let value = serde_json::to_value(&addr).unwrap();
        assert_eq!(value["zipCode"], "94526");
        let back: Address = serde_json::from_value(value).unwrap();
        assert_eq!(back, addr);
    }
}
