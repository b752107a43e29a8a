//! Multi-step wizard controller.
//!
//! The browser form walks six steps in a fixed order; "Next" is gated on the
//! current step's section validating cleanly, "Back" never validates, and the
//! final submit assembles and re-validates the whole aggregate. This module
//! is the server-side twin of that flow, used by clients that drive the form
//! headlessly and by the tests.

use thiserror::Error;

use crate::registration::{
    ConsentSignatory, EmergencyContact, Guarantor, InsurancePolicy, ParentGuardian, PatientInfo,
    RegistrationForm,
};
use crate::validate::{self, FieldError};

/// The fixed step sequence of the registration form
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FormStep {
    Patient,
    Guardians,
    Insurance,
    Guarantor,
    Emergency,
    Consent,
}

impl FormStep {
    pub const ALL: [FormStep; 6] = [
        FormStep::Patient,
        FormStep::Guardians,
        FormStep::Insurance,
        FormStep::Guarantor,
        FormStep::Emergency,
        FormStep::Consent,
    ];

    /// Step title as shown in the progress indicator
    pub fn title(&self) -> &'static str {
        match self {
            FormStep::Patient => "Patient Information",
            FormStep::Guardians => "Parent/Guardian Information",
            FormStep::Insurance => "Insurance Information",
            FormStep::Guarantor => "Guarantor Information",
            FormStep::Emergency => "Emergency Contacts",
            FormStep::Consent => "Consent & Agreements",
        }
    }

    fn next(&self) -> Option<FormStep> {
        let index = Self::ALL.iter().position(|s| s == self)?;
        Self::ALL.get(index + 1).copied()
    }

    fn prev(&self) -> Option<FormStep> {
        let index = Self::ALL.iter().position(|s| s == self)?;
        index.checked_sub(1).map(|i| Self::ALL[i])
    }
}

/// Form data accumulated step by step. Everything is optional until
/// `Wizard::finish` assembles the final aggregate.
#[derive(Debug, Clone, Default)]
pub struct RegistrationDraft {
    pub patient: Option<PatientInfo>,
    pub parent_guardian1: Option<ParentGuardian>,
    pub parent_guardian2: Option<ParentGuardian>,
    pub primary_insurance: Option<InsurancePolicy>,
    pub secondary_insurance: Option<InsurancePolicy>,
    pub guarantor: Option<Guarantor>,
    pub emergency_contact1: Option<EmergencyContact>,
    pub emergency_contact2: Option<EmergencyContact>,
    pub consent_signatory: Option<ConsentSignatory>,
    pub consent_to_treatment: bool,
    pub hipaa_acknowledgment: bool,
    pub financial_policy_agreement: bool,
}

#[derive(Debug, Error, PartialEq)]
pub enum WizardError {
    #[error("step validation failed")]
    Invalid(Vec<FieldError>),
    #[error("already at the final step")]
    AtFinalStep,
    #[error("submit is only available on the final step")]
    NotAtFinalStep,
}

/// Linear wizard over a [`RegistrationDraft`]
#[derive(Debug, Clone, Default)]
pub struct Wizard {
    step_index: usize,
    pub draft: RegistrationDraft,
}

impl Wizard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> FormStep {
        FormStep::ALL[self.step_index]
    }

    /// Validate the current step's sections and move forward. Refuses to
    /// advance while the step has errors, and from the final step entirely.
    pub fn advance(&mut self) -> Result<FormStep, WizardError> {
        let step = self.step();
        if step.next().is_none() {
            return Err(WizardError::AtFinalStep);
        }
        let errors = self.step_errors(step);
        if !errors.is_empty() {
            return Err(WizardError::Invalid(errors));
        }
        self.step_index += 1;
        Ok(self.step())
    }

    /// Move back one step. Never validates, never fails at the first step.
    pub fn back(&mut self) -> FormStep {
        if let Some(_prev) = self.step().prev() {
            self.step_index -= 1;
        }
        self.step()
    }

    /// Assemble the aggregate and run full validation. Only available on the
    /// final step.
    pub fn finish(&self) -> Result<RegistrationForm, WizardError> {
        if self.step().next().is_some() {
            return Err(WizardError::NotAtFinalStep);
        }

        let mut errors = Vec::new();
        let draft = &self.draft;

        let Some(patient) = draft.patient.clone() else {
            return Err(WizardError::Invalid(vec![missing("patient")]));
        };
        let Some(parent_guardian1) = draft.parent_guardian1.clone() else {
            return Err(WizardError::Invalid(vec![missing("parentGuardian1")]));
        };
        let Some(primary_insurance) = draft.primary_insurance.clone() else {
            return Err(WizardError::Invalid(vec![missing("primaryInsurance")]));
        };
        let Some(guarantor) = draft.guarantor.clone() else {
            return Err(WizardError::Invalid(vec![missing("guarantor")]));
        };
        let Some(emergency_contact1) = draft.emergency_contact1.clone() else {
            return Err(WizardError::Invalid(vec![missing("emergencyContact1")]));
        };
        let Some(consent_signatory) = draft.consent_signatory.clone() else {
            return Err(WizardError::Invalid(vec![missing("consentSignatory")]));
        };

        let form = RegistrationForm {
            patient,
            parent_guardian1,
            parent_guardian2: draft.parent_guardian2.clone(),
            primary_insurance,
            secondary_insurance: draft.secondary_insurance.clone(),
            guarantor,
            emergency_contact1,
            emergency_contact2: draft.emergency_contact2.clone(),
            consent_signatory,
            consent_to_treatment: draft.consent_to_treatment,
            hipaa_acknowledgment: draft.hipaa_acknowledgment,
            financial_policy_agreement: draft.financial_policy_agreement,
            submission_id: None,
            submission_timestamp: None,
        };

        if let Err(mut form_errors) = validate::validate_form(&form) {
            errors.append(&mut form_errors);
        }
        if errors.is_empty() {
            Ok(form)
        } else {
            Err(WizardError::Invalid(errors))
        }
    }

    /// Section errors for one step. A missing required section is reported
    /// against the section path; optional sections are checked only when the
    /// draft carries them.
    fn step_errors(&self, step: FormStep) -> Vec<FieldError> {
        let mut errors = Vec::new();
        let draft = &self.draft;

        match step {
            FormStep::Patient => match &draft.patient {
                Some(p) => validate::validate_patient(p, "patient", &mut errors),
                None => errors.push(missing("patient")),
            },
            FormStep::Guardians => {
                match &draft.parent_guardian1 {
                    Some(g) => validate::validate_guardian(g, "parentGuardian1", &mut errors),
                    None => errors.push(missing("parentGuardian1")),
                }
                if let Some(g) = &draft.parent_guardian2 {
                    validate::validate_guardian(g, "parentGuardian2", &mut errors);
                }
            }
            FormStep::Insurance => {
                match &draft.primary_insurance {
                    Some(i) => validate::validate_insurance(i, "primaryInsurance", &mut errors),
                    None => errors.push(missing("primaryInsurance")),
                }
                if let Some(i) = &draft.secondary_insurance {
                    validate::validate_insurance(i, "secondaryInsurance", &mut errors);
                }
            }
            FormStep::Guarantor => match &draft.guarantor {
                Some(g) => validate::validate_guarantor(g, "guarantor", &mut errors),
                None => errors.push(missing("guarantor")),
            },
            FormStep::Emergency => {
                match &draft.emergency_contact1 {
                    Some(c) => {
                        validate::validate_emergency_contact(c, "emergencyContact1", &mut errors)
                    }
                    None => errors.push(missing("emergencyContact1")),
                }
                if let Some(c) = &draft.emergency_contact2 {
                    validate::validate_emergency_contact(c, "emergencyContact2", &mut errors);
                }
            }
            FormStep::Consent => {
                // Validated in finish(); Consent is the final step so advance
                // never lands here.
            }
        }

        errors
    }
}

fn missing(section: &str) -> FieldError {
    FieldError::new(section, "This section is required")
}
