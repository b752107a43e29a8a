//! PDF transcript generation via `printpdf`.
//!
//! Walks the validated registration data and emits the fixed-format
//! transcript the practice files: header block, one section per form step,
//! uploaded insurance-card photos, and the consent summary. The write cursor
//! starts a new page whenever the next line or image block would cross the
//! bottom margin. A card photo that fails to decode degrades to a placeholder
//! line; it never fails the whole render.

use std::io::BufWriter;

use printpdf::image_crate::GenericImageView;
use printpdf::{
    BuiltinFont, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, image_crate,
};
use thiserror::Error;

use intake_core::RegistrationForm;

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 20.0;
const LINE_MM: f32 = 6.0;
const BOTTOM_MM: f32 = 30.0;
/// Insurance card photos are capped at this height on the page
const IMAGE_MAX_HEIGHT_MM: f32 = 60.0;
const IMAGE_DPI: f32 = 300.0;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("PDF build error: {0}")]
    Build(String),
    #[error("PDF write error: {0}")]
    Write(#[from] std::io::Error),
}

/// An uploaded insurance card photo
#[derive(Debug, Clone)]
pub struct CardImage {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Card photos attached to a submission, keyed by slot
#[derive(Debug, Clone, Default)]
pub struct CardImages {
    pub primary_front: Option<CardImage>,
    pub primary_back: Option<CardImage>,
    pub secondary_front: Option<CardImage>,
    pub secondary_back: Option<CardImage>,
}

impl CardImages {
    pub fn is_empty(&self) -> bool {
        self.primary_front.is_none()
            && self.primary_back.is_none()
            && self.secondary_front.is_none()
            && self.secondary_back.is_none()
    }
}

/// Render the registration transcript, returning PDF bytes
pub fn render_transcript(form: &RegistrationForm, images: &CardImages) -> Result<Vec<u8>, PdfError> {
    let mut page = TranscriptWriter::new("Patient Registration")?;

    // Practice header
    page.line_sized("DANVILLE PEDIATRICS", 16.0, true);
    page.line_sized("1-to-1 Pediatrics", 12.0, false);
    page.line_sized("\"Hometown Care for Your Child\"", 10.0, false);
    page.line_sized("Phone: (925) 362-1861", 10.0, false);
    page.gap(10.0);

    page.line_sized("PATIENT REGISTRATION FORM", 14.0, true);
    page.line(&format!(
        "Submission ID: {}",
        form.submission_id.as_deref().unwrap_or("N/A")
    ));
    page.line(&format!(
        "Submitted: {}",
        form.submission_timestamp.as_deref().unwrap_or("N/A")
    ));
    page.gap(10.0);

    patient_section(&mut page, form);
    guardian_section(&mut page, "PRIMARY PARENT/GUARDIAN", &form.parent_guardian1);
    if let Some(guardian) = &form.parent_guardian2 {
        guardian_section(&mut page, "SECONDARY PARENT/GUARDIAN", guardian);
    }

    insurance_section(&mut page, "PRIMARY INSURANCE", &form.primary_insurance);
    page.card_image("Primary Insurance Card - Front", images.primary_front.as_ref());
    page.card_image("Primary Insurance Card - Back", images.primary_back.as_ref());

    if let Some(policy) = &form.secondary_insurance {
        insurance_section(&mut page, "SECONDARY INSURANCE", policy);
        page.card_image(
            "Secondary Insurance Card - Front",
            images.secondary_front.as_ref(),
        );
        page.card_image(
            "Secondary Insurance Card - Back",
            images.secondary_back.as_ref(),
        );
    }

    guarantor_section(&mut page, form);
    emergency_section(&mut page, "PRIMARY EMERGENCY CONTACT", &form.emergency_contact1);
    if let Some(contact) = &form.emergency_contact2 {
        emergency_section(&mut page, "SECONDARY EMERGENCY CONTACT", contact);
    }
    signatory_section(&mut page, form);
    consent_section(&mut page, form);

    // Footer
    page.gap(10.0);
    page.line_sized(
        "This form was submitted electronically and is HIPAA compliant.",
        8.0,
        false,
    );
    page.line_sized(
        "For questions, please contact Danville Pediatrics at (925) 362-1861.",
        8.0,
        false,
    );

    page.finish()
}

fn patient_section(page: &mut TranscriptWriter, form: &RegistrationForm) {
    let patient = &form.patient;
    page.section("PATIENT INFORMATION");
    page.line(&format!("Name: {}", form.patient_name()));
    page.line(&format!("Date of Birth: {}", patient.date_of_birth));
    page.line(&format!("Gender: {}", patient.gender.as_str()));
    if let Some(ssn) = nonblank(&patient.social_security_number) {
        page.line(&format!("SSN: {ssn}"));
    }
    page.line("Address:");
    page.line(&format!("  {}", patient.home_address.street));
    page.line(&format!(
        "  {}, {} {}",
        patient.home_address.city, patient.home_address.state, patient.home_address.zip_code
    ));
    if let Some(home) = nonblank(&patient.phone_numbers.home) {
        page.line(&format!("Home Phone: {home}"));
    }
    if let Some(cell) = nonblank(&patient.phone_numbers.cell) {
        page.line(&format!("Cell Phone: {cell}"));
    }
    if let Some(email) = nonblank(&patient.email) {
        page.line(&format!("Email: {email}"));
    }
}

fn guardian_section(
    page: &mut TranscriptWriter,
    title: &str,
    guardian: &intake_core::ParentGuardian,
) {
    page.section(title);
    page.line(&format!(
        "Name: {} {}",
        guardian.first_name, guardian.last_name
    ));
    page.line(&format!("Relationship: {}", guardian.relationship));
    page.line(&format!("Email: {}", guardian.email.trim()));
    page.line(&format!(
        "Primary Contact: {}",
        if guardian.is_primary_contact { "Yes" } else { "No" }
    ));
    if let Some(cell) = nonblank(&guardian.phone_numbers.cell) {
        page.line(&format!("Cell Phone: {cell}"));
    }
    if let Some(work) = nonblank(&guardian.phone_numbers.work) {
        page.line(&format!("Work Phone: {work}"));
    }
}

fn insurance_section(
    page: &mut TranscriptWriter,
    title: &str,
    policy: &intake_core::InsurancePolicy,
) {
    page.section(title);
    page.line(&format!("Company: {}", policy.company_name));
    page.line(&format!("Policy Number: {}", policy.policy_number));
    if let Some(group) = nonblank(&policy.group_number) {
        page.line(&format!("Group Number: {group}"));
    }
    page.line(&format!("Subscriber: {}", policy.subscriber_name));
    page.line(&format!(
        "Subscriber DOB: {}",
        policy.subscriber_date_of_birth
    ));
    page.line(&format!(
        "Subscriber Relationship: {}",
        policy.subscriber_relationship
    ));
}

fn guarantor_section(page: &mut TranscriptWriter, form: &RegistrationForm) {
    let guarantor = &form.guarantor;
    page.section("GUARANTOR INFORMATION");
    page.line(&format!(
        "Name: {} {}",
        guarantor.first_name, guarantor.last_name
    ));
    page.line(&format!(
        "Relationship to Patient: {}",
        guarantor.relationship_to_patient
    ));
    if let Some(ssn) = nonblank(&guarantor.social_security_number) {
        page.line(&format!("SSN: {ssn}"));
    }
    page.line(&format!("Phone: {}", guarantor.phone_number));
    page.line(&format!("Email: {}", guarantor.email.trim()));
    page.line("Address:");
    page.line(&format!("  {}", guarantor.address.street));
    page.line(&format!(
        "  {}, {} {}",
        guarantor.address.city, guarantor.address.state, guarantor.address.zip_code
    ));
    if let Some(employer) = &guarantor.employer {
        page.line("Employer Information:");
        page.line(&format!("  Name: {}", employer.name));
        page.line(&format!("  Address: {}", employer.address));
        if let Some(phone) = nonblank(&employer.phone_number) {
            page.line(&format!("  Phone: {phone}"));
        }
    }
}

fn emergency_section(
    page: &mut TranscriptWriter,
    title: &str,
    contact: &intake_core::EmergencyContact,
) {
    page.section(title);
    page.line(&format!("Name: {} {}", contact.first_name, contact.last_name));
    page.line(&format!("Relationship: {}", contact.relationship));
    if let Some(home) = nonblank(&contact.phone_numbers.home) {
        page.line(&format!("Home Phone: {home}"));
    }
    if let Some(cell) = nonblank(&contact.phone_numbers.cell) {
        page.line(&format!("Cell Phone: {cell}"));
    }
    if let Some(work) = nonblank(&contact.phone_numbers.work) {
        page.line(&format!("Work Phone: {work}"));
    }
}

fn signatory_section(page: &mut TranscriptWriter, form: &RegistrationForm) {
    let signatory = &form.consent_signatory;
    page.section("CONSENT SIGNATORY");
    page.line(&format!("Name: {}", signatory.signatory_name));
    page.line(&format!(
        "Relationship to Patient: {}",
        signatory.relationship_to_patient
    ));
    page.line(&format!("Date of Birth: {}", signatory.signatory_date_of_birth));
    page.line(&format!(
        "Electronic Signature: {}",
        signatory.electronic_signature
    ));
    page.line(&format!("Date Signed: {}", signatory.date_signed));
}

fn consent_section(page: &mut TranscriptWriter, form: &RegistrationForm) {
    page.section("CONSENTS AND AGREEMENTS");
    page.line(&format!(
        "Consent to Treatment: {}",
        if form.consent_to_treatment { "AGREED" } else { "NOT AGREED" }
    ));
    page.line(&format!(
        "HIPAA Acknowledgment: {}",
        if form.hipaa_acknowledgment { "ACKNOWLEDGED" } else { "NOT ACKNOWLEDGED" }
    ));
    page.line(&format!(
        "Financial Policy Agreement: {}",
        if form.financial_policy_agreement { "AGREED" } else { "NOT AGREED" }
    ));
}

fn nonblank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Top-down write cursor over a growing PDF document
struct TranscriptWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    font: IndirectFontRef,
    bold: IndirectFontRef,
    y: f32,
}

impl TranscriptWriter {
    fn new(title: &str) -> Result<Self, PdfError> {
        let (doc, page, layer) =
            PdfDocument::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
        let layer = doc.get_page(page).get_layer(layer);
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| PdfError::Build(e.to_string()))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| PdfError::Build(e.to_string()))?;
        Ok(Self {
            doc,
            layer,
            font,
            bold,
            y: PAGE_HEIGHT_MM - MARGIN_MM,
        })
    }

    /// Ensure at least `needed` millimetres remain above the bottom margin,
    /// starting a fresh page otherwise.
    fn reserve(&mut self, needed: f32) {
        if self.y - needed < BOTTOM_MM {
            let (page, layer) =
                self.doc
                    .add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT_MM - MARGIN_MM;
        }
    }

    fn line(&mut self, text: &str) {
        self.line_sized(text, 10.0, false);
    }

    fn line_sized(&mut self, text: &str, size: f32, bold: bool) {
        self.reserve(LINE_MM);
        let font = if bold { &self.bold } else { &self.font };
        self.layer
            .use_text(text, size, Mm(MARGIN_MM), Mm(self.y), font);
        self.y -= LINE_MM;
    }

    fn section(&mut self, title: &str) {
        self.gap(5.0);
        self.line_sized(title, 12.0, true);
        self.gap(2.0);
    }

    fn gap(&mut self, mm: f32) {
        self.y -= mm;
        // A gap landing below the margin just means the next reserve() breaks
        // the page.
    }

    /// Place a titled card photo, scaled to the text width with a fixed max
    /// height. Undecodable bytes fall back to a placeholder line.
    fn card_image(&mut self, title: &str, card: Option<&CardImage>) {
        let Some(card) = card else { return };

        let decoded = image_crate::load_from_memory(&card.bytes);
        let dynamic = match decoded {
            Ok(img) => img,
            Err(err) => {
                tracing::warn!(
                    title,
                    content_type = %card.content_type,
                    error = %err,
                    "Card image could not be decoded"
                );
                self.gap(5.0);
                self.line_sized(title, 12.0, true);
                self.line("(Image could not be displayed in PDF)");
                return;
            }
        };

        let (px_w, px_h) = dynamic.dimensions();
        // Native placement size at IMAGE_DPI, then scale to fit the text
        // column and the height cap.
        let native_w_mm = px_w as f32 * 25.4 / IMAGE_DPI;
        let native_h_mm = px_h as f32 * 25.4 / IMAGE_DPI;
        let max_w_mm = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;
        let scale = (max_w_mm / native_w_mm)
            .min(IMAGE_MAX_HEIGHT_MM / native_h_mm)
            .min(1.0);
        let placed_h_mm = native_h_mm * scale;

        self.gap(5.0);
        self.reserve(LINE_MM + placed_h_mm + 10.0);
        self.line_sized(title, 12.0, true);
        self.gap(4.0);

        let image = Image::from_dynamic_image(&dynamic);
        image.add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(MARGIN_MM)),
                translate_y: Some(Mm(self.y - placed_h_mm)),
                scale_x: Some(scale),
                scale_y: Some(scale),
                dpi: Some(IMAGE_DPI),
                ..Default::default()
            },
        );
        self.y -= placed_h_mm + 10.0;
    }

    fn finish(self) -> Result<Vec<u8>, PdfError> {
        let mut buf = BufWriter::new(Vec::new());
        self.doc
            .save(&mut buf)
            .map_err(|e| PdfError::Build(e.to_string()))?;
        buf.into_inner()
            .map_err(|e| PdfError::Write(e.into_error()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intake_core::registration::*;

    fn sample_form() -> RegistrationForm {
        let address = Address {
            street: "812 Sycamore Valley Rd".into(),
            city: "Danville".into(),
            state: "CA".into(),
            zip_code: "94526".into(),
        };
        RegistrationForm {
            patient: PatientInfo {
                first_name: "Riley".into(),
                last_name: "Morgan".into(),
                date_of_birth: "04-02-2019".into(),
                gender: Gender::Female,
                social_security_number: None,
                home_address: address.clone(),
                phone_numbers: PhoneNumbers {
                    cell: Some("(925) 555-0142".into()),
                    ..Default::default()
                },
                email: Some("riley@example.com".into()),
            },
            parent_guardian1: ParentGuardian {
                first_name: "Dana".into(),
                last_name: "Morgan".into(),
                relationship: "Mother".into(),
                phone_numbers: PhoneNumbers {
                    cell: Some("(925) 555-0142".into()),
                    ..Default::default()
                },
                email: "dana.morgan@example.com".into(),
                is_primary_contact: true,
            },
            parent_guardian2: None,
            primary_insurance: InsurancePolicy {
                is_primary: true,
                company_name: "Blue Shield of California".into(),
                policy_number: "XEA904416702".into(),
                group_number: Some("982200".into()),
                subscriber_name: "Dana Morgan".into(),
                subscriber_date_of_birth: "09-14-1988".into(),
                subscriber_relationship: "Parent".into(),
            },
            secondary_insurance: None,
            guarantor: Guarantor {
                first_name: "Dana".into(),
                last_name: "Morgan".into(),
                relationship_to_patient: "Mother".into(),
                social_security_number: Some("123-45-6789".into()),
                address,
                phone_number: "(925) 555-0142".into(),
                email: "dana.morgan@example.com".into(),
                employer: Some(Employer {
                    name: "Acme Corp".into(),
                    address: "1 Main St, San Ramon, CA".into(),
                    phone_number: None,
                }),
            },
            emergency_contact1: EmergencyContact {
                first_name: "Jo".into(),
                last_name: "Whitfield".into(),
                relationship: "Aunt".into(),
                phone_numbers: PhoneNumbers {
                    home: Some("(925) 555-0177".into()),
                    ..Default::default()
                },
            },
            emergency_contact2: None,
            consent_signatory: ConsentSignatory {
                signatory_name: "Dana Morgan".into(),
                signatory_date_of_birth: "09-14-1988".into(),
                relationship_to_patient: "Mother".into(),
                electronic_signature: "Dana Morgan".into(),
                date_signed: "08-01-2026".into(),
            },
            consent_to_treatment: true,
            hipaa_acknowledgment: true,
            financial_policy_agreement: true,
            submission_id: Some("SUB_1_abc".into()),
            submission_timestamp: Some("2026-08-01T10:00:00Z".into()),
        }
    }

    #[test]
    fn renders_a_pdf_document() {
        let bytes = render_transcript(&sample_form(), &CardImages::default()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 500);
    }

    #[test]
    fn undecodable_card_image_degrades_to_placeholder() {
        let images = CardImages {
            primary_front: Some(CardImage {
                content_type: "image/jpeg".into(),
                bytes: b"definitely not a jpeg".to_vec(),
            }),
            ..Default::default()
        };
        let bytes = render_transcript(&sample_form(), &images).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn long_forms_overflow_onto_extra_pages() {
        let mut form = sample_form();
        form.parent_guardian2 = Some(form.parent_guardian1.clone());
        form.secondary_insurance = Some(InsurancePolicy {
            is_primary: false,
            ..form.primary_insurance.clone()
        });
        form.emergency_contact2 = Some(form.emergency_contact1.clone());
        let bytes = render_transcript(&form, &CardImages::default()).unwrap();
        // Two pages show up as two /Type /Page objects
        let text = String::from_utf8_lossy(&bytes);
        assert!(bytes.starts_with(b"%PDF"));
        assert!(text.contains("Pages"));
    }
}
