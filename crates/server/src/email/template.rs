//! Literal HTML and plain-text email bodies for the practice inbox.

use intake_core::RegistrationForm;

fn yes_no(value: bool) -> &'static str {
    if value { "Yes" } else { "No" }
}

fn best_guardian_phone(form: &RegistrationForm) -> &str {
    let phones = &form.parent_guardian1.phone_numbers;
    phones
        .cell
        .as_deref()
        .or(phones.work.as_deref())
        .or(phones.home.as_deref())
        .filter(|p| !p.trim().is_empty())
        .unwrap_or("Not provided")
}

/// Minimal escaping for values interpolated into the HTML body
fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub fn build_html_body(form: &RegistrationForm, submission_id: &str) -> String {
    let patient = &form.patient;
    let guardian = &form.parent_guardian1;
    let insurance = &form.primary_insurance;
    let contact = &form.emergency_contact1;
    let submitted = form.submission_timestamp.as_deref().unwrap_or("N/A");

    let ssn_row = match &patient.social_security_number {
        Some(ssn) if !ssn.trim().is_empty() => format!(
            "<p><span class=\"label\">SSN:</span> {}</p>",
            escape_html(ssn)
        ),
        _ => String::new(),
    };
    let secondary_row = match &form.secondary_insurance {
        Some(s) => format!(
            "<p><span class=\"label\">Secondary Insurance:</span> {}</p>",
            escape_html(&s.company_name)
        ),
        None => String::new(),
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>New Patient Registration</title>
  <style>
    body {{ font-family: Arial, sans-serif; line-height: 1.6; color: #333; }}
    .header {{ background-color: #f8f9fa; padding: 20px; border-radius: 5px; margin-bottom: 20px; }}
    .section {{ margin-bottom: 20px; }}
    .label {{ font-weight: bold; color: #555; }}
    .footer {{ background-color: #e9ecef; padding: 15px; border-radius: 5px; margin-top: 30px; font-size: 12px; }}
  </style>
</head>
<body>
  <div class="header">
    <h1>New Patient Registration - Danville Pediatrics</h1>
    <p><strong>Submission ID:</strong> {submission_id}</p>
    <p><strong>Submitted:</strong> {submitted}</p>
  </div>

  <div class="section">
    <h2>Patient Information</h2>
    <p><span class="label">Name:</span> {patient_name}</p>
    <p><span class="label">Date of Birth:</span> {patient_dob}</p>
    <p><span class="label">Gender:</span> {gender}</p>
    {ssn_row}
  </div>

  <div class="section">
    <h2>Primary Parent/Guardian</h2>
    <p><span class="label">Name:</span> {guardian_name}</p>
    <p><span class="label">Email:</span> {guardian_email}</p>
    <p><span class="label">Relationship:</span> {guardian_relationship}</p>
    <p><span class="label">Primary Contact:</span> {guardian_primary}</p>
  </div>

  <div class="section">
    <h2>Insurance Information</h2>
    <p><span class="label">Primary Insurance:</span> {insurance_company}</p>
    <p><span class="label">Policy Number:</span> {policy_number}</p>
    <p><span class="label">Subscriber:</span> {subscriber}</p>
    {secondary_row}
  </div>

  <div class="section">
    <h2>Emergency Contact</h2>
    <p><span class="label">Name:</span> {contact_name}</p>
    <p><span class="label">Relationship:</span> {contact_relationship}</p>
  </div>

  <div class="section">
    <h2>Consents</h2>
    <p><span class="label">Consent to Treatment:</span> {consent_treatment}</p>
    <p><span class="label">HIPAA Acknowledgment:</span> {consent_hipaa}</p>
    <p><span class="label">Financial Policy:</span> {consent_financial}</p>
  </div>

  <div class="footer">
    <p><strong>Next Steps:</strong></p>
    <ul>
      <li>Review the attached PDF with complete registration details</li>
      <li>Contact the parent/guardian to schedule the first appointment</li>
      <li>Verify insurance information if needed</li>
      <li>Add patient to practice management system</li>
    </ul>
    <p><strong>Contact Information:</strong><br>
    Primary Contact: {guardian_email}<br>
    Phone: {guardian_phone}</p>
  </div>
</body>
</html>
"#,
        submission_id = escape_html(submission_id),
        submitted = escape_html(submitted),
        patient_name = escape_html(&form.patient_name()),
        patient_dob = escape_html(&patient.date_of_birth),
        gender = patient.gender.as_str(),
        ssn_row = ssn_row,
        guardian_name = escape_html(&format!("{} {}", guardian.first_name, guardian.last_name)),
        guardian_email = escape_html(guardian.email.trim()),
        guardian_relationship = escape_html(&guardian.relationship),
        guardian_primary = yes_no(guardian.is_primary_contact),
        insurance_company = escape_html(&insurance.company_name),
        policy_number = escape_html(&insurance.policy_number),
        subscriber = escape_html(&insurance.subscriber_name),
        secondary_row = secondary_row,
        contact_name = escape_html(&format!("{} {}", contact.first_name, contact.last_name)),
        contact_relationship = escape_html(&contact.relationship),
        consent_treatment = if form.consent_to_treatment { "&#10003; Agreed" } else { "&#10007; Not Agreed" },
        consent_hipaa = if form.hipaa_acknowledgment { "&#10003; Acknowledged" } else { "&#10007; Not Acknowledged" },
        consent_financial = if form.financial_policy_agreement { "&#10003; Agreed" } else { "&#10007; Not Agreed" },
        guardian_phone = escape_html(best_guardian_phone(form)),
    )
}

pub fn build_text_body(form: &RegistrationForm, submission_id: &str) -> String {
    let patient = &form.patient;
    let guardian = &form.parent_guardian1;
    let insurance = &form.primary_insurance;
    let contact = &form.emergency_contact1;
    let submitted = form.submission_timestamp.as_deref().unwrap_or("N/A");

    let mut body = String::new();
    body.push_str("NEW PATIENT REGISTRATION - DANVILLE PEDIATRICS\n\n");
    body.push_str(&format!("Submission ID: {submission_id}\n"));
    body.push_str(&format!("Submitted: {submitted}\n\n"));

    body.push_str("PATIENT INFORMATION\n");
    body.push_str(&format!("Name: {}\n", form.patient_name()));
    body.push_str(&format!("Date of Birth: {}\n", patient.date_of_birth));
    body.push_str(&format!("Gender: {}\n", patient.gender.as_str()));
    if let Some(ssn) = patient
        .social_security_number
        .as_deref()
        .filter(|s| !s.trim().is_empty())
    {
        body.push_str(&format!("SSN: {ssn}\n"));
    }

    body.push_str("\nPRIMARY PARENT/GUARDIAN\n");
    body.push_str(&format!(
        "Name: {} {}\n",
        guardian.first_name, guardian.last_name
    ));
    body.push_str(&format!("Email: {}\n", guardian.email.trim()));
    body.push_str(&format!("Relationship: {}\n", guardian.relationship));
    body.push_str(&format!(
        "Primary Contact: {}\n",
        yes_no(guardian.is_primary_contact)
    ));

    body.push_str("\nINSURANCE INFORMATION\n");
    body.push_str(&format!("Primary Insurance: {}\n", insurance.company_name));
    body.push_str(&format!("Policy Number: {}\n", insurance.policy_number));
    body.push_str(&format!("Subscriber: {}\n", insurance.subscriber_name));
    if let Some(secondary) = &form.secondary_insurance {
        body.push_str(&format!("Secondary Insurance: {}\n", secondary.company_name));
    }

    body.push_str("\nEMERGENCY CONTACT\n");
    body.push_str(&format!(
        "Name: {} {}\n",
        contact.first_name, contact.last_name
    ));
    body.push_str(&format!("Relationship: {}\n", contact.relationship));

    body.push_str("\nCONSENTS\n");
    body.push_str(&format!(
        "Consent to Treatment: {}\n",
        if form.consent_to_treatment { "AGREED" } else { "NOT AGREED" }
    ));
    body.push_str(&format!(
        "HIPAA Acknowledgment: {}\n",
        if form.hipaa_acknowledgment { "ACKNOWLEDGED" } else { "NOT ACKNOWLEDGED" }
    ));
    body.push_str(&format!(
        "Financial Policy: {}\n",
        if form.financial_policy_agreement { "AGREED" } else { "NOT AGREED" }
    ));

    body.push_str("\nNEXT STEPS:\n");
    body.push_str("- Review the attached PDF with complete registration details\n");
    body.push_str("- Contact the parent/guardian to schedule the first appointment\n");
    body.push_str("- Verify insurance information if needed\n");
    body.push_str("- Add patient to practice management system\n");

    body.push_str("\nContact Information:\n");
    body.push_str(&format!("Primary Contact: {}\n", guardian.email.trim()));
    body.push_str(&format!("Phone: {}\n", best_guardian_phone(form)));

    body.push_str(
        "\nThis registration was submitted securely through the Danville Pediatrics \
         HIPAA-compliant online form.\n",
    );
    body
}
