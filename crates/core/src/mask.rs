//! Masking helpers for log output.
//!
//! Audit lines must never carry a full SSN, policy number, or email address.

/// Last `n` characters of a string, or `None` if it has fewer. Counts chars,
/// not bytes, so multibyte input never splits mid-character.
fn last_chars(value: &str, n: usize) -> Option<&str> {
    let count = value.chars().count();
    if count < n {
        return None;
    }
    let start = value
        .char_indices()
        .nth(count - n)
        .map(|(i, _)| i)
        .unwrap_or(0);
    Some(&value[start..])
}

/// `123-45-6789` becomes `XXX-XX-6789`. Anything too short is fully masked.
pub fn mask_ssn(ssn: &str) -> String {
    match last_chars(ssn, 4) {
        Some(tail) => format!("XXX-XX-{tail}"),
        None => "XXX-XX-XXXX".to_string(),
    }
}

/// Keep only the last four characters of a policy number
pub fn mask_policy_number(policy: &str) -> String {
    if policy.chars().count() > 4 {
        match last_chars(policy, 4) {
            Some(tail) => format!("XXXX-{tail}"),
            None => policy.to_string(),
        }
    } else {
        policy.to_string()
    }
}

/// `jane.doe@example.com` becomes `jaXXX@example.com`
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((user, domain)) => {
            let keep: String = user.chars().take(2).collect();
            format!("{keep}XXX@{domain}")
        }
        None => "XXX".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_ssn_to_last_four() {
        assert_eq!(mask_ssn("123-45-6789"), "XXX-XX-6789");
        assert_eq!(mask_ssn("89"), "XXX-XX-XXXX");
    }

    #[test]
    fn masks_policy_number() {
        assert_eq!(mask_policy_number("POL123456"), "XXXX-3456");
        assert_eq!(mask_policy_number("1234"), "1234");
    }

    #[test]
    fn multibyte_input_never_splits_a_character() {
        // Each '€' is three bytes; byte-offset slicing would panic here
        assert_eq!(mask_policy_number("€€"), "€€");
        assert_eq!(mask_policy_number("Plan-€-98765"), "XXXX-8765");
        assert_eq!(mask_ssn("€€"), "XXX-XX-XXXX");
        assert_eq!(mask_ssn("€€€-€€-€€€€"), "XXX-XX-€€€€");
    }

    #[test]
    fn masks_email_local_part() {
        assert_eq!(mask_email("jane.doe@example.com"), "jaXXX@example.com");
        assert_eq!(mask_email("not-an-email"), "XXX");
    }
}
