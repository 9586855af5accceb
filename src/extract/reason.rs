use once_cell::sync::Lazy;
use regex::Regex;

static REASON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)\b(?:because|reason\s+is|reason)\b[\s:,-]*(?P<reason>.+)").expect("reason regex")
});

/// Text after the first "because" / "reason is" / "reason" anchor.
pub fn extract_reason(text: &str) -> Option<String> {
    let caps = REASON.captures(text)?;
    let reason = caps.name("reason")?.as_str().trim().trim_end_matches('.').trim_end();
    (!reason.is_empty()).then(|| reason.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_remainder_after_anchor() {
        assert_eq!(
            extract_reason("casual leave from 20/08/2025 to 22/08/2025 because of a family function"),
            Some("of a family function".to_string())
        );
        assert_eq!(
            extract_reason("The reason is my sister's wedding."),
            Some("my sister's wedding".to_string())
        );
        assert_eq!(extract_reason("Reason: fever"), Some("fever".to_string()));
    }

    #[test]
    fn no_anchor_or_empty_remainder_is_no_reason() {
        assert_eq!(extract_reason("sick leave tomorrow"), None);
        assert_eq!(extract_reason("because"), None);
        assert_eq!(extract_reason("because ..."), None);
        assert_eq!(extract_reason("for reasons unknown"), None);
    }
}
