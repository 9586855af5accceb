use once_cell::sync::Lazy;
use regex::Regex;

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

static MONTH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\b",
    )
    .expect("month regex")
});

/// Month number (1-12) named in the utterance. The last mention wins,
/// so "may I get the payslip for june" yields June.
pub fn extract_month(text: &str) -> Option<u32> {
    let word = MONTH.find_iter(text).last()?.as_str().to_lowercase();
    MONTH_ABBREVIATIONS
        .iter()
        .position(|abbr| word.starts_with(abbr))
        .map(|idx| idx as u32 + 1)
}

pub fn month_abbreviation(month: u32) -> Option<&'static str> {
    MONTH_ABBREVIATIONS.get(month.checked_sub(1)? as usize).copied()
}
