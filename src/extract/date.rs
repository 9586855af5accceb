use chrono::{Days, NaiveDate};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// dd/mm/yyyy, dd-mm-yy (either separator, 2- or 4-digit year) or ISO yyyy-mm-dd.
static DATE_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(?:(?P<iso_y>\d{4})-(?P<iso_m>\d{1,2})-(?P<iso_d>\d{1,2})|(?P<d>\d{1,2})[/-](?P<m>\d{1,2})[/-](?P<y>\d{4}|\d{2}))\b",
    )
    .expect("date token regex")
});

static RELATIVE_DAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(day after tomorrow|today|tomorrow)\b").expect("relative day regex")
});

/// Dates found in an utterance, in order of appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateScan {
    pub dates: Vec<NaiveDate>,
    /// Tokens shaped like a date that are not a real calendar day.
    pub unreadable: Vec<String>,
}

impl DateScan {
    /// `(from, to)`: none for no dates, the same day twice for one,
    /// the first two otherwise. Ordering is not checked here.
    pub fn range(&self) -> (Option<NaiveDate>, Option<NaiveDate>) {
        match self.dates.as_slice() {
            [] => (None, None),
            [only] => (Some(*only), Some(*only)),
            [from, to, ..] => (Some(*from), Some(*to)),
        }
    }
}

pub fn extract_dates(text: &str, today: NaiveDate) -> DateScan {
    let mut found: Vec<(usize, Result<NaiveDate, String>)> = Vec::new();

    for m in RELATIVE_DAY.find_iter(text) {
        let offset = match m.as_str().to_lowercase().as_str() {
            "today" => 0,
            "tomorrow" => 1,
            _ => 2,
        };
        let date = today
            .checked_add_days(Days::new(offset))
            .ok_or_else(|| m.as_str().to_string());
        found.push((m.start(), date));
    }

    for caps in DATE_TOKEN.captures_iter(text) {
        if let Some(whole) = caps.get(0) {
            let date = parse_token(&caps).ok_or_else(|| whole.as_str().to_string());
            found.push((whole.start(), date));
        }
    }

    found.sort_by_key(|(pos, _)| *pos);

    let mut scan = DateScan::default();
    for (_, date) in found {
        match date {
            Ok(d) => scan.dates.push(d),
            Err(token) => scan.unreadable.push(token),
        }
    }
    scan
}

fn parse_token(caps: &Captures) -> Option<NaiveDate> {
    let num = |name: &str| caps.name(name).and_then(|m| m.as_str().parse::<u32>().ok());

    if let (Some(y), Some(m), Some(d)) = (num("iso_y"), num("iso_m"), num("iso_d")) {
        return NaiveDate::from_ymd_opt(y as i32, m, d);
    }

    let year_token = caps.name("y")?.as_str();
    let mut year = year_token.parse::<i32>().ok()?;
    if year_token.len() == 2 {
        year += 2000;
    }
    NaiveDate::from_ymd_opt(year, num("m")?, num("d")?)
}
