//! Read-only backend queries with their light post-filtering.

use chrono::{Datelike, NaiveDate};
use serde_json::{Value, json};

use crate::extract::month::month_abbreviation;
use crate::gateway::{BackendFailure, CallContext, Endpoint, HrBackend};
use crate::model::leave_type::LeaveType;
use crate::models::Envelope;

const LIST_KEYS: &[&str] = &["Data", "Table", "Result", "Records", "List"];
const LEAVE_NAME_KEYS: &[&str] = &["LeaveName", "LeaveType", "LeaveTypeName", "Name"];
const LEAVE_ID_KEYS: &[&str] = &["LeaveID", "LeaveTypeID"];
const BALANCE_KEYS: &[&str] = &["Balance", "BalanceDays", "Available", "Remaining", "ClosingBalance"];
const HOLIDAY_DATE_KEYS: &[&str] = &["FromDate", "HolidayDate", "Date"];
const HOLIDAY_NAME_KEYS: &[&str] = &["HolidayName", "Holiday", "Name", "Description"];
const PERIOD_ID_KEYS: &[&str] = &["PayrollPeriodID", "PeriodID", "ID"];
const PERIOD_NAME_KEYS: &[&str] = &["PayrollPeriodName", "PeriodName", "PayrollPeriod", "Name"];
const PERIOD_DATE_KEYS: &[&str] = &["FromDate", "StartDate"];

/// Records in a backend reply: a bare array, or an array under a known key.
pub fn records(value: &Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items.clone(),
        Value::Object(map) => map
            .iter()
            .find(|(k, v)| v.is_array() && LIST_KEYS.iter().any(|key| k.eq_ignore_ascii_case(key)))
            .and_then(|(_, v)| v.as_array().cloned())
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

fn field<'a>(record: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    let map = record.as_object()?;
    keys.iter().find_map(|key| {
        map.iter()
            .find(|(k, v)| k.eq_ignore_ascii_case(key) && !v.is_null())
            .map(|(_, v)| v)
    })
}

fn text_field(record: &Value, keys: &[&str]) -> Option<String> {
    match field(record, keys)? {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn number_field(record: &Value, keys: &[&str]) -> Option<f64> {
    match field(record, keys)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Dates as the backend renders them: ISO (optionally with time),
/// dd/mm/yyyy, dd-mm-yyyy or dd-Mon-yyyy.
pub fn parse_backend_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Some(iso) = raw.get(..10) {
        if let Ok(date) = NaiveDate::parse_from_str(iso, "%Y-%m-%d") {
            return Some(date);
        }
    }
    ["%d/%m/%Y", "%d-%m-%Y", "%d-%b-%Y", "%d %b %Y"]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
}

fn envelope_for(result: Result<Value, BackendFailure>) -> Result<Value, Envelope> {
    result.map_err(|failure| {
        Envelope::from(failure).with_message("Sorry, I couldn't reach the HR system right now. Please try again later.")
    })
}

fn matches_leave_type(record: &Value, leave_type: LeaveType) -> bool {
    if let Some(id) = number_field(record, LEAVE_ID_KEYS) {
        return LeaveType::from_id(id as u8) == Some(leave_type);
    }
    let keyword = leave_type.display_name().to_lowercase();
    let keyword = keyword.split_whitespace().next().unwrap_or_default().to_string();
    text_field(record, LEAVE_NAME_KEYS)
        .map(|name| name.to_lowercase().contains(&keyword))
        .unwrap_or(false)
}

pub async fn leave_balance(
    backend: &dyn HrBackend,
    ctx: &CallContext,
    only: Option<LeaveType>,
) -> Envelope {
    let value = match envelope_for(backend.call(ctx, Endpoint::GetLeaveBalance, json!({})).await) {
        Ok(value) => value,
        Err(envelope) => return envelope,
    };

    let balances: Vec<Value> = records(&value)
        .into_iter()
        .filter(|record| only.is_none_or(|leave_type| matches_leave_type(record, leave_type)))
        .collect();

    let summary: Vec<Value> = balances
        .iter()
        .filter_map(|record| {
            Some(json!({
                "leaveType": text_field(record, LEAVE_NAME_KEYS)?,
                "balance": number_field(record, BALANCE_KEYS)?,
            }))
        })
        .collect();

    let message = if summary.is_empty() {
        match only {
            Some(leave_type) => format!("I couldn't find a {leave_type} balance for you."),
            None => "I couldn't find any leave balance for you.".to_string(),
        }
    } else {
        let lines: Vec<String> = summary
            .iter()
            .map(|s| format!("{}: {} day(s)", s["leaveType"].as_str().unwrap_or_default(), s["balance"]))
            .collect();
        format!("Your leave balance: {}", lines.join(", "))
    };

    Envelope::success("Success")
        .with_message(message)
        .with("summary", summary)
        .with("data", balances)
}

pub async fn holidays(backend: &dyn HrBackend, ctx: &CallContext, today: NaiveDate) -> Envelope {
    let value = match envelope_for(
        backend
            .call(ctx, Endpoint::GetHolidayList, json!({ "Year": today.year() }))
            .await,
    ) {
        Ok(value) => value,
        Err(envelope) => return envelope,
    };

    let mut upcoming: Vec<(NaiveDate, Value)> = records(&value)
        .into_iter()
        .filter_map(|record| {
            let date = text_field(&record, HOLIDAY_DATE_KEYS).and_then(|raw| parse_backend_date(&raw))?;
            (date >= today).then_some((date, record))
        })
        .collect();
    upcoming.sort_by_key(|(date, _)| *date);

    let message = if upcoming.is_empty() {
        "There are no upcoming holidays.".to_string()
    } else {
        let lines: Vec<String> = upcoming
            .iter()
            .map(|(date, record)| {
                let name = text_field(record, HOLIDAY_NAME_KEYS).unwrap_or_else(|| "Holiday".to_string());
                format!("{name} ({})", date.format("%d/%m/%Y"))
            })
            .collect();
        format!("Upcoming holidays: {}", lines.join(", "))
    };

    let data: Vec<Value> = upcoming.into_iter().map(|(_, record)| record).collect();
    Envelope::success("Success").with_message(message).with("data", data)
}

pub async fn payroll_periods(backend: &dyn HrBackend, ctx: &CallContext) -> Result<Vec<Value>, Envelope> {
    let value = envelope_for(backend.call(ctx, Endpoint::GetPayrollPeriodList, json!({})).await)?;
    Ok(records(&value)
        .into_iter()
        .filter(|record| number_field(record, PERIOD_ID_KEYS).is_some())
        .collect())
}

fn period_id(record: &Value) -> i64 {
    number_field(record, PERIOD_ID_KEYS).map(|id| id as i64).unwrap_or_default()
}

/// Most recent period: highest `PayrollPeriodID`.
pub fn latest_period(periods: &[Value]) -> Option<&Value> {
    periods.iter().max_by_key(|record| period_id(record))
}

/// Most recent period whose name or start date falls in `month`.
pub fn period_for_month(periods: &[Value], month: u32) -> Option<&Value> {
    let abbreviation = month_abbreviation(month)?;
    periods
        .iter()
        .filter(|record| {
            let by_name = text_field(record, PERIOD_NAME_KEYS)
                .map(|name| name.to_lowercase().contains(abbreviation))
                .unwrap_or(false);
            let by_date = text_field(record, PERIOD_DATE_KEYS)
                .and_then(|raw| parse_backend_date(&raw))
                .map(|date| date.month() == month)
                .unwrap_or(false);
            by_name || by_date
        })
        .max_by_key(|record| period_id(record))
}

pub async fn salary_slip(backend: &dyn HrBackend, ctx: &CallContext, period: &Value) -> Envelope {
    let id = period_id(period);
    let name = text_field(period, PERIOD_NAME_KEYS).unwrap_or_else(|| format!("period {id}"));

    match envelope_for(
        backend
            .call(ctx, Endpoint::GetSalarySlip, json!({ "PayrollPeriodID": id }))
            .await,
    ) {
        Ok(slip) => Envelope::success("Success")
            .with_message(format!("Here is your payslip for {name}."))
            .with("payrollPeriod", period.clone())
            .with("data", slip),
        Err(envelope) => envelope,
    }
}

pub async fn latest_payslip(backend: &dyn HrBackend, ctx: &CallContext) -> Envelope {
    let periods = match payroll_periods(backend, ctx).await {
        Ok(periods) => periods,
        Err(envelope) => return envelope,
    };
    match latest_period(&periods) {
        Some(period) => salary_slip(backend, ctx, period).await,
        None => Envelope::success("No payroll periods").with_message("I couldn't find any payslips for you yet."),
    }
}

pub async fn payslip_for_month(backend: &dyn HrBackend, ctx: &CallContext, month: Option<u32>) -> Envelope {
    let Some(month) = month else {
        return Envelope::success("Month required")
            .with_message("Which month's payslip would you like? For example, \"payslip for March\".");
    };
    let periods = match payroll_periods(backend, ctx).await {
        Ok(periods) => periods,
        Err(envelope) => return envelope,
    };
    match period_for_month(&periods, month) {
        Some(period) => salary_slip(backend, ctx, period).await,
        None => Envelope::success("No payroll period for month")
            .with_message("I couldn't find a payslip for that month."),
    }
}

pub async fn leave_policy(backend: &dyn HrBackend, ctx: &CallContext) -> Envelope {
    match envelope_for(backend.call(ctx, Endpoint::GetLeavePolicy, json!({})).await) {
        Ok(policy) => Envelope::success("Success")
            .with_message("Here is the leave policy.")
            .with("data", policy),
        Err(envelope) => envelope,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::testing::{FakeBackend, context};
    use crate::models::codes;

    fn date(d: u32, m: u32, y: i32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn records_unwraps_known_list_keys() {
        assert_eq!(records(&json!([1, 2])).len(), 2);
        assert_eq!(records(&json!({"data": [1]})).len(), 1);
        assert_eq!(records(&json!({"Table": [1, 2, 3]})).len(), 3);
        assert!(records(&json!({"Message": "none"})).is_empty());
        assert!(records(&json!("text")).is_empty());
    }

    #[test]
    fn backend_dates_in_several_shapes() {
        assert_eq!(parse_backend_date("2026-10-20T00:00:00"), Some(date(20, 10, 2026)));
        assert_eq!(parse_backend_date("20/10/2026"), Some(date(20, 10, 2026)));
        assert_eq!(parse_backend_date("20-Oct-2026"), Some(date(20, 10, 2026)));
        assert_eq!(parse_backend_date("soon"), None);
    }

    #[tokio::test]
    async fn holidays_keep_only_today_onwards_in_date_order() {
        let backend = FakeBackend::default();
        backend.reply(Ok(json!([
            {"HolidayName": "Christmas", "FromDate": "25/12/2026"},
            {"HolidayName": "Independence Day", "FromDate": "15/08/2026"},
            {"HolidayName": "Diwali", "FromDate": "2026-11-08T00:00:00"},
            {"HolidayName": "Today", "FromDate": "14/10/2026"},
            {"HolidayName": "Unknown", "FromDate": "tbd"}
        ])));

        let envelope = holidays(&backend, &context(), date(14, 10, 2026)).await;
        assert!(envelope.is_success());
        let names: Vec<&str> = envelope.extra["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|h| h["HolidayName"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Today", "Diwali", "Christmas"]);

        let calls = backend.calls();
        assert_eq!(calls[0].0, Endpoint::GetHolidayList);
        assert_eq!(calls[0].1, json!({"Year": 2026}));
    }

    #[tokio::test]
    async fn typed_balance_is_filtered() {
        let backend = FakeBackend::default();
        backend.reply(Ok(json!({"Data": [
            {"LeaveName": "Casual Leave", "Balance": 4},
            {"LeaveName": "Sick Leave", "Balance": "6.5"}
        ]})));

        let envelope = leave_balance(&backend, &context(), Some(LeaveType::Sick)).await;
        let summary = envelope.extra["summary"].as_array().unwrap();
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0]["leaveType"], "Sick Leave");
        assert_eq!(summary[0]["balance"], 6.5);
    }

    #[tokio::test]
    async fn backend_failure_stays_an_envelope() {
        let backend = FakeBackend::default();
        backend.reply(Err(BackendFailure {
            code: codes::BACKEND_TIMEOUT,
            summary: "slow".into(),
            details: "timed out".into(),
        }));

        let envelope = leave_balance(&backend, &context(), None).await;
        assert_eq!(envelope.response_code, codes::BACKEND_TIMEOUT);
        assert!(envelope.message.is_some());
    }

    #[tokio::test]
    async fn latest_payslip_uses_highest_period_id() {
        let backend = FakeBackend::default();
        backend
            .reply(Ok(json!([
                {"PayrollPeriodID": 11, "PayrollPeriodName": "August 2026"},
                {"PayrollPeriodID": 12, "PayrollPeriodName": "September 2026"},
                {"PayrollPeriodID": 3, "PayrollPeriodName": "December 2025"}
            ])))
            .reply(Ok(json!({"NetPay": 1000})));

        let envelope = latest_payslip(&backend, &context()).await;
        assert!(envelope.is_success());
        assert_eq!(envelope.extra["data"]["NetPay"], 1000);

        let calls = backend.calls();
        assert_eq!(calls[1], (Endpoint::GetSalarySlip, json!({"PayrollPeriodID": 12})));
    }

    #[test]
    fn month_lookup_matches_name_or_start_date() {
        let periods = vec![
            json!({"PayrollPeriodID": 2, "PayrollPeriodName": "Mar-2025"}),
            json!({"PayrollPeriodID": 14, "PayrollPeriodName": "March 2026"}),
            json!({"PayrollPeriodID": 15, "PeriodName": "P15", "FromDate": "2026-04-01"}),
        ];
        assert_eq!(period_for_month(&periods, 3).map(period_id), Some(14));
        assert_eq!(period_for_month(&periods, 4).map(period_id), Some(15));
        assert!(period_for_month(&periods, 7).is_none());
    }

    #[tokio::test]
    async fn payslip_for_month_without_month_asks_for_one() {
        let backend = FakeBackend::default();
        let envelope = payslip_for_month(&backend, &context(), None).await;
        assert!(envelope.is_success());
        assert!(backend.calls().is_empty());
    }
}
