use chrono::NaiveDate;
use serde_json::{Value, json};

use crate::gateway::{BackendFailure, CallContext, Endpoint, HrBackend};
use crate::model::leave_application::LeaveApplication;

/// Date format the backend expects in every leave field.
pub const BACKEND_DATE_FORMAT: &str = "%d/%m/%Y";

pub fn backend_date(date: NaiveDate) -> String {
    date.format(BACKEND_DATE_FORMAT).to_string()
}

/// `Commonparam` for `SaveLeaveApplication`. The constant fields are required
/// by the backend schema even though they never vary.
pub fn submission_params(application: &LeaveApplication) -> Value {
    let from = backend_date(application.from_date);
    let to = backend_date(application.to_date);

    json!({
        "Mode": "save",
        "LeaveID": application.leave_type.id(),
        "Leavefrom": from,
        "Leaveto": to,
        "Offdaysfrom": from,
        "Offdaysto": to,
        "Noofleavedays": application.days,
        "Timemode": 1,
        "Reason": application.reason,
        "Holiday": 0,
        "Weekend": 0,
        "Daysleaveclubbing": 0,
        "LeavePolicyInstanceLimitID": 0,
        "Returndate": backend_date(application.return_date),
        "Approvalstatus": "P",
        "Firsthalf": 0,
        "Lasthalf": 0,
        "Roledeligation": 0,
        "Contactaddress": "",
        "Contactnumber": "",
        "Salaryadvance": 0,
        "IsNoticePeriod": 0,
        "Passportrequest": 0,
        "Roldleavetrantype": null,
        "Duallaps": 0,
        "Balancedaystofuture": 0
    })
}

pub async fn submit_leave(
    backend: &dyn HrBackend,
    ctx: &CallContext,
    application: &LeaveApplication,
) -> Result<Value, BackendFailure> {
    backend
        .call(ctx, Endpoint::SaveLeaveApplication, submission_params(application))
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::HrGateway;
    use crate::model::leave_type::LeaveType;
    use serde_json::Map;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn application() -> LeaveApplication {
        LeaveApplication {
            leave_type: LeaveType::Casual,
            from_date: NaiveDate::from_ymd_opt(2025, 8, 20).unwrap(),
            to_date: NaiveDate::from_ymd_opt(2025, 8, 22).unwrap(),
            reason: "of a family function".into(),
            days: 3,
            return_date: NaiveDate::from_ymd_opt(2025, 8, 23).unwrap(),
        }
    }

    #[test]
    fn fixed_fields_are_always_present() {
        let params = submission_params(&application());
        for field in [
            "Holiday",
            "Weekend",
            "Daysleaveclubbing",
            "LeavePolicyInstanceLimitID",
            "Firsthalf",
            "Lasthalf",
            "Roledeligation",
            "Contactaddress",
            "Contactnumber",
            "Salaryadvance",
            "IsNoticePeriod",
            "Passportrequest",
            "Roldleavetrantype",
            "Duallaps",
            "Balancedaystofuture",
        ] {
            assert!(params.get(field).is_some(), "missing {field}");
        }
        assert_eq!(params["Mode"], "save");
        assert_eq!(params["Approvalstatus"], "P");
        assert!(params["Roldleavetrantype"].is_null());
    }

    #[test]
    fn dates_are_day_month_year() {
        let params = submission_params(&application());
        assert_eq!(params["LeaveID"], 1);
        assert_eq!(params["Leavefrom"], "20/08/2025");
        assert_eq!(params["Leaveto"], "22/08/2025");
        assert_eq!(params["Offdaysfrom"], "20/08/2025");
        assert_eq!(params["Offdaysto"], "22/08/2025");
        assert_eq!(params["Noofleavedays"], 3);
        assert_eq!(params["Returndate"], "23/08/2025");
    }

    #[test]
    fn collected_reason_is_submitted_not_a_placeholder() {
        let params = submission_params(&application());
        assert_eq!(params["Reason"], "of a family function");
        assert_ne!(params["Reason"], "Medical leave");
    }

    #[tokio::test]
    async fn submission_hits_save_endpoint_with_merged_params() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/AjaxAPI/SaveLeaveApplication"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Message": "Saved"})))
            .expect(1)
            .mount(&server)
            .await;

        let mut params = Map::new();
        params.insert("Domain".into(), json!(server.uri()));
        params.insert("EmployeeID".into(), json!(88));
        let ctx = CallContext::resolve(Map::new(), params, "/api/AjaxAPI").unwrap();
        let gateway = HrGateway::new(Duration::from_secs(2), Duration::from_secs(2)).unwrap();

        let reply = submit_leave(&gateway, &ctx, &application()).await.unwrap();
        assert_eq!(reply["Message"], "Saved");

        let requests = server.received_requests().await.unwrap();
        let common: Value = requests[0]
            .url
            .query_pairs()
            .find(|(k, _)| k == "Commonparam")
            .map(|(_, v)| serde_json::from_str(&v).unwrap())
            .unwrap();
        assert_eq!(common["EmployeeID"], 88);
        assert_eq!(common["Mode"], "save");
        assert_eq!(common["Reason"], "of a family function");
    }
}
