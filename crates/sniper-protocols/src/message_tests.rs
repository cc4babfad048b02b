
    use super::*;
    use serde_json::json;

    #[test]
    fn test_start_request_deserialize() {
        let value = json!({
            "type": "START_CAPTURE",
            "tabId": "ABC123",
            "filter": "frete",
            "schedule": "14:30:00"
        });
        let request = Request::from_value(value).unwrap();
        assert_eq!(
            request,
            Request::StartCapture {
                tab_id: TabId::from("ABC123"),
                filter: "frete".to_string(),
                schedule: Some("14:30:00".to_string()),
            }
        );
    }

    #[test]
    fn test_start_request_defaults() {
        let value = json!({"type": "START_CAPTURE", "tabId": "t"});
        let request = Request::from_value(value).unwrap();
        match request {
            Request::StartCapture { filter, schedule, .. } => {
                assert!(filter.is_empty());
                assert!(schedule.is_none());
            }
            other => panic!("unexpected request: {:?}", other),
        }
    }

    #[test]
    fn test_pause_and_cancel_requests() {
        let pause = Request::from_value(json!({"type": "PAUSE_CAPTURE", "minutes": 5})).unwrap();
        assert_eq!(pause, Request::PauseCapture { minutes: Some(5) });

        let cancel = Request::from_value(json!({"type": "CANCEL_CAPTURE"})).unwrap();
        assert_eq!(cancel, Request::CancelCapture);
        assert_eq!(cancel.name(), "CANCEL_CAPTURE");
    }

    #[test]
    fn test_unknown_request_type_is_unsupported() {
        let err = Request::from_value(json!({"type": "LAUNCH_ROCKET"})).unwrap_err();
        assert!(matches!(err, CaptureError::UnsupportedMessage(ref t) if t == "LAUNCH_ROCKET"));

        let err = Request::from_value(json!({"no_type": true})).unwrap_err();
        assert!(matches!(err, CaptureError::UnsupportedMessage(_)));
    }

    #[test]
    fn test_known_type_with_bad_payload_is_invalid() {
        let err = Request::from_value(json!({"type": "START_CAPTURE"})).unwrap_err();
        assert!(matches!(err, CaptureError::InvalidRequest(_)));
    }

    #[test]
    fn test_failure_response_carries_code() {
        let response = Response::failure(&CaptureError::NoActiveRun);
        assert!(!response.ok);
        assert_eq!(response.code.as_deref(), Some("no_active_run"));

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["ok"], false);
        assert!(value.get("state").is_none());
    }

    #[test]
    fn test_idle_snapshot_serializes_null_state() {
        let value = serde_json::to_value(Response::snapshot(None)).unwrap();
        assert_eq!(value["ok"], true);
        assert!(value["state"].is_null());
        assert!(value.get("error").is_none());
    }

    #[test]
    fn test_report_wire_format() {
        let report = Report::new(
            RunId::from("r1"),
            ReportKind::Done {
                total: 3,
                next_url: Some("https://x/cupons?page=2".to_string()),
            },
        );
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["type"], "DONE");
        assert_eq!(value["runId"], "r1");
        assert_eq!(value["total"], 3);
        assert_eq!(value["nextUrl"], "https://x/cupons?page=2");
    }

    #[test]
    fn test_report_deserialize() {
        let json = r#"{"type":"COUPON_OK","runId":"r9","name":"10% OFF"}"#;
        let report: Report = serde_json::from_str(json).unwrap();
        assert_eq!(report.run_id, RunId::from("r9"));
        assert_eq!(
            report.kind,
            ReportKind::CouponOk {
                name: "10% OFF".to_string()
            }
        );
    }
