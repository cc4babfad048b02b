use super::*;

#[test]
fn test_cdp_request_serialize() {
    let req = CdpRequest {
        id: 1,
        method: "Page.navigate".to_string(),
        params: Some(serde_json::json!({"url": "https://www.mercadolivre.com.br/cupons"})),
        session_id: Some("S1".to_string()),
    };
    let json = serde_json::to_string(&req).unwrap();
    assert!(json.contains("Page.navigate"));
    assert!(json.contains("\"sessionId\":\"S1\""));
}

#[test]
fn test_cdp_event_deserialize() {
    let json = r#"{"method": "Page.loadEventFired", "params": {"timestamp": 1.5}, "sessionId": "S1"}"#;
    let resp: CdpResponse = serde_json::from_str(json).unwrap();
    assert_eq!(resp.id, None);
    assert_eq!(resp.method.as_deref(), Some("Page.loadEventFired"));
    assert_eq!(resp.session_id.as_deref(), Some("S1"));
}

#[test]
fn test_frame_navigated_main_frame() {
    let json = r##"{"frame": {"id": "F1", "loaderId": "L1", "url": "https://www.mercadolivre.com.br/cupons", "urlFragment": "#top", "securityOrigin": "x", "mimeType": "text/html"}}"##;
    let event: FrameNavigated = serde_json::from_str(json).unwrap();
    assert!(event.frame.is_main());
    assert_eq!(event.frame.full_url(), "https://www.mercadolivre.com.br/cupons#top");
}

#[test]
fn test_frame_navigated_child_frame() {
    let json = r#"{"frame": {"id": "F2", "parentId": "F1", "url": "https://ads.example.com/"}}"#;
    let event: FrameNavigated = serde_json::from_str(json).unwrap();
    assert!(!event.frame.is_main());
}

#[test]
fn test_page_info_deserialize() {
    let json = r#"{
        "id": "page123",
        "type": "page",
        "title": "Cupons",
        "url": "https://www.mercadolivre.com.br/cupons",
        "webSocketDebuggerUrl": "ws://localhost:9222/devtools/page/page123"
    }"#;
    let info: PageInfo = serde_json::from_str(json).unwrap();
    assert_eq!(info.id, "page123");
    assert_eq!(info.page_type, "page");
}
