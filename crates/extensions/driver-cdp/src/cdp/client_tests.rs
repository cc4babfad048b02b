use super::*;

#[tokio::test]
async fn test_connect_without_chrome_is_not_available() {
    // Nothing listens on port 9 (discard) on a test host.
    let err = CdpClient::connect("http://127.0.0.1:9/")
        .await
        .err()
        .unwrap();
    assert!(matches!(err, CdpError::ChromeNotAvailable(msg) if msg.starts_with("http://127.0.0.1:9/")));
}
