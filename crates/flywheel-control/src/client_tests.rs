use super::*;

fn strings(args: &[&str]) -> Vec<String> {
    args.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_parse_reads() {
    assert_eq!(
        ControlRequest::parse("log-level", &[]).unwrap(),
        ControlRequest::GetLogLevel
    );
    assert_eq!(
        ControlRequest::parse("log_level", &[]).unwrap(),
        ControlRequest::GetLogLevel
    );
    assert_eq!(
        ControlRequest::parse("paused", &[]).unwrap(),
        ControlRequest::GetPaused
    );
    assert_eq!(
        ControlRequest::parse("is-paused", &[]).unwrap(),
        ControlRequest::GetPaused
    );
    assert_eq!(
        ControlRequest::parse("stats", &[]).unwrap(),
        ControlRequest::GetStats
    );
}

#[test]
fn test_parse_mutations() {
    assert_eq!(
        ControlRequest::parse("set-log-level", &strings(&["debug"])).unwrap(),
        ControlRequest::SetLogLevel("debug".to_string())
    );
    assert_eq!(
        ControlRequest::parse("set-delay", &strings(&["5"])).unwrap(),
        ControlRequest::SetDelay(5)
    );
    assert_eq!(
        ControlRequest::parse("pause", &[]).unwrap(),
        ControlRequest::Pause
    );
    assert_eq!(
        ControlRequest::parse("resume", &[]).unwrap(),
        ControlRequest::Resume
    );
    assert_eq!(
        ControlRequest::parse("start-debugger", &[]).unwrap(),
        ControlRequest::StartDebugger
    );
}

#[test]
fn test_parse_quit_and_stop_are_equivalent() {
    assert_eq!(
        ControlRequest::parse("quit", &[]).unwrap(),
        ControlRequest::Quit
    );
    assert_eq!(
        ControlRequest::parse("stop", &[]).unwrap(),
        ControlRequest::Quit
    );
}

#[test]
fn test_parse_custom_event() {
    assert_eq!(
        ControlRequest::parse("event", &strings(&["reindex"])).unwrap(),
        ControlRequest::Custom {
            event_type: "reindex".to_string(),
            payload: None,
        }
    );
    assert_eq!(
        ControlRequest::parse("event", &strings(&["reindex", r#"{"shard": 3}"#])).unwrap(),
        ControlRequest::Custom {
            event_type: "reindex".to_string(),
            payload: Some(serde_json::json!({"shard": 3})),
        }
    );
}

#[test]
fn test_parse_rejects_bad_arguments() {
    assert!(matches!(
        ControlRequest::parse("set-delay", &[]),
        Err(ControlError::BadArguments { .. })
    ));
    assert!(matches!(
        ControlRequest::parse("set-delay", &strings(&["soon"])),
        Err(ControlError::BadArguments { .. })
    ));
    assert!(matches!(
        ControlRequest::parse("set-log-level", &[]),
        Err(ControlError::BadArguments { .. })
    ));
    assert!(matches!(
        ControlRequest::parse("pause", &strings(&["now"])),
        Err(ControlError::BadArguments { .. })
    ));
    assert!(matches!(
        ControlRequest::parse("event", &strings(&["reindex", "not json"])),
        Err(ControlError::BadArguments { .. })
    ));
}

#[test]
fn test_parse_rejects_unknown_operation() {
    assert!(matches!(
        ControlRequest::parse("self-destruct", &[]),
        Err(ControlError::UnknownOperation(op)) if op == "self-destruct"
    ));
}

#[test]
fn test_client_base_url() {
    let client = ControlClient::new("localhost", 7249);
    assert_eq!(client.base_url(), "http://localhost:7249");
    assert_eq!(
        client.url("/v1/control/stats"),
        "http://localhost:7249/v1/control/stats"
    );
}
