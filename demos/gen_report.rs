//! Generate a forecast report for validation testing

fn main() {
    let events_json = r#"[
        { "schema_version": "care.event.v1", "activity": { "type": "feeding", "method": "bottle" }, "recorded_at": "2024-03-01T01:00:00Z", "amount_ml": 95.0 },
        { "schema_version": "care.event.v1", "activity": { "type": "feeding", "method": "bottle" }, "recorded_at": "2024-03-01T03:30:00Z", "amount_ml": 110.0 },
        { "schema_version": "care.event.v1", "activity": { "type": "diaper", "kind": "wet" }, "recorded_at": "2024-03-01T01:40:00Z" },
        { "schema_version": "care.event.v1", "activity": { "type": "diaper", "kind": "both" }, "recorded_at": "2024-03-01T04:15:00Z" },
        { "schema_version": "care.event.v1", "activity": { "type": "sleep" }, "recorded_at": "2024-03-01T05:00:00Z", "ended_at": "2024-03-01T06:10:00Z" },
        { "schema_version": "care.event.v1", "activity": { "type": "feeding", "method": "bottle" }, "recorded_at": "2024-03-01T06:30:00Z", "amount_ml": 100.0 }
    ]"#;

    let config_json = r#"{ "birth_date": "2024-01-20T00:00:00Z" }"#;
    let now = "2024-03-01T08:00:00Z".parse().unwrap();

    let records = carecast::schema::EventLogAdapter::parse_array(events_json).unwrap();
    let events = carecast::schema::EventLogAdapter::to_events(records).unwrap();
    let config: carecast::types::CareConfig = serde_json::from_str(config_json).unwrap();

    let engine = carecast::engine::CareEngine::new(config);
    match engine.report_json(&events, now) {
        Ok(report) => println!("{report}"),
        Err(e) => eprintln!("Error: {e:?}"),
    }
}
