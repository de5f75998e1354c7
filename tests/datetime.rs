use tasksync::utils::datetime;

#[test]
fn test_parse_and_format_roundtrip() {
    let date = datetime::parse_date("2025-01-15").unwrap();
    assert_eq!(datetime::format_ymd(date), "2025-01-15");
    assert!(datetime::parse_date("15/01/2025").is_err());
}

#[test]
fn test_format_human_date_relative_days() {
    assert_eq!(datetime::format_human_date(&datetime::format_today()), "today");
    assert_eq!(datetime::format_human_date(&datetime::format_date_with_offset(1)), "tomorrow");
    assert_eq!(datetime::format_human_date(&datetime::format_date_with_offset(-1)), "yesterday");
}

#[test]
fn test_format_human_date_next_week_and_overdue() {
    let next = datetime::format_human_date(&datetime::format_date_with_offset(3));
    assert!(next.starts_with("next "), "{next}");

    let overdue = datetime::format_human_date(&datetime::format_date_with_offset(-5));
    assert!(overdue.starts_with("overdue ("), "{overdue}");
}

#[test]
fn test_format_human_date_far_dates() {
    assert_eq!(datetime::format_human_date("2099-03-04"), "Mar 04, 2099");
}

#[test]
fn test_format_human_date_keeps_unparseable_input() {
    assert_eq!(datetime::format_human_date("someday"), "someday");
}

#[test]
fn test_now_timestamp_is_rfc3339_millis() {
    let stamp = datetime::now_timestamp();
    assert!(stamp.ends_with('Z'));
    let parsed = chrono::DateTime::parse_from_rfc3339(&stamp).unwrap();
    assert_eq!(parsed.timestamp_subsec_nanos() % 1_000_000, 0);
}
