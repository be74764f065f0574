use schema_ingest::datetime::{from_epoch, parse_date_time, DateTimeValue, EpochUnit};

const RFC3339_LAYOUT: &str = "2006-01-02T15:04:05.999999999Z07:00";

// Rendering a zoned value and reading it back, auto-detected or with the RFC3339 layout,
// must render the same text again.
fn assert_stable(value: &DateTimeValue) -> String {
    let rendered = value.rfc3339();
    assert!(value.has_tz(), "{rendered}");

    let detected = parse_date_time(&rendered, "", false, "", "").unwrap();
    assert!(detected.has_tz(), "{rendered}");
    assert_eq!(detected.rfc3339(), rendered);

    let with_layout = parse_date_time(&rendered, RFC3339_LAYOUT, true, "", "").unwrap();
    assert_eq!(with_layout.rfc3339(), rendered);
    rendered
}

#[test]
fn epochs_rendered_in_several_zones() {
    let zones = [
        "UTC",
        "America/Los_Angeles",
        "America/St_Johns",
        "Asia/Kolkata",
        "Asia/Kathmandu",
        "Pacific/Marquesas",
        "Pacific/Kiritimati",
        "Australia/Lord_Howe",
    ];
    for zone in zones {
        for ms in [0, 1_578_024_245_123, -1, 1_593_561_600_500] {
            assert_stable(&from_epoch(ms, EpochUnit::Millisecond, Some(zone)).unwrap());
        }
    }
}

#[test]
fn nanosecond_fraction_survives() {
    let v = parse_date_time("2020-01-02T03:04:05.000000001+01:00", "", false, "", "").unwrap();
    assert_eq!(assert_stable(&v), "2020-01-02T03:04:05.000000001+01:00");
}

#[test]
fn negative_offsets() {
    let v = parse_date_time("2020-01-02T03:04:05.5-09:30", "", false, "", "").unwrap();
    assert_eq!(assert_stable(&v), "2020-01-02T03:04:05.500-09:30");

    let v = parse_date_time("2020-07-04 12:00:00", "", false, "America/New_York", "").unwrap();
    assert_eq!(assert_stable(&v), "2020-07-04T12:00:00-04:00");
}

#[test]
fn local_mean_time_offsets() {
    let v = parse_date_time("1883-11-18T12:00:00-04:56", "", false, "", "").unwrap();
    assert_eq!(assert_stable(&v), "1883-11-18T12:00:00-04:56");

    let v = parse_date_time("1883-01-01 12:00:00", "", false, "America/New_York", "").unwrap();
    assert!(assert_stable(&v).starts_with("1883-01-01T12:00:00-04:56"));
}

#[test]
fn converted_values() {
    let v = parse_date_time("2020-03-08 01:59:59.999", "", false, "UTC", "America/Chicago").unwrap();
    assert_eq!(assert_stable(&v), "2020-03-07T19:59:59.999-06:00");

    let v = parse_date_time("2020-01-02T03:04:05Z", "", false, "", "Asia/Kolkata").unwrap();
    assert_eq!(assert_stable(&v), "2020-01-02T08:34:05+05:30");
}
