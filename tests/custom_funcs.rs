use std::sync::Arc;

use schema_ingest::customfuncs::{
    date_time_layout_to_rfc3339, date_time_to_epoch, date_time_to_rfc3339, epoch_to_date_time_rfc3339, merge,
    CustomFuncs, COMMON_CUSTOM_FUNCS,
};
use schema_ingest::{Ctx, ErrorKind, TransformError, TransformResult};

fn call(name: &str, args: &[&str]) -> TransformResult<String> {
    COMMON_CUSTOM_FUNCS.invoke(name, None, args)
}

fn populated_ctx() -> Ctx {
    Ctx::new("orders.csv")
        .with_external("region", "eu")
        .with_custom_param(42u64)
}

#[test]
fn results_do_not_depend_on_ctx() {
    let ctx = populated_ctx();
    let cases: &[(&str, &[&str])] = &[
        ("coalesce", &["", "b"]),
        ("concat", &["a", "b", "c"]),
        ("lower", &["MiXeD"]),
        ("upper", &["MiXeD"]),
        ("uuidv3", &["hello world"]),
        ("dateTimeToRFC3339", &["2020-01-02T03:04:05", "UTC", "Asia/Tokyo"]),
        ("dateTimeLayoutToRFC3339", &["02/01/2020 03:04", "01/02/2006 15:04", "", "", ""]),
        ("dateTimeToEpoch", &["2020-01-02T03:04:05", "", "SECOND"]),
        ("epochToDateTimeRFC3339", &["1577934245", "SECOND"]),
    ];
    for (name, args) in cases {
        let without = COMMON_CUSTOM_FUNCS.invoke(name, None, args).unwrap();
        let with = COMMON_CUSTOM_FUNCS.invoke(name, Some(&ctx), args).unwrap();
        assert_eq!(without, with, "{name}");
    }
}

#[test]
fn string_functions() {
    assert_eq!(call("coalesce", &["", "", "c"]).unwrap(), "c");
    assert_eq!(call("coalesce", &[]).unwrap(), "");
    assert_eq!(call("concat", &["x", "", "y"]).unwrap(), "xy");
    assert_eq!(call("lower", &["ABC"]).unwrap(), "abc");
    assert_eq!(call("upper", &["abc"]).unwrap(), "ABC");
}

#[test]
fn uuidv3_is_deterministic() {
    assert_eq!(call("uuidv3", &["x"]).unwrap(), "994dd741-fd45-34a7-84b1-58e239395734");
    assert_eq!(
        call("uuidv3", &["hello world"]).unwrap(),
        "c72c207b-0847-386d-bdbc-2e5def81cf81"
    );
    assert_eq!(call("uuidv3", &["x"]).unwrap(), call("uuidv3", &["x"]).unwrap());
    assert_ne!(call("uuidv3", &["x"]).unwrap(), call("uuidv3", &["y"]).unwrap());
}

#[test]
fn naive_input_without_zones_keeps_wall_clock() {
    assert_eq!(
        call("dateTimeToRFC3339", &["2020-01-02T03:04:05", "", ""]).unwrap(),
        "2020-01-02T03:04:05"
    );
}

#[test]
fn epoch_zero_in_utc() {
    assert_eq!(
        call("epochToDateTimeRFC3339", &["0", "SECOND", "UTC"]).unwrap(),
        "1970-01-01T00:00:00+00:00"
    );
    assert_eq!(
        call("epochToDateTimeRFC3339", &["0", "SECOND"]).unwrap(),
        "1970-01-01T00:00:00+00:00"
    );
    assert_eq!(
        epoch_to_date_time_rfc3339(None, "0", "SECOND", Some("")).unwrap(),
        "1970-01-01T00:00:00+00:00"
    );
}

#[test]
fn unsupported_epoch_unit_fails() {
    let err = call("epochToDateTimeRFC3339", &["0", "NANOSECOND", "UTC"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);
    assert_eq!(err.to_string(), "failed to parse 'NANOSECOND': unknown epoch unit");

    assert!(date_time_to_epoch(None, "2020-01-02", "", "MINUTE").is_err());
}

#[test]
fn unknown_zone_fails() {
    let err = date_time_to_rfc3339(None, "2020-01-02T03:04:05", "Mars/Olympus", "").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);
    assert!(err.to_string().contains("unknown time zone"));
}

#[test]
fn epoch_round_trip_through_rfc3339() {
    let epoch = date_time_to_epoch(None, "2020-01-02T03:04:05", "America/New_York", "SECOND").unwrap();
    assert_eq!(epoch, "1577952245");
    let rendered = epoch_to_date_time_rfc3339(None, &epoch, "SECOND", Some("America/New_York")).unwrap();
    assert_eq!(rendered, "2020-01-02T03:04:05-05:00");

    let ms = date_time_to_epoch(None, "2020-01-02T03:04:05.678Z", "", "MILLISECOND").unwrap();
    assert_eq!(ms, "1577934245678");
    assert_eq!(
        epoch_to_date_time_rfc3339(None, &ms, "MILLISECOND", None).unwrap(),
        "2020-01-02T03:04:05.678+00:00"
    );
}

#[test]
fn epoch_past_the_zone_range_is_an_error() {
    let err = epoch_to_date_time_rfc3339(None, "8210266876799", "SECOND", Some("Pacific/Kiritimati")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);
    let err = call("epochToDateTimeRFC3339", &["-8334601228800", "SECOND", "Pacific/Kiritimati"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);
    assert!(call("epochToDateTimeRFC3339", &["99999999999999999", "SECOND"]).is_err());
}

#[test]
fn layout_with_zone_flag_converts() {
    let out = date_time_layout_to_rfc3339(
        None,
        "2020-01-02T03:04:05+09:00",
        "2006-01-02T15:04:05Z07:00",
        "true",
        "",
        "America/Los_Angeles",
    )
    .unwrap();
    assert_eq!(out, "2020-01-01T10:04:05-08:00");
}

#[test]
fn now_is_whole_second_utc() {
    let out = call("now", &[]).unwrap();
    assert!(out.ends_with("+00:00"), "{out}");
    assert!(!out.contains('.'), "{out}");
    assert_eq!(out.len(), "2020-01-02T03:04:05+00:00".len());
}

#[test]
fn merged_registry_prefers_later_sources() {
    let overrides = CustomFuncs::new().with("upper", |_ctx, _args: &[&str]| Ok("overridden".to_string()));
    let merged = merge(&[&*COMMON_CUSTOM_FUNCS, &overrides]);
    assert_eq!(merged.invoke("upper", None, &["a"]).unwrap(), "overridden");
    assert_eq!(COMMON_CUSTOM_FUNCS.invoke("upper", None, &["a"]).unwrap(), "A");

    let reversed = merge(&[&overrides, &*COMMON_CUSTOM_FUNCS]);
    assert_eq!(reversed.invoke("upper", None, &["a"]).unwrap(), "A");
}

#[test]
fn functions_can_read_the_ctx() {
    let funcs = CustomFuncs::new().with("region", |ctx, _args: &[&str]| {
        let ctx = ctx.ok_or_else(|| TransformError::TransformFailed("region: no ctx".to_string()))?;
        Ok(ctx.external("region").unwrap_or("unknown").to_string())
    });
    let ctx = populated_ctx();
    assert_eq!(funcs.invoke("region", Some(&ctx), &[]).unwrap(), "eu");
    assert!(funcs.invoke("region", None, &[]).unwrap_err().is_transform_failed());
    assert_eq!(ctx.custom_param::<u64>(), Some(&42));
}

#[test]
fn registry_is_shareable_across_threads() {
    let funcs = Arc::new(merge(&[&*COMMON_CUSTOM_FUNCS]));
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let funcs = Arc::clone(&funcs);
            std::thread::spawn(move || {
                let n = i.to_string();
                funcs.invoke("concat", None, &["t", n.as_str()]).unwrap()
            })
        })
        .collect();
    let mut out: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    out.sort();
    assert_eq!(out, vec!["t0", "t1", "t2", "t3"]);
}
