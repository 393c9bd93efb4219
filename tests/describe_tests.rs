use chrono::{NaiveDate, Weekday};
use client_agenda::{
    ClientScheduleRecord, FieldValue, Frequency, RecurringItem, describe, join_and, ordinal,
};

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn ordinal_suffixes() {
    let cases = [
        (1, "1st"),
        (2, "2nd"),
        (3, "3rd"),
        (4, "4th"),
        (11, "11th"),
        (12, "12th"),
        (13, "13th"),
        (21, "21st"),
        (22, "22nd"),
        (101, "101st"),
        (111, "111th"),
        (112, "112th"),
        (113, "113th"),
    ];
    for (n, expected) in cases {
        assert_eq!(ordinal(n), expected);
    }
}

#[test]
fn join_and_uses_oxford_comma() {
    let empty: [&str; 0] = [];
    assert_eq!(join_and(&empty), "");
    assert_eq!(join_and(&["Ann"]), "Ann");
    assert_eq!(join_and(&["Ann", "Bo"]), "Ann and Bo");
    assert_eq!(join_and(&["Ann", "Bo", "Cy"]), "Ann, Bo, and Cy");
}

#[test]
fn describes_monthly_items() {
    let final_day = RecurringItem::new("Invoice", d(2025, 1, 31), Frequency::Monthly);
    assert_eq!(describe(&final_day, 2025), "Repeats Every Month on the Final Day");

    let mid = RecurringItem::new("Rent", d(2025, 1, 15), Frequency::Monthly);
    assert_eq!(describe(&mid, 2025), "Repeats Every Month on the 15th");
}

#[test]
fn describes_quarterly_items() {
    let item = RecurringItem::new("Review", d(2025, 2, 10), Frequency::Quarterly);
    assert_eq!(
        describe(&item, 2025),
        "Repeats Quarterly on February 10th, May 10th, August 10th, and November 10th"
    );
}

#[test]
fn quarterly_from_january_joins_four_dates() {
    let item = RecurringItem::new("Estimated tax", d(2025, 1, 15), Frequency::Quarterly);
    assert_eq!(
        describe(&item, 2025),
        "Repeats Quarterly on January 15th, April 15th, July 15th, and October 15th"
    );
}

#[test]
fn quarterly_description_uses_the_target_year() {
    let item = RecurringItem::new("Inventory", d(2024, 11, 30), Frequency::Quarterly);
    assert_eq!(
        describe(&item, 2024),
        "Repeats Quarterly on February 29th, May 30th, August 30th, and November 30th"
    );
    assert_eq!(
        describe(&item, 2026),
        "Repeats Quarterly on February 28th, May 30th, August 30th, and November 30th"
    );
}

#[test]
fn describes_annual_and_once_items() {
    let annual = RecurringItem::new("Audit", d(2025, 7, 4), Frequency::Annual);
    assert_eq!(describe(&annual, 2025), "Repeats Annualy on July 4th");

    let once = RecurringItem::new("Conference", d(2025, 3, 9), Frequency::Once);
    assert_eq!(describe(&once, 2025), "Occurs on March 9, 2025");
}

#[test]
fn schedule_field_lists_sessions() {
    let value = FieldValue::Schedule(vec![
        (Weekday::Mon, "06:30".into()),
        (Weekday::Thu, "18:00".into()),
    ]);
    assert_eq!(value.to_string(), "Mondays at 6:30 AM and Thursdays at 6:00 PM");
    assert_eq!(
        FieldValue::Date(d(1990, 3, 9)).to_string(),
        "March 09, 1990"
    );
}

#[test]
fn client_profile_labels_fields() {
    let mut client = ClientScheduleRecord::new("Jane Doe", d(1990, 3, 9))
        .with_session(Weekday::Tue, "7:00 AM")
        .with_extra_workouts([Weekday::Sat]);
    client
        .extra
        .insert("email".into(), serde_json::json!("jane@example.com"));

    let profile = client.profile();
    let labels = profile.iter().map(|(label, _)| label.as_str()).collect::<Vec<_>>();
    assert_eq!(
        labels,
        vec![
            "Name",
            "Date Of Birth",
            "Training Schedule",
            "Additional Workouts",
            "Email"
        ]
    );
    assert_eq!(profile[2].1.to_string(), "Tuesdays at 7:00 AM");
    assert_eq!(profile[3].1.to_string(), "Saturday");
}
