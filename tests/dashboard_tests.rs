use chrono::{NaiveDate, Weekday};
use client_agenda::{
    ClientScheduleRecord, ClientStatus, CustomTask, Dashboard, DashboardError, EventRecord,
    MemoryRecordStore, NewClient, NewEvent, NewTask, RecordError, RecordStore, Window,
};
use serde_json::json;

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn today() -> NaiveDate {
    d(2026, 10, 16)
}

#[test]
fn this_week_task_expires_in_seven_days() {
    let store = MemoryRecordStore::new();
    let dashboard = Dashboard::new(&store).with_today(today());

    let task = dashboard
        .add_task(NewTask {
            title: "Call \"Sam\"".into(),
            schedule: vec![Weekday::Thu, Weekday::Mon],
            frequency: "this_week".into(),
        })
        .unwrap();

    assert_eq!(task.title, "Call 'Sam'");
    assert_eq!(task.weekdays, vec![Weekday::Mon, Weekday::Thu]);
    assert_eq!(task.expiry, Some(d(2026, 10, 23)));
    assert_eq!(store.load_tasks().unwrap(), vec![task]);
}

#[test]
fn recurring_task_has_no_expiry() {
    let store = MemoryRecordStore::new();
    let dashboard = Dashboard::new(&store).with_today(today());
    let task = dashboard
        .add_task(NewTask {
            title: "Stretch".into(),
            schedule: vec![Weekday::Fri],
            frequency: "every_week".into(),
        })
        .unwrap();
    assert_eq!(task.expiry, None);
    assert_eq!(dashboard.today_agenda().unwrap(), vec!["Stretch".to_string()]);
}

#[test]
fn invalid_task_is_not_stored() {
    let store = MemoryRecordStore::new();
    let dashboard = Dashboard::new(&store).with_today(today());
    let err = dashboard
        .add_task(NewTask {
            title: "  ".into(),
            schedule: vec![Weekday::Mon],
            frequency: "every_week".into(),
        })
        .unwrap_err();
    match err {
        DashboardError::Validation(err) => {
            assert_eq!(err.message(), "Please enter a task description")
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(store.load_tasks().unwrap().is_empty());
}

#[test]
fn event_with_unreadable_date_is_rejected() {
    let store = MemoryRecordStore::new();
    let dashboard = Dashboard::new(&store).with_today(today());
    let err = dashboard
        .add_event(NewEvent {
            title: "Rent".into(),
            date: "the first".into(),
            frequency: "monthly".into(),
        })
        .unwrap_err();
    assert!(matches!(
        err,
        DashboardError::Record(RecordError::InvalidAnchorDate { .. })
    ));
    assert!(store.load_events().unwrap().is_empty());
}

#[test]
fn upcoming_puts_birthdays_before_events() {
    let store = MemoryRecordStore::new()
        .with_clients(vec![ClientScheduleRecord::new("Ann Lee", d(1990, 10, 18))])
        .with_events(vec![
            EventRecord::new("Rent", "2025-01-18", "monthly"),
            EventRecord::new("Audit", "2024-10-22", "annual"),
        ]);
    let dashboard = Dashboard::new(&store).with_today(today());

    let upcoming = dashboard.upcoming(Window::Week).unwrap();
    assert_eq!(
        upcoming[&d(2026, 10, 18)],
        vec!["Ann Lee's birthday".to_string(), "Rent".to_string()]
    );
    assert_eq!(upcoming[&d(2026, 10, 22)], vec!["Audit".to_string()]);
}

#[test]
fn today_agenda_appends_workout_reminders() {
    let store = MemoryRecordStore::new()
        .with_tasks(vec![CustomTask::new("Invoices", [Weekday::Fri], "every_week")])
        .with_clients(vec![
            ClientScheduleRecord::new("Ann Lee", d(1990, 1, 1))
                .with_extra_workouts([Weekday::Sun])
                .with_session(Weekday::Fri, "17:30"),
        ]);
    let dashboard = Dashboard::new(&store).with_today(today());

    assert_eq!(
        dashboard.today_agenda().unwrap(),
        vec![
            "Invoices".to_string(),
            "Send Sunday's workout to Ann Lee".to_string(),
        ]
    );
    let sessions = dashboard.todays_sessions().unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].1, "Ann Lee");
}

#[test]
fn removing_the_last_day_deletes_the_task() {
    let store = MemoryRecordStore::new().with_tasks(vec![
        CustomTask::new("Stretch", [Weekday::Mon, Weekday::Wed], "every_week"),
        CustomTask::new("Invoices", [Weekday::Fri], "every_week"),
    ]);
    let dashboard = Dashboard::new(&store).with_today(today());

    let removed = dashboard
        .remove_task_days(&[
            (Weekday::Mon, "Stretch".to_string()),
            (Weekday::Fri, "Invoices".to_string()),
            (Weekday::Sun, "Missing".to_string()),
        ])
        .unwrap();
    assert_eq!(removed, vec!["Stretch".to_string(), "Invoices".to_string()]);

    let tasks = store.load_tasks().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].weekdays, vec![Weekday::Wed]);
}

#[test]
fn delete_events_by_title() {
    let store = MemoryRecordStore::new().with_events(vec![
        EventRecord::new("Rent", "2025-01-18", "monthly"),
        EventRecord::new("Rent", "2025-01-03", "monthly"),
        EventRecord::new("Audit", "2024-10-22", "annual"),
    ]);
    let dashboard = Dashboard::new(&store).with_today(today());

    assert_eq!(dashboard.delete_events(&["Rent".to_string()]).unwrap(), 2);
    assert_eq!(dashboard.delete_events(&["Rent".to_string()]).unwrap(), 0);
    assert_eq!(store.load_events().unwrap().len(), 1);
}

#[test]
fn event_descriptions_are_sorted_by_title() {
    let store = MemoryRecordStore::new().with_events(vec![
        EventRecord::new("Rent", "2025-01-15", "monthly"),
        EventRecord::new("Audit", "2025-07-04", "annual"),
        EventRecord::new("Broken", "2025-07-04", "fortnightly"),
    ]);
    let dashboard = Dashboard::new(&store).with_today(today());

    let described = dashboard.event_descriptions().unwrap();
    let titles = described.iter().map(|(e, _)| e.title.as_str()).collect::<Vec<_>>();
    assert_eq!(titles, vec!["Audit", "Broken", "Rent"]);
    assert_eq!(
        described[0].1.as_deref(),
        Ok("Repeats Annualy on July 4th")
    );
    assert!(described[1].1.is_err());
    assert_eq!(
        described[2].1.as_deref(),
        Ok("Repeats Every Month on the 15th")
    );
}

#[test]
fn quarterly_descriptions_follow_the_current_year() {
    let store = MemoryRecordStore::new()
        .with_events(vec![EventRecord::new("Inventory", "2024-11-30", "quarterly")]);
    let dashboard = Dashboard::new(&store).with_today(today());

    let described = dashboard.event_descriptions().unwrap();
    assert_eq!(
        described[0].1.as_deref(),
        Ok("Repeats Quarterly on February 28th, May 30th, August 30th, and November 30th")
    );
}

fn jane_form(first_name: &str) -> NewClient {
    NewClient {
        first_name: first_name.into(),
        last_name: "Doe".into(),
        date_of_birth: "1990-03-09".into(),
        email: "jane@example.com".into(),
        training_schedule: vec![(Weekday::Wed, "6:00 PM".into())],
        additional_workouts: Vec::new(),
    }
}

#[test]
fn clients_are_listed_by_status_and_name() {
    let store = MemoryRecordStore::new().with_clients(vec![
        ClientScheduleRecord::new("Zoe Park", d(1990, 1, 1)),
        ClientScheduleRecord::new("Bo Lin", d(1985, 5, 1)).archived(),
        ClientScheduleRecord::new("Ann Lee", d(1992, 2, 2)),
    ]);
    let dashboard = Dashboard::new(&store).with_today(today());

    let roster = dashboard.clients().unwrap();
    let names = |clients: &[ClientScheduleRecord]| {
        clients
            .iter()
            .map(|client| client.client_name.clone())
            .collect::<Vec<_>>()
    };
    assert_eq!(names(&roster.current), vec!["Ann Lee", "Zoe Park"]);
    assert_eq!(names(&roster.archived), vec!["Bo Lin"]);
}

#[test]
fn archive_restore_and_delete_a_client() {
    let store = MemoryRecordStore::new()
        .with_clients(vec![ClientScheduleRecord::new("Ann Lee", d(1990, 10, 18))]);
    let dashboard = Dashboard::new(&store).with_today(today());

    let archived = dashboard.archive_client("ann_lee").unwrap();
    assert_eq!(archived.status, ClientStatus::Archived);
    assert_eq!(archived.display_name(), "Ann Lee");
    assert_eq!(store.load_client_records().unwrap()[0].status, ClientStatus::Archived);

    let err = dashboard.archive_client("ann_lee").unwrap_err();
    assert!(matches!(err, DashboardError::UnknownClient { .. }));
    assert_eq!(err.to_string(), "no current client named 'ann_lee'");

    let restored = dashboard.restore_client("Ann Lee").unwrap();
    assert!(restored.is_current());
    assert!(matches!(
        dashboard.delete_archived_client("Ann Lee"),
        Err(DashboardError::UnknownClient {
            status: ClientStatus::Archived,
            ..
        })
    ));

    dashboard.archive_client("ann lee").unwrap();
    dashboard.delete_archived_client("ann_lee").unwrap();
    assert!(store.load_client_records().unwrap().is_empty());
}

#[test]
fn archived_clients_drop_out_of_workout_reminders() {
    let store = MemoryRecordStore::new().with_clients(vec![
        ClientScheduleRecord::new("Ann Lee", d(1990, 10, 18)).with_extra_workouts([Weekday::Sat]),
    ]);
    let dashboard = Dashboard::new(&store).with_today(today());
    assert_eq!(dashboard.today_agenda().unwrap().len(), 1);

    dashboard.archive_client("Ann Lee").unwrap();
    assert!(dashboard.today_agenda().unwrap().is_empty());
    assert_eq!(dashboard.birthdays_in_window(Window::Week).unwrap().len(), 1);
}

#[test]
fn editing_a_client_renames_and_keeps_other_fields() {
    let store = MemoryRecordStore::new();
    let dashboard = Dashboard::new(&store).with_today(today());
    let mut jane = dashboard.add_client(jane_form("Jane")).unwrap();
    jane.extra.insert("phone".into(), json!("555-0100"));
    store.save_client_record(&jane).unwrap();

    let mut form = jane_form("Janet");
    form.email = "janet@example.com".into();
    let edited = dashboard.edit_client("jane_doe", form).unwrap();

    assert_eq!(edited.client_name, "Janet Doe");
    assert_eq!(edited.extra["email"], json!("janet@example.com"));
    assert_eq!(edited.extra["phone"], json!("555-0100"));
    assert_eq!(store.load_client_records().unwrap(), vec![edited]);
    assert!(dashboard.find_client("Jane Doe", ClientStatus::Current).is_err());
}

#[test]
fn editing_onto_another_clients_name_is_rejected() {
    let store = MemoryRecordStore::new();
    let dashboard = Dashboard::new(&store).with_today(today());
    dashboard.add_client(jane_form("Jane")).unwrap();
    dashboard.add_client(jane_form("John")).unwrap();

    let err = dashboard.edit_client("John Doe", jane_form("Jane")).unwrap_err();
    assert_eq!(err.to_string(), "Jane Doe is already one of your clients");
    assert_eq!(store.load_client_records().unwrap().len(), 2);

    let err = dashboard.edit_client("Nobody", jane_form("Jane")).unwrap_err();
    assert!(matches!(err, DashboardError::UnknownClient { .. }));
}

#[test]
fn new_client_is_stored_with_email() {
    let store = MemoryRecordStore::new();
    let dashboard = Dashboard::new(&store).with_today(today());

    let client = dashboard
        .add_client(NewClient {
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            date_of_birth: "1990-03-09".into(),
            email: "jane@example.com".into(),
            training_schedule: vec![(Weekday::Tue, "7:00 AM".into())],
            additional_workouts: vec![Weekday::Sat],
        })
        .unwrap();

    assert_eq!(client.client_name, "Jane Doe");
    assert_eq!(client.extra["email"], "jane@example.com");
    let stored = store.load_client_records().unwrap();
    assert_eq!(stored, vec![client]);
}

#[test]
fn new_client_with_future_birth_date_is_rejected() {
    let store = MemoryRecordStore::new();
    let dashboard = Dashboard::new(&store).with_today(today());
    let err = dashboard
        .add_client(NewClient {
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            date_of_birth: "2030-01-01".into(),
            email: "jane@example.com".into(),
            ..Default::default()
        })
        .unwrap_err();
    assert_eq!(err.to_string(), "Please enter a valid date of birth");
    assert!(store.load_client_records().unwrap().is_empty());
}
