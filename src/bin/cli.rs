use chrono::{Local, NaiveDate, Weekday};
use client_agenda::{
    Agenda, AgendaConfig, Dashboard, DashboardError, FileRecordStore, NewEvent, NewTask,
    RecordStore, Window,
    agenda::window_end,
    calendar::weekday_name,
    format::{format_time, join_and},
    load_tasks_from_csv, logging,
    messages::{self, ARCHIVED_CLIENTS, CURRENT_CLIENTS, EVENTS, TASKS},
    save_tasks_to_csv,
};
use std::collections::BTreeMap;
use std::io::{self, Write};

fn print_help() {
    println!(
        "Commands:\n  help                                   Show this help\n  today                                  Today's tasks, reminders and sessions\n  week [start_day]                       Seven-day agenda (default Sunday first)\n  upcoming <week|month>                  Birthdays and events in the window\n  birthdays <week|month>                 Client birthdays in the window\n  events <week|month>                    Custom events in the window\n  describe                               List events with their recurrence\n  add-task <days_csv> <frequency> <title...>\n                                         Add a task (days like Monday,Thursday)\n  add-event <YYYY-MM-DD> <frequency> <title...>\n                                         Add an event (once|monthly|quarterly|annual)\n  delete-task <day> <title...>           Unschedule a task on one day\n  delete-event <title...>                Delete events with this title\n  sweep                                  Remove expired tasks and events\n  clients                                List current and archived clients\n  archive <name...>                      Move a current client to the archive\n  restore <name...>                      Move an archived client back to current\n  delete-client <name...>                Delete an archived client\n  export <path>                          Save tasks to CSV\n  import <path>                          Append tasks from CSV\n  date <YYYY-MM-DD>                      Use another date as today\n  quit|exit                              Exit"
    );
}

fn print_agenda(agenda: &Agenda) {
    for (day, lines) in agenda.days() {
        println!("{}:", weekday_name(*day));
        for line in lines {
            println!("  - {line}");
        }
    }
}

fn print_dated(entries: &BTreeMap<NaiveDate, Vec<String>>) {
    if entries.is_empty() {
        println!("Nothing coming up.");
        return;
    }
    for (date, lines) in entries {
        println!("{}: {}", date.format("%A, %B %-d"), join_and(lines));
    }
}

fn parse_window(input: Option<&str>) -> Option<Window> {
    match input {
        None => Some(Window::Week),
        Some(raw) => Window::parse(raw),
    }
}

fn parse_days(input: &str) -> Option<Vec<Weekday>> {
    input
        .split(',')
        .filter(|part| !part.trim().is_empty())
        .map(|part| part.trim().parse::<Weekday>().ok())
        .collect()
}

fn report(err: DashboardError) {
    match err {
        DashboardError::Validation(err) => println!("{}", err.message()),
        other => println!("Error: {other}"),
    }
}

fn main() {
    let config = match AgendaConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };
    logging::init_logger(&config.log_filter);

    let store = FileRecordStore::new(&config.data_dir);
    let mut today = Local::now().date_naive();

    println!("Client Agenda (CLI) - type 'help' for commands\n");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let dashboard = Dashboard::new(&store).with_today(today);
        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "today" => {
                println!("{}", today.format("%A, %B %-d, %Y"));
                match dashboard.today_agenda() {
                    Ok(lines) if lines.is_empty() => println!("You have no tasks today"),
                    Ok(lines) => {
                        for line in lines {
                            println!("  - {line}");
                        }
                    }
                    Err(e) => println!("Error: {e}"),
                }
                match dashboard.todays_sessions() {
                    Ok(sessions) => {
                        for (time, client) in sessions {
                            println!("  {} {}", format_time(time), client);
                        }
                    }
                    Err(e) => println!("Error: {e}"),
                }
            }
            "week" => {
                let start = match parts.next() {
                    Some(raw) => match raw.parse::<Weekday>() {
                        Ok(day) => day,
                        Err(_) => {
                            println!("Unknown day '{raw}'");
                            continue;
                        }
                    },
                    None => Weekday::Sun,
                };
                match dashboard.week_agenda() {
                    Ok(agenda) => print_agenda(&agenda.starting_from(start)),
                    Err(e) => println!("Error: {e}"),
                }
            }
            "upcoming" | "birthdays" | "events" => {
                let Some(window) = parse_window(parts.next()) else {
                    println!("Usage: {cmd} <week|month>");
                    continue;
                };
                println!(
                    "Through {}:",
                    window_end(window, today).format("%A, %B %-d")
                );
                let result = match cmd {
                    "upcoming" => dashboard.upcoming(window),
                    "birthdays" => dashboard.birthdays_in_window(window),
                    _ => dashboard.events_in_window(window).map(|upcoming| {
                        for err in &upcoming.errors {
                            println!("Skipped: {err}");
                        }
                        upcoming.entries
                    }),
                };
                match result {
                    Ok(entries) => print_dated(&entries),
                    Err(e) => println!("Error: {e}"),
                }
            }
            "describe" => match dashboard.event_descriptions() {
                Ok(events) if events.is_empty() => println!("No events."),
                Ok(events) => {
                    for (event, description) in events {
                        match description {
                            Ok(text) => println!("{}: {}", event.title, text),
                            Err(err) => println!("{}: {}", event.title, err),
                        }
                    }
                }
                Err(e) => println!("Error: {e}"),
            },
            "add-task" => {
                let days = parts.next();
                let frequency = parts.next();
                let title = parts.collect::<Vec<_>>().join(" ");
                let (Some(days), Some(frequency)) = (days, frequency) else {
                    println!("Usage: add-task <days_csv> <frequency> <title...>");
                    continue;
                };
                let Some(schedule) = parse_days(days) else {
                    println!("Invalid day list '{days}'");
                    continue;
                };
                let input = NewTask {
                    title,
                    schedule,
                    frequency: frequency.to_string(),
                };
                match dashboard.add_task(input) {
                    Ok(task) => println!("{}", messages::successful_add(&task.title, TASKS)),
                    Err(e) => report(e),
                }
            }
            "add-event" => {
                let date = parts.next();
                let frequency = parts.next();
                let title = parts.collect::<Vec<_>>().join(" ");
                let (Some(date), Some(frequency)) = (date, frequency) else {
                    println!("Usage: add-event <YYYY-MM-DD> <frequency> <title...>");
                    continue;
                };
                let input = NewEvent {
                    title,
                    date: date.to_string(),
                    frequency: frequency.to_string(),
                };
                match dashboard.add_event(input) {
                    Ok(event) => println!("{}", messages::successful_add(&event.title, EVENTS)),
                    Err(e) => report(e),
                }
            }
            "delete-task" => {
                let day = parts.next().and_then(|raw| raw.parse::<Weekday>().ok());
                let title = parts.collect::<Vec<_>>().join(" ");
                let Some(day) = day.filter(|_| !title.is_empty()) else {
                    println!("Usage: delete-task <day> <title...>");
                    continue;
                };
                match dashboard.remove_task_days(&[(day, title.clone())]) {
                    Ok(removed) if removed.is_empty() => {
                        println!("No task '{title}' on {}.", weekday_name(day))
                    }
                    Ok(removed) => println!("{}", messages::successful_delete(&removed, TASKS)),
                    Err(e) => println!("Error: {e}"),
                }
            }
            "delete-event" => {
                let title = parts.collect::<Vec<_>>().join(" ");
                if title.is_empty() {
                    println!("Usage: delete-event <title...>");
                    continue;
                }
                match dashboard.delete_events(&[title.clone()]) {
                    Ok(0) => println!("No event '{title}'."),
                    Ok(_) => println!("{}", messages::successful_delete(&[title], EVENTS)),
                    Err(e) => println!("Error: {e}"),
                }
            }
            "sweep" => match dashboard.sweep() {
                Ok(outcome) => println!(
                    "Removed {} task(s) and {} event(s).",
                    outcome.tasks_removed, outcome.events_removed
                ),
                Err(e) => println!("Error: {e}"),
            },
            "clients" => match dashboard.clients() {
                Ok(roster) => {
                    for (heading, clients) in [
                        (CURRENT_CLIENTS, &roster.current),
                        (ARCHIVED_CLIENTS, &roster.archived),
                    ] {
                        println!("{heading}:");
                        if clients.is_empty() {
                            println!("  (none)");
                        }
                        for client in clients {
                            println!("  - {}", client.client_name);
                        }
                    }
                }
                Err(e) => println!("Error: {e}"),
            },
            "archive" | "restore" | "delete-client" => {
                let name = parts.collect::<Vec<_>>().join(" ");
                if name.is_empty() {
                    println!("Usage: {cmd} <name...>");
                    continue;
                }
                let result = match cmd {
                    "archive" => dashboard.archive_client(&name).map(|client| {
                        messages::successful_move(&client.display_name(), ARCHIVED_CLIENTS)
                    }),
                    "restore" => dashboard.restore_client(&name).map(|client| {
                        messages::successful_move(&client.display_name(), CURRENT_CLIENTS)
                    }),
                    _ => dashboard.delete_archived_client(&name).map(|client| {
                        messages::successful_delete(&[client.display_name()], ARCHIVED_CLIENTS)
                    }),
                };
                match result {
                    Ok(message) => println!("{message}"),
                    Err(e) => report(e),
                }
            }
            "export" => match parts.next() {
                Some(path) => match store
                    .load_tasks()
                    .and_then(|tasks| save_tasks_to_csv(&tasks, path))
                {
                    Ok(_) => println!("Tasks saved to {path}."),
                    Err(e) => println!("Error saving tasks: {e}"),
                },
                None => println!("Usage: export <path>"),
            },
            "import" => match parts.next() {
                Some(path) => {
                    let result = load_tasks_from_csv(path).and_then(|imported| {
                        let count = imported.len();
                        let mut tasks = store.load_tasks()?;
                        tasks.extend(imported);
                        store.save_tasks(&tasks)?;
                        Ok(count)
                    });
                    match result {
                        Ok(count) => println!("Imported {count} task(s) from {path}."),
                        Err(e) => println!("Error importing tasks: {e}"),
                    }
                }
                None => println!("Usage: import <path>"),
            },
            "date" => match parts
                .next()
                .map(|raw| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
            {
                Some(Ok(date)) => {
                    today = date;
                    println!("Today is now {}.", today.format("%A, %B %-d, %Y"));
                }
                _ => println!("Usage: date <YYYY-MM-DD>"),
            },
            _ => println!("Unknown command. Type 'help'."),
        }
    }
}
