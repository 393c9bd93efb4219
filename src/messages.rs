//! Confirmation lines shown after a change to the stored records.

use crate::format::join_and;

pub const TASKS: &str = "Tasks";
pub const EVENTS: &str = "Events";
pub const CURRENT_CLIENTS: &str = "Current Clients";
pub const ARCHIVED_CLIENTS: &str = "Archived Clients";

pub fn successful_add(title: &str, category: &str) -> String {
    format!("You have successfully added {title} to your {category}")
}

/// `titles` are joined as a list ("A, B, and C").
pub fn successful_delete<S: AsRef<str>>(titles: &[S], category: &str) -> String {
    format!(
        "You have successfully deleted {} from your {category}",
        join_and(titles)
    )
}

pub fn successful_move(name: &str, category: &str) -> String {
    format!("You have successfully moved {name} to {category}")
}

pub fn successful_edit(name: &str) -> String {
    format!("You have successfully edited {name}'s data")
}
