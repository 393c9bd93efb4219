use crate::format::{join_and, ordinal};
use crate::recurrence::{Frequency, RecurringItem, occurrences};
use chrono::{Datelike, NaiveDate};

fn month_and_ordinal(date: NaiveDate) -> String {
    format!("{} {}", date.format("%B"), ordinal(date.day()))
}

/// Human-readable description of how `item` repeats.
///
/// Quarterly dates are the ones the item falls on in `target_year`, so the
/// text matches what the agenda shows for that year.
pub fn describe(item: &RecurringItem, target_year: i32) -> String {
    let anchor = item.anchor_date;
    match item.frequency {
        Frequency::Monthly if anchor.day() == 31 => {
            "Repeats Every Month on the Final Day".to_string()
        }
        Frequency::Monthly => format!("Repeats Every Month on the {}", ordinal(anchor.day())),
        Frequency::Quarterly => {
            let dates = occurrences(item, target_year)
                .into_iter()
                .map(month_and_ordinal)
                .collect::<Vec<_>>();
            format!("Repeats Quarterly on {}", join_and(&dates))
        }
        Frequency::Annual => format!("Repeats Annualy on {}", month_and_ordinal(anchor)),
        Frequency::Once => format!("Occurs on {}", anchor.format("%B %-d, %Y")),
    }
}
