//! Serde helpers that store weekdays under their full English names
//! ("Monday") instead of chrono's three-letter form.

use crate::calendar::{SUNDAY_FIRST, weekday_name};
use chrono::Weekday;
use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, SerializeSeq, Serializer};
use serde::Deserialize;
use std::collections::BTreeMap;

fn parse_weekday<E: de::Error>(name: &str) -> Result<Weekday, E> {
    name.trim()
        .parse::<Weekday>()
        .map_err(|_| E::custom(format!("unknown weekday '{name}'")))
}

/// Sort into canonical Sunday-first order and drop repeats.
pub(crate) fn canonicalize(days: &mut Vec<Weekday>) {
    days.sort_by_key(|day| day.num_days_from_sunday());
    days.dedup();
}

pub mod list {
    use super::*;

    pub fn serialize<S: Serializer>(days: &[Weekday], serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(days.len()))?;
        for day in days {
            seq.serialize_element(weekday_name(*day))?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Weekday>, D::Error> {
        let names = Vec::<String>::deserialize(deserializer)?;
        let mut days = names
            .iter()
            .map(|name| parse_weekday::<D::Error>(name))
            .collect::<Result<Vec<_>, _>>()?;
        canonicalize(&mut days);
        Ok(days)
    }
}

pub mod times {
    use super::*;

    pub fn serialize<S: Serializer>(
        slots: &[(Weekday, String)],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(slots.len()))?;
        for (day, time) in slots {
            map.serialize_entry(weekday_name(*day), time)?;
        }
        map.end()
    }

    /// Days with a blank time are treated as unscheduled.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<(Weekday, String)>, D::Error> {
        let raw = BTreeMap::<String, String>::deserialize(deserializer)?;
        let mut slots = Vec::with_capacity(raw.len());
        for (name, time) in raw {
            if time.trim().is_empty() {
                continue;
            }
            slots.push((parse_weekday::<D::Error>(&name)?, time));
        }
        slots.sort_by_key(|(day, _)| {
            SUNDAY_FIRST
                .iter()
                .position(|d| d == day)
                .unwrap_or(SUNDAY_FIRST.len())
        });
        Ok(slots)
    }
}
