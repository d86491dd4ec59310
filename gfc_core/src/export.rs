//! Turns a selection of screenings into an iCalendar file.
//!
//! All timestamps are written as absolute UTC (`YYYYMMDDTHHMMSSZ`). Nothing depends on the clock,
//! so the same snapshot and selection always give the same bytes. Text values are escaped and long
//! lines folded by `icalendar`.

#[cfg(feature = "export")]
use std::collections::BTreeSet;

#[cfg(feature = "export")]
use chrono::{DateTime, Utc};
#[cfg(feature = "export")]
use icalendar::{Calendar, Component, EventLike, Property};
use thiserror::Error;

#[cfg(feature = "export")]
use crate::snapshot::{Event, Snapshot};

#[cfg(feature = "export")]
static PROD_ID: &str = "-//Göteborg Film Festival//Schedule//EN";
#[cfg(feature = "export")]
static UID_DOMAIN: &str = "goteborgfilmfestival";
#[cfg(feature = "export")]
static FORMAT: &str = "%Y%m%dT%H%M%SZ";

pub static CONTENT_TYPE: &str = "text/calendar; charset=utf-8";
pub static FILE_NAME: &str = "gff-schedule.ics";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExportError {
    #[error("No events selected")]
    EmptySelection,
}

/// The `Content-Disposition` value offering the export as a download.
pub fn content_disposition() -> String {
    format!("attachment; filename=\"{FILE_NAME}\"")
}

#[cfg(feature = "export")]
/// Build the calendar for the selected event ids.
///
/// Events keep the order of the snapshot. Ids without an event are skipped.
pub fn calendar(selected: &BTreeSet<String>, snapshot: &Snapshot) -> Result<Calendar, ExportError> {
    if selected.is_empty() {
        return Err(ExportError::EmptySelection);
    }
    let mut calendar = Calendar::empty();
    calendar
        .append_property(Property::new("VERSION", "2.0"))
        .append_property(Property::new("PRODID", PROD_ID))
        .append_property(Property::new("CALSCALE", "GREGORIAN"));
    let mut count = 0;
    for event in snapshot.events() {
        if selected.contains(&event.id.to_string()) {
            calendar.push(get_event(event, snapshot.display_name(event)));
            count += 1;
        }
    }
    log::debug!("exporting {count} of {} selected events", selected.len());
    Ok(calendar.done())
}

#[cfg(feature = "export")]
/// The iCalendar text for the selected event ids.
///
/// Lines end in CRLF and are folded at 75 octets.
pub fn export(selected: &BTreeSet<String>, snapshot: &Snapshot) -> Result<String, ExportError> {
    calendar(selected, snapshot).map(|calendar| calendar.to_string())
}

#[cfg(feature = "export")]
fn get_event(event: &Event, summary: &str) -> icalendar::Event {
    icalendar::Event::new()
        .uid(&uid(event))
        // pinned to the start so the same selection always gives the same bytes
        .add_property("DTSTAMP", format_time(&event.start))
        .add_property("DTSTART", format_time(&event.start))
        .add_property("DTEND", format_time(&event.end))
        .summary(summary)
        .location(event.location())
        .done()
}

#[cfg(feature = "export")]
/// Get a unique id for a screening.
///
/// Changing this function is a breaking change!
fn uid(event: &Event) -> String {
    format!("{}@{UID_DOMAIN}", event.id)
}

#[cfg(feature = "export")]
fn format_time(time: &DateTime<Utc>) -> String {
    time.format(FORMAT).to_string()
}
