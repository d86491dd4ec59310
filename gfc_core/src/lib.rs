//! This crate implements the schedule model of the Göteborg Film Festival calendar:
//! the static snapshot, the selection kept in the page URL and the iCalendar export.
//!
//! The `export` feature builds the calendar file. With the `fetch` feature it also fetches
//! snapshots from <https://program.goteborgfilmfestival.se/api>.

#[cfg(feature = "export")]
pub use icalendar;
pub use url;

pub mod export;
#[cfg(feature = "fetch")]
pub mod festival_client;
pub mod selection;
pub mod snapshot;
pub mod url_state;
pub mod view_mode;
