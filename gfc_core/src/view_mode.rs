//! The schedule layout, kept in the `view` query parameter.

use std::{fmt, str::FromStr};

use anyhow::Result;
use thiserror::Error;

use crate::url_state::{Location, ScalarParam};

pub static VIEW: ScalarParam = ScalarParam::new("view", ViewMode::Timeline.as_str());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ViewMode {
    /// One row per film.
    #[default]
    Timeline,
    /// Screenings grouped by festival day.
    Week,
    /// All screenings by start time.
    List,
}

impl ViewMode {
    pub const ALL: [ViewMode; 3] = [ViewMode::Timeline, ViewMode::Week, ViewMode::List];

    pub const fn as_str(self) -> &'static str {
        match self {
            ViewMode::Timeline => "timeline",
            ViewMode::Week => "week",
            ViewMode::List => "list",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown view mode {0:?}")]
pub struct UnknownViewMode(pub String);

impl FromStr for ViewMode {
    type Err = UnknownViewMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ViewMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| UnknownViewMode(s.to_owned()))
    }
}

/// The view mode of a page, read from and written to its [`Location`].
#[derive(Debug)]
pub struct ViewState<L: Location> {
    location: L,
}

impl<L: Location> ViewState<L> {
    pub fn new(location: L) -> Self {
        ViewState { location }
    }

    /// Unknown values fall back to the default mode.
    pub fn mode(&self) -> ViewMode {
        VIEW.value(&self.location).parse().unwrap_or_default()
    }

    pub fn set(&mut self, mode: ViewMode) -> Result<()> {
        VIEW.set(&mut self.location, mode.as_str())
    }
}
