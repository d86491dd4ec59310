//! The screenings a user has picked, kept in the `selected` query parameter.

use std::collections::BTreeSet;

use anyhow::Result;

use crate::url_state::{Location, SetParam};

pub static SELECTED: SetParam = SetParam::new("selected");

/// The selection of a page, read from and written to its [`Location`].
#[derive(Debug)]
pub struct Selection<L: Location> {
    location: L,
}

impl<L: Location> Selection<L> {
    pub fn new(location: L) -> Self {
        Selection { location }
    }

    pub fn ids(&self) -> BTreeSet<String> {
        SELECTED.ids(&self.location)
    }

    pub fn has(&self, id: &str) -> bool {
        SELECTED.has(&self.location, id)
    }

    pub fn toggle(&mut self, id: &str) -> Result<()> {
        SELECTED.toggle(&mut self.location, id)
    }

    /// The current page URL, which carries the whole selection.
    pub fn share_url(&self) -> String {
        self.location.href()
    }

    pub fn into_inner(self) -> L {
        self.location
    }
}
