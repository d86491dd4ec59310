//! The static schedule snapshot: films (resources) and their screenings (events).

use std::{
    collections::HashMap,
    fmt,
    fs::{read_to_string, write},
    io,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub static RESOURCES_FILE: &str = "resources.json";
pub static EVENTS_FILE: &str = "events.json";
/// The festival's home time zone.
pub static TIMEZONE: Tz = chrono_tz::Europe::Stockholm;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("could not access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not decode {name}: {source}")]
    Json {
        name: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("event {0} references no resource")]
    MissingResource(EventId),
    #[error("event {0} does not start before it ends")]
    InvalidInterval(EventId),
}

/// Poster images as delivered by the festival API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUrls {
    pub hero: String,
    pub poster: String,
    pub thumbnail: String,
}

/// A film, shown as one row of the schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<ImageUrls>,
}

/// Event ids are numbers in fetched snapshots but strings are accepted as well.
///
/// Every comparison goes through the string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventId {
    Number(u64),
    Text(String),
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventId::Number(number) => write!(f, "{number}"),
            EventId::Text(text) => f.write_str(text),
        }
    }
}

/// A single screening of a film.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EventId,
    /// The first id is the primary resource.
    pub resource_ids: Vec<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<ImageUrls>,
}

impl Event {
    pub fn primary_resource_id(&self) -> Option<&str> {
        self.resource_ids.first().map(String::as_str)
    }

    pub fn location(&self) -> &str {
        self.location.as_deref().unwrap_or_default()
    }

    /// Start as festival wall-clock time.
    pub fn local_start(&self) -> DateTime<Tz> {
        self.start.with_timezone(&TIMEZONE)
    }

    pub fn local_end(&self) -> DateTime<Tz> {
        self.end.with_timezone(&TIMEZONE)
    }
}

/// Both datasets, validated and indexed. Read-only once built.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    resources: Vec<Resource>,
    events: Vec<Event>,
    resource_index: HashMap<String, usize>,
}

impl Snapshot {
    pub fn new(resources: Vec<Resource>, events: Vec<Event>) -> Result<Self, SnapshotError> {
        for event in &events {
            if event.resource_ids.is_empty() {
                return Err(SnapshotError::MissingResource(event.id.clone()));
            }
            if event.start >= event.end {
                return Err(SnapshotError::InvalidInterval(event.id.clone()));
            }
        }
        let mut resource_index = HashMap::with_capacity(resources.len());
        for (position, resource) in resources.iter().enumerate() {
            resource_index.entry(resource.id.clone()).or_insert(position);
        }
        Ok(Snapshot {
            resources,
            events,
            resource_index,
        })
    }

    pub fn from_json(resources: &str, events: &str) -> Result<Self, SnapshotError> {
        let resources = serde_json::from_str(resources).map_err(|source| SnapshotError::Json {
            name: RESOURCES_FILE,
            source,
        })?;
        let events = serde_json::from_str(events).map_err(|source| SnapshotError::Json {
            name: EVENTS_FILE,
            source,
        })?;
        Snapshot::new(resources, events)
    }

    /// Load `resources.json` and `events.json` from a data directory.
    pub fn load(data_dir: &Path) -> Result<Self, SnapshotError> {
        let read = |name: &str| {
            let path = data_dir.join(name);
            read_to_string(&path).map_err(|source| SnapshotError::Io { path, source })
        };
        let snapshot = Snapshot::from_json(&read(RESOURCES_FILE)?, &read(EVENTS_FILE)?)?;
        log::info!(
            "loaded {} resources and {} events from {}",
            snapshot.resources.len(),
            snapshot.events.len(),
            data_dir.display()
        );
        Ok(snapshot)
    }

    /// Write both datasets as pretty-printed JSON into a data directory.
    pub fn save(&self, data_dir: &Path) -> Result<(), SnapshotError> {
        let write_json = |name: &'static str, json: serde_json::Result<String>| {
            let json = json.map_err(|source| SnapshotError::Json { name, source })?;
            let path = data_dir.join(name);
            write(&path, json).map_err(|source| SnapshotError::Io {
                path: path.clone(),
                source,
            })?;
            Ok::<PathBuf, SnapshotError>(path)
        };
        let path = write_json(
            RESOURCES_FILE,
            serde_json::to_string_pretty(&self.resources),
        )?;
        log::info!("wrote {} resources to {}", self.resources.len(), path.display());
        let path = write_json(EVENTS_FILE, serde_json::to_string_pretty(&self.events))?;
        log::info!("wrote {} events to {}", self.events.len(), path.display());
        Ok(())
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn resource(&self, id: &str) -> Option<&Resource> {
        self.resource_index
            .get(id)
            .map(|&position| &self.resources[position])
    }

    /// The resource title of the primary resource, or the event's own title.
    pub fn display_name<'a>(&'a self, event: &'a Event) -> &'a str {
        event
            .primary_resource_id()
            .and_then(|id| self.resource(id))
            .map_or(event.title.as_str(), |resource| resource.title.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static RESOURCES: &str = r#"[{"id": "A1", "title": "Film One"}]"#;

    #[test]
    fn test_from_json() {
        let events = r#"[
            {
                "id": 42,
                "resourceIds": ["A1"],
                "start": "2024-01-10T18:00:00.000Z",
                "end": "2024-01-10T20:00:00.000Z",
                "title": "Film One",
                "location": "Cinema 1"
            },
            {
                "id": "43b",
                "resourceIds": ["B2"],
                "start": "2024-01-11T18:00:00Z",
                "end": "2024-01-11T19:30:00Z",
                "title": "Film Two"
            }
        ]"#;
        let snapshot = Snapshot::from_json(RESOURCES, events).unwrap();
        assert_eq!(snapshot.events().len(), 2);
        let first = &snapshot.events()[0];
        assert_eq!(first.id.to_string(), "42");
        assert_eq!(first.location(), "Cinema 1");
        assert_eq!(snapshot.display_name(first), "Film One");
        assert_eq!(first.local_start().format("%H:%M").to_string(), "19:00");
        let second = &snapshot.events()[1];
        assert_eq!(second.id, EventId::Text(String::from("43b")));
        assert_eq!(second.location(), "");
        assert_eq!(snapshot.display_name(second), "Film Two");
    }

    #[test]
    fn test_rejects_inverted_interval() {
        let events = r#"[{
            "id": 1,
            "resourceIds": ["A1"],
            "start": "2024-01-10T20:00:00Z",
            "end": "2024-01-10T20:00:00Z",
            "title": "Film One"
        }]"#;
        let result = Snapshot::from_json(RESOURCES, events);
        assert!(matches!(result, Err(SnapshotError::InvalidInterval(_))));
    }

    #[test]
    fn test_rejects_missing_resource() {
        let events = r#"[{
            "id": 1,
            "resourceIds": [],
            "start": "2024-01-10T18:00:00Z",
            "end": "2024-01-10T20:00:00Z",
            "title": "Film One"
        }]"#;
        let result = Snapshot::from_json(RESOURCES, events);
        assert!(matches!(result, Err(SnapshotError::MissingResource(_))));
    }

    #[test]
    fn test_save_and_load() {
        let events = r#"[{
            "id": 7,
            "resourceIds": ["A1"],
            "start": "2024-01-10T18:00:00Z",
            "end": "2024-01-10T20:00:00Z",
            "title": "Film One"
        }]"#;
        let snapshot = Snapshot::from_json(RESOURCES, events).unwrap();
        let dir = tempfile::tempdir().unwrap();
        snapshot.save(dir.path()).unwrap();
        let loaded = Snapshot::load(dir.path()).unwrap();
        assert_eq!(loaded.resources(), snapshot.resources());
        assert_eq!(loaded.events(), snapshot.events());
    }

    #[test]
    fn test_load_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let result = Snapshot::load(&dir.path().join("nowhere"));
        assert!(matches!(result, Err(SnapshotError::Io { .. })));
    }
}
