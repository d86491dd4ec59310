//! This client fetches the festival programme and turns it into a schedule snapshot.

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;

use crate::snapshot::{Event, EventId, ImageUrls, Resource, Snapshot, TIMEZONE};

pub static API_BASE: &str = "https://program.goteborgfilmfestival.se/api";
static PAGE_SIZE: u32 = 500;
static MOVIE: &str = "Movie";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigResponse {
    festival_dates: Vec<FestivalDate>,
}

#[derive(Debug, Deserialize)]
struct FestivalDate {
    label: String,
}

#[derive(Debug, Default, Deserialize)]
struct ScheduleResponse {
    #[serde(default)]
    result: Option<ScheduleResult>,
}

#[derive(Debug, Default, Deserialize)]
struct ScheduleResult {
    #[serde(default)]
    documents: Vec<Screening>,
}

/// One screening as listed by the schedule endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Screening {
    occasion_id: u64,
    title: String,
    unique_title: String,
    time_start: String,
    time_end: String,
    #[serde(default)]
    location: Option<String>,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    image_url: Option<ImageUrls>,
}

/// Fetch the whole programme.
///
/// The first failing request aborts the run, so a snapshot is either complete or not made at all.
pub async fn get(api_base: &str) -> Result<Snapshot> {
    let client = reqwest::Client::new();
    log::info!("fetching festival config");
    let dates = parse_config(&get_text(&client, &format!("{api_base}/config")).await?)?;
    if let (Some(first), Some(last)) = (dates.first(), dates.last()) {
        log::info!("found {} festival dates: {first} to {last}", dates.len());
    }
    let mut screenings: Vec<Screening> = vec![];
    for date in &dates {
        log::info!("fetching schedule for {date}");
        let url =
            format!("{api_base}/tableau/schedule?dayOfSearch={date}&offset=0&size={PAGE_SIZE}");
        let day = parse_schedule(&get_text(&client, &url).await?)
            .with_context(|| format!("failed to decode schedule for {date}"))?;
        log::info!("  found {} movie screenings", day.len());
        screenings.extend(day);
    }
    get_snapshot(screenings)
}

async fn get_text(client: &reqwest::Client, url: &str) -> Result<String> {
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("failed to fetch {url}"))?;
    let status = response.status();
    if !status.is_success() {
        return Err(anyhow!("failed to fetch {url}: {status}"));
    }
    Ok(response.text().await?)
}

/// Parse the festival config to the labels of all festival days.
fn parse_config(json: &str) -> Result<Vec<String>> {
    let config: ConfigResponse =
        serde_json::from_str(json).context("failed to decode festival config")?;
    Ok(config
        .festival_dates
        .into_iter()
        .map(|date| date.label)
        .collect())
}

/// Parse one day of the schedule, keeping only film screenings.
fn parse_schedule(json: &str) -> Result<Vec<Screening>> {
    let schedule: ScheduleResponse = serde_json::from_str(json)?;
    Ok(schedule
        .result
        .unwrap_or_default()
        .documents
        .into_iter()
        .filter(|screening| screening.kind == MOVIE)
        .collect())
}

/// Build the snapshot: one resource per unique title, one event per screening.
fn get_snapshot(screenings: Vec<Screening>) -> Result<Snapshot> {
    let mut resources: Vec<Resource> = vec![];
    for screening in &screenings {
        if !resources
            .iter()
            .any(|resource| resource.id == screening.unique_title)
        {
            resources.push(Resource {
                id: screening.unique_title.clone(),
                title: screening.title.clone(),
                image_url: screening.image_url.clone(),
            });
        }
    }
    let events = screenings
        .into_iter()
        .map(|screening| {
            Ok(Event {
                id: EventId::Number(screening.occasion_id),
                resource_ids: vec![screening.unique_title],
                start: parse_time(&screening.time_start)?,
                end: parse_time(&screening.time_end)?,
                title: screening.title,
                location: screening.location,
                image_url: screening.image_url,
            })
        })
        .collect::<Result<Vec<Event>>>()?;
    Ok(Snapshot::new(resources, events)?)
}

/// Parse an API timestamp. Times without an offset are festival local time.
fn parse_time(time: &str) -> Result<DateTime<Utc>> {
    if let Ok(time) = DateTime::parse_from_rfc3339(time) {
        return Ok(time.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(time, "%Y-%m-%dT%H:%M:%S%.f")
        .with_context(|| format!("invalid timestamp {time:?}"))?;
    TIMEZONE
        .from_local_datetime(&naive)
        .earliest()
        .map(|time| time.with_timezone(&Utc))
        .ok_or_else(|| anyhow!("timestamp {time:?} does not exist in the festival time zone"))
}

#[cfg(test)]
mod tests {
    use super::*;

    static SCHEDULE: &str = r#"{
        "result": {
            "documents": [
                {
                    "eventKey": "e1",
                    "occasionId": 101,
                    "title": "Film One",
                    "uniqueTitle": "film-one",
                    "timeStart": "2024-01-26T18:00:00+01:00",
                    "timeEnd": "2024-01-26T20:00:00+01:00",
                    "location": "Draken",
                    "type": "Movie",
                    "imageUrl": {"hero": "h.jpg", "poster": "p.jpg", "thumbnail": "t.jpg"}
                },
                {
                    "occasionId": 102,
                    "title": "Talk",
                    "uniqueTitle": "talk",
                    "timeStart": "2024-01-26T12:00:00",
                    "timeEnd": "2024-01-26T13:00:00",
                    "type": "Seminar"
                },
                {
                    "occasionId": 103,
                    "title": "Film One",
                    "uniqueTitle": "film-one",
                    "timeStart": "2024-01-27T10:00:00",
                    "timeEnd": "2024-01-27T11:45:00",
                    "location": "Bio Roy",
                    "type": "Movie"
                }
            ]
        }
    }"#;

    #[test]
    fn test_parse_config() {
        let json = r#"{"festivalDates": [
            {"label": "2024-01-26", "value": "fri"},
            {"label": "2024-01-27", "value": "sat"}
        ]}"#;
        assert_eq!(parse_config(json).unwrap(), vec!["2024-01-26", "2024-01-27"]);
        assert!(parse_config("{}").is_err());
    }

    #[test]
    fn test_parse_schedule() {
        let screenings = parse_schedule(SCHEDULE).unwrap();
        let ids: Vec<u64> = screenings.iter().map(|s| s.occasion_id).collect();
        assert_eq!(ids, vec![101, 103]);
        assert!(parse_schedule("{}").unwrap().is_empty());
        assert!(parse_schedule(r#"{"result": {}}"#).unwrap().is_empty());
    }

    #[test]
    fn test_get_snapshot() {
        let snapshot = get_snapshot(parse_schedule(SCHEDULE).unwrap()).unwrap();
        assert_eq!(snapshot.resources().len(), 1);
        let resource = &snapshot.resources()[0];
        assert_eq!(resource.id, "film-one");
        assert_eq!(resource.title, "Film One");
        assert_eq!(resource.image_url.as_ref().unwrap().poster, "p.jpg");
        assert_eq!(snapshot.events().len(), 2);
        let first = &snapshot.events()[0];
        assert_eq!(first.id, EventId::Number(101));
        assert_eq!(first.resource_ids, vec!["film-one"]);
        assert_eq!(first.start, Utc.with_ymd_and_hms(2024, 1, 26, 17, 0, 0).unwrap());
        assert_eq!(first.location(), "Draken");
        let second = &snapshot.events()[1];
        assert_eq!(second.start, Utc.with_ymd_and_hms(2024, 1, 27, 9, 0, 0).unwrap());
        assert_eq!(second.end, Utc.with_ymd_and_hms(2024, 1, 27, 10, 45, 0).unwrap());
    }

    #[test]
    fn test_parse_time() {
        assert_eq!(
            parse_time("2024-07-01T12:00:00.000Z").unwrap(),
            Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).unwrap()
        );
        assert_eq!(
            parse_time("2024-07-01T12:00:00").unwrap(),
            Utc.with_ymd_and_hms(2024, 7, 1, 10, 0, 0).unwrap()
        );
        assert!(parse_time("tomorrow").is_err());
    }

    /// Test whether the programme can be fetched and contains something.
    ///
    /// This is an online test!
    #[tokio::test]
    #[ignore = "online"]
    async fn test_get() {
        let snapshot = get(API_BASE).await.unwrap();
        assert!(!snapshot.events().is_empty());
    }
}
