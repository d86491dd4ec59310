use std::sync::Arc;

use axum::{
    extract::{RawQuery, State},
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
        StatusCode,
    },
    response::{IntoResponse, Response},
};
use gfc_core::{
    export,
    selection::SELECTED,
    snapshot::Snapshot,
    url_state::{parse_ids, read_query_scalar},
};

/// Handle export requests.
///
/// The event ids must be given comma separated as `selected` in the query string.
///
/// The query is read raw instead of through `Query` so that it is as lenient as the page: the
/// first `selected` wins when the key repeats, where a typed `Query` would reject the request.
pub async fn handler(
    State(snapshot): State<Arc<Snapshot>>,
    RawQuery(query): RawQuery,
) -> Result<Response, (StatusCode, String)> {
    let selected = parse_ids(
        query
            .as_deref()
            .and_then(|query| read_query_scalar(query, SELECTED.name()))
            .as_deref(),
    );
    let ical_calendar = export::export(&selected, &snapshot).map_err(|err| {
        log::debug!("rejected export request {query:?}: {err}");
        (StatusCode::BAD_REQUEST, err.to_string())
    })?;
    let response = (
        [
            (CONTENT_TYPE, String::from(export::CONTENT_TYPE)),
            (CONTENT_DISPOSITION, export::content_disposition()),
        ],
        ical_calendar,
    )
        .into_response();
    Ok(response)
}

#[cfg(test)]
mod tests {
    use std::{path::Path, sync::Arc};

    use axum::{
        body::Body,
        http::{
            header::{CONTENT_DISPOSITION, CONTENT_TYPE},
            Request, StatusCode,
        },
        Router,
    };
    use gfc_core::snapshot::Snapshot;
    use tower::ServiceExt;

    use crate::route::router;

    fn get_test_snapshot() -> Snapshot {
        let resources = r#"[{"id": "A1", "title": "Film One"}]"#;
        let events = r#"[
            {
                "id": 42,
                "resourceIds": ["A1"],
                "start": "2024-01-10T18:00:00Z",
                "end": "2024-01-10T20:00:00Z",
                "title": "Film One",
                "location": "Cinema 1"
            },
            {
                "id": 43,
                "resourceIds": ["A1"],
                "start": "2024-01-12T18:00:00Z",
                "end": "2024-01-12T20:00:00Z",
                "title": "Film One",
                "location": "Cinema 2"
            }
        ]"#;
        Snapshot::from_json(resources, events).unwrap()
    }

    fn get_test_router() -> Router {
        let missing = Path::new("does-not-exist");
        router(Arc::new(get_test_snapshot()), missing, missing)
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, Option<String>, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .map(|value| value.to_str().unwrap().to_owned());
        let body = hyper::body::to_bytes(response.into_body()).await.unwrap();
        (status, content_type, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_export() {
        let response = get_test_router()
            .oneshot(
                Request::builder()
                    .uri("/export.ics?selected=42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[CONTENT_TYPE],
            "text/calendar; charset=utf-8"
        );
        assert_eq!(
            response.headers()[CONTENT_DISPOSITION],
            "attachment; filename=\"gff-schedule.ics\""
        );
        let body = hyper::body::to_bytes(response.into_body()).await.unwrap();
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(body.contains("SUMMARY:Film One\r\n"));
        assert!(body.contains("LOCATION:Cinema 1\r\n"));
        assert!(body.contains("DTSTART:20240110T180000Z\r\n"));
        assert!(body.contains("DTEND:20240110T200000Z\r\n"));
        assert!(!body.contains("Cinema 2"));
    }

    #[tokio::test]
    async fn test_export_encoded_and_unordered() {
        let (status, _, plain) = get(get_test_router(), "/export.ics?selected=42,43").await;
        assert_eq!(status, StatusCode::OK);
        let (status, _, encoded) = get(get_test_router(), "/export.ics?selected=43%2C42").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(plain, encoded);
        assert_eq!(plain.matches("BEGIN:VEVENT").count(), 2);
    }

    #[tokio::test]
    async fn test_export_stale_ids() {
        let (status, _, body) = get(get_test_router(), "/export.ics?selected=42,999").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.matches("BEGIN:VEVENT").count(), 1);
    }

    #[tokio::test]
    async fn test_export_repeated_selected() {
        let (status, _, body) = get(
            get_test_router(),
            "/export.ics?view=week&selected=43&selected=42",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("UID:43@goteborgfilmfestival\r\n"));
        assert!(!body.contains("UID:42@"));
    }

    #[tokio::test]
    async fn test_export_without_selection() {
        for uri in [
            "/export.ics",
            "/export.ics?selected=",
            "/export.ics?selected=,,",
            "/export.ics?view=week",
        ] {
            let (status, content_type, body) = get(get_test_router(), uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_ne!(content_type.as_deref(), Some("text/calendar; charset=utf-8"));
            assert_eq!(body, "No events selected");
        }
    }

    #[tokio::test]
    async fn test_serves_snapshot_data() {
        let snapshot = get_test_snapshot();
        let dir = tempfile::tempdir().unwrap();
        snapshot.save(dir.path()).unwrap();
        let app = router(Arc::new(snapshot), dir.path(), dir.path());
        let (status, _, body) = get(app, "/data/resources.json").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Film One"));
    }
}
