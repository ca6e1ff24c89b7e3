//! Whole-workflow tests against the in-memory transport.

mod support;

use std::sync::Arc;
use std::time::Duration;

use aurorax_rust::models::JobStatusReport;
use aurorax_rust::services::SearchRequestBuilder;
use aurorax_rust::transport::{LocalTransport, TransportError};
use aurorax_rust::{
    ClientConfig, ConjunctionSearch, ConjunctionType, CriteriaBlock, DistanceMap, JobIdExtraction,
    PollOptions, SearchError, SearchOptions, SearchOutcome,
};
use serde_json::Value;
use support::{themis_swarm_search, ONE_CONJUNCTION};

fn search_with(transport: &LocalTransport) -> ConjunctionSearch {
    ConjunctionSearch::new(Arc::new(transport.clone()), &ClientConfig::default())
}

fn immediate() -> SearchOptions {
    SearchOptions {
        poll: PollOptions::default().with_interval(Duration::ZERO),
        ..SearchOptions::default()
    }
}

#[tokio::test]
async fn completed_search_normalizes_one_record() {
    let transport = LocalTransport::new()
        .with_job_id("abc123")
        .with_status_sequence(vec![JobStatusReport::pending(), JobStatusReport::ready(1024)])
        .with_result(ONE_CONJUNCTION);

    let result = search_with(&transport)
        .run(&themis_swarm_search(), &immediate())
        .await
        .unwrap();

    assert_eq!(transport.status_query_count(), 2);
    assert_eq!(transport.download_count(), 1);
    assert_eq!(result.request_id.as_deref(), Some("abc123"));
    assert_eq!(result.len(), 1);

    let conjunction = &result.conjunctions[0];
    assert_eq!(conjunction.start_dt, "2020-01-01T00:00:00");
    assert_eq!(conjunction.end_dt, "2020-01-01T00:01:59");
    assert_eq!(conjunction.data_sources.len(), 2);
    assert_eq!(conjunction.events.len(), 1);
    assert_eq!(conjunction.events[0].end_dt, "2020-01-01T00:01:59");
}

#[tokio::test]
async fn submitted_payload_matches_request() {
    let transport = LocalTransport::new();
    let builder = themis_swarm_search().conjunction_types([ConjunctionType::Nbtrace]);
    search_with(&transport).run(&builder, &immediate()).await.unwrap();

    let payloads = transport.submitted_payloads();
    assert_eq!(payloads.len(), 1);
    let body: Value = serde_json::from_str(&payloads[0]).unwrap();
    assert_eq!(body["start"], "2020-01-01T00:00:00");
    assert_eq!(body["end"], "2020-01-01T06:59:59");
    assert_eq!(body["ground"][0]["programs"][0], "themis-asi");
    assert_eq!(body["space"][0]["programs"][0], "swarm");
    assert_eq!(body["events"], serde_json::json!([]));
    assert_eq!(body["conjunction_types"], serde_json::json!(["nbtrace"]));
    assert_eq!(body["max_distances"], serde_json::json!({"ground1-space1": 500.0}));
}

#[tokio::test]
async fn dry_run_never_submits() {
    let transport = LocalTransport::new();
    let options = SearchOptions {
        dry_run: true,
        ..immediate()
    };

    let search = search_with(&transport);
    let result = search.run(&themis_swarm_search(), &options).await.unwrap();
    assert!(result.is_empty());

    match search.execute(&themis_swarm_search(), &options).await.unwrap() {
        SearchOutcome::DryRun { payload } => assert!(payload.contains("ground1-space1")),
        other => panic!("expected DryRun, got {:?}", other),
    }
    assert_eq!(transport.submit_count(), 0);
}

#[tokio::test]
async fn missing_distance_pair_never_submits() {
    let transport = LocalTransport::new();
    let distances: DistanceMap = [("ground1-space1", 500.0)].into_iter().collect();
    let builder = SearchRequestBuilder::new("2020-01-01T00:00:00", "2020-01-01T06:59:59", distances)
        .ground(vec![CriteriaBlock::new().with_programs(["themis-asi"])])
        .space(vec![
            CriteriaBlock::new().with_programs(["swarm"]),
            CriteriaBlock::new().with_programs(["dmsp-ssusi"]),
        ]);

    let search = search_with(&transport);
    let err = search.execute(&builder, &immediate()).await.unwrap_err();
    match err {
        SearchError::DistanceValidation { missing_key } => assert_eq!(missing_key, "ground1-space2"),
        other => panic!("expected DistanceValidation, got {:?}", other),
    }

    let result = search.run(&builder, &immediate()).await.unwrap();
    assert!(result.is_empty());
    assert_eq!(transport.submit_count(), 0);
}

#[tokio::test]
async fn too_many_blocks_yields_empty_result() {
    let transport = LocalTransport::new();
    let builder = SearchRequestBuilder::new("2020-01-01T00:00:00", "2020-01-01T06:59:59", 500.0)
        .ground(vec![CriteriaBlock::new(); 6])
        .space(vec![CriteriaBlock::new(); 5]);

    let result = search_with(&transport).run(&builder, &immediate()).await.unwrap();
    assert!(result.is_empty());
    assert_eq!(transport.submit_count(), 0);
}

#[tokio::test]
async fn transport_failure_propagates() {
    let transport = LocalTransport::new();
    transport.set_healthy(false);

    let err = search_with(&transport)
        .run(&themis_swarm_search(), &immediate())
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::Transport(TransportError::Connection { .. })));
}

#[tokio::test]
async fn rejected_submission_propagates_with_body() {
    let transport = LocalTransport::new().with_submit_response(400, "invalid program 'foo'");

    let err = search_with(&transport)
        .run(&themis_swarm_search(), &immediate())
        .await
        .unwrap_err();
    match err {
        SearchError::Transport(e) => {
            assert_eq!(e.status(), Some(400));
            assert!(e.to_string().contains("invalid program"));
        }
        other => panic!("expected Transport, got {:?}", other),
    }
}

#[tokio::test]
async fn job_failure_yields_empty_result_without_download() {
    let transport = LocalTransport::new().with_status_sequence(vec![
        JobStatusReport::pending(),
        JobStatusReport::failed("search exceeded maximum runtime"),
    ]);

    let result = search_with(&transport)
        .run(&themis_swarm_search(), &immediate())
        .await
        .unwrap();
    assert!(result.is_empty());
    assert_eq!(transport.status_query_count(), 2);
    assert_eq!(transport.download_count(), 0);
}

#[tokio::test]
async fn malformed_result_yields_empty_result() {
    let transport = LocalTransport::new().with_result("<html>oops</html>");

    let search = search_with(&transport);
    let err = search
        .execute(&themis_swarm_search(), &immediate())
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::MalformedResponse(_)));

    let result = search.run(&themis_swarm_search(), &immediate()).await.unwrap();
    assert!(result.is_empty());
}

#[tokio::test]
async fn fixed_width_extraction_reads_uuid() {
    let id = "0f8fad5b-d9cb-469f-a165-70867728950e";
    let transport = LocalTransport::new()
        .with_job_id(id)
        .with_location(format!("https://api.aurorax.space/api/v1/conjunctions/requests/{}", id))
        .with_result(ONE_CONJUNCTION);
    let config = ClientConfig {
        job_id_extraction: JobIdExtraction::FixedWidth,
        ..ClientConfig::default()
    };

    let search = ConjunctionSearch::new(Arc::new(transport.clone()), &config);
    let result = search.run(&themis_swarm_search(), &immediate()).await.unwrap();
    assert_eq!(result.request_id.as_deref(), Some(id));
    assert_eq!(result.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn deadline_cancels_backend_job() {
    let transport = LocalTransport::new()
        .with_job_id("abc123")
        .with_status_sequence(vec![JobStatusReport::pending()]);
    let options = SearchOptions {
        poll: PollOptions::default()
            .with_interval(Duration::from_secs(2))
            .with_deadline(Duration::from_secs(5)),
        ..SearchOptions::default()
    };

    let search = search_with(&transport);
    let err = search
        .execute(&themis_swarm_search(), &options)
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::PollTimeout { .. }));
    assert_eq!(transport.cancellations(), vec!["abc123".to_string()]);

    // The facade treats a timeout like any other non-transport failure.
    let transport = LocalTransport::new().with_status_sequence(vec![JobStatusReport::pending()]);
    let result = search_with(&transport).run(&themis_swarm_search(), &options).await.unwrap();
    assert!(result.is_empty());
    assert_eq!(transport.cancellations().len(), 1);
}

#[tokio::test]
async fn concurrent_searches_run_independently() {
    let first = LocalTransport::new().with_job_id("first").with_result(ONE_CONJUNCTION);
    let second = LocalTransport::new().with_job_id("second");

    let (first_search, second_search) = (search_with(&first), search_with(&second));
    let (first_query, second_query) = (themis_swarm_search(), themis_swarm_search());
    let (first_opts, second_opts) = (immediate(), immediate());
    let (a, b) = tokio::join!(
        first_search.run(&first_query, &first_opts),
        second_search.run(&second_query, &second_opts),
    );
    assert_eq!(a.unwrap().len(), 1);
    assert!(b.unwrap().is_empty());
}
