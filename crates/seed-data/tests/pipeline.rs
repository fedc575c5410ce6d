//! End-to-end seeding runs against the in-memory sink.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use rand::{SeedableRng, rngs::StdRng};
use seed_data::db::{MemorySink, SinkEvent};
use seed_data::generators::{IdentityStrategy, WorkspaceGenConfig};
use seed_data::pipeline::{BatchPlan, FailurePolicy, RemainderPolicy, SeedError, Seeder};
use seed_data::sources::{
    ContentFetchError, ContentKind, ContentPage, ContentProvider, ContentSource, ContentTargets,
    ProceduralProvider,
};

const TARGETS: ContentTargets = ContentTargets {
    words: 60,
    sentences: 60,
};

fn procedural() -> ContentSource<ProceduralProvider> {
    ContentSource::new(ProceduralProvider::new(11).with_page_size(30).with_url_pages(2))
}

fn plan(total: u64, batch_size: usize) -> BatchPlan {
    BatchPlan::new(total, batch_size, RemainderPolicy::ShortFinalBatch).unwrap()
}

/// Provider that always offers another page and counts calls.
struct EndlessProvider {
    calls: AtomicUsize,
}

#[async_trait]
impl ContentProvider for EndlessProvider {
    async fn fetch(
        &self,
        kind: ContentKind,
        _cursor: Option<&str>,
    ) -> Result<ContentPage, ContentFetchError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let item = match kind {
            ContentKind::ImageUrls => format!("https://img.test/{call}.jpg"),
            ContentKind::DescriptionWords => "kale".to_string(),
            ContentKind::WorkspaceSentences => "Quiet desk.".to_string(),
        };
        Ok(ContentPage {
            items: vec![item],
            next_cursor: Some("more".to_string()),
        })
    }
}

struct UnavailableProvider;

#[async_trait]
impl ContentProvider for UnavailableProvider {
    async fn fetch(
        &self,
        _kind: ContentKind,
        _cursor: Option<&str>,
    ) -> Result<ContentPage, ContentFetchError> {
        Err(ContentFetchError::Status {
            provider: "test",
            status: 502,
        })
    }
}

#[tokio::test]
async fn test_twenty_workspaces_in_four_batches() {
    let source = procedural();
    let seeder = Seeder::new(MemorySink::new(), plan(20, 5)).with_content_targets(TARGETS);
    let mut rng = StdRng::seed_from_u64(20);

    let report = seeder.run(&source, &mut rng).await.unwrap();

    assert_eq!(report.batches_planned, 4);
    assert_eq!(report.batches_written, 4);
    assert_eq!(report.workspaces_written, 20);

    let sink = seeder.sink();
    let inserts: Vec<SinkEvent> = sink
        .events()
        .into_iter()
        .filter(|e| matches!(e, SinkEvent::BulkInsert { .. }))
        .collect();
    assert_eq!(inserts, vec![SinkEvent::BulkInsert { records: 5 }; 4]);

    // Same seed, same pool
    let pool = source.fetch_pool(TARGETS).await.unwrap();
    let workspaces = sink.workspaces();
    assert_eq!(workspaces.len(), 20);

    let mut photo_total = 0;
    for workspace in &workspaces {
        assert!((4..=7).contains(&workspace.photos.len()));
        assert!(pool.sentences.contains(&workspace.description));
        for photo in &workspace.photos {
            assert!(pool.urls.contains(&photo.url));
            assert!(pool.words.contains(&photo.description));
        }
        photo_total += workspace.photos.len() as u64;
    }
    assert_eq!(report.photos_written, photo_total);
}

#[tokio::test]
async fn test_phase_order() {
    let seeder = Seeder::new(MemorySink::new(), plan(4, 2)).with_content_targets(TARGETS);
    let mut rng = StdRng::seed_from_u64(1);
    seeder.run(&procedural(), &mut rng).await.unwrap();

    assert_eq!(
        seeder.sink().events(),
        vec![
            SinkEvent::Dropped,
            SinkEvent::Created,
            SinkEvent::DurabilityRelaxed,
            SinkEvent::BulkInsert { records: 2 },
            SinkEvent::BulkInsert { records: 2 },
            SinkEvent::DurabilityRestored,
            SinkEvent::IndexesCreated,
        ]
    );
}

#[tokio::test]
async fn test_skip_and_continue_past_failure() {
    let seeder = Seeder::new(MemorySink::new().failing_insert(1), plan(20, 5))
        .with_failure_policy(FailurePolicy::SkipAndContinue)
        .with_content_targets(TARGETS);
    let mut rng = StdRng::seed_from_u64(2);

    let report = seeder.run(&procedural(), &mut rng).await.unwrap();

    assert_eq!(report.batches_written, 3);
    assert_eq!(report.batches_failed, 1);
    assert_eq!(report.workspaces_written, 15);
    assert_eq!(seeder.sink().insert_calls(), 4);

    // Sequences of the failed batch are not reused
    let sequences: Vec<u64> = seeder.sink().workspaces().iter().map(|w| w.sequence).collect();
    let expected: Vec<u64> = (1..=5).chain(11..=20).collect();
    assert_eq!(sequences, expected);
}

#[tokio::test]
async fn test_abort_stops_but_still_finalizes() {
    let seeder = Seeder::new(MemorySink::new().failing_insert(1), plan(20, 5))
        .with_content_targets(TARGETS);
    let mut rng = StdRng::seed_from_u64(3);

    let err = seeder.run(&procedural(), &mut rng).await.unwrap_err();

    match err {
        SeedError::BatchWrite {
            batch_index,
            workspaces_written,
            ..
        } => {
            assert_eq!(batch_index, 1);
            assert_eq!(workspaces_written, 5);
        }
        other => panic!("expected batch write error, got {other}"),
    }

    let sink = seeder.sink();
    assert_eq!(sink.insert_calls(), 2);
    let events = sink.events();
    assert_eq!(
        &events[events.len() - 2..],
        &[SinkEvent::DurabilityRestored, SinkEvent::IndexesCreated]
    );
}

#[tokio::test]
async fn test_fetch_failure_never_touches_sink() {
    let seeder = Seeder::new(MemorySink::new(), plan(20, 5));
    let mut rng = StdRng::seed_from_u64(4);

    let err = seeder
        .run(&ContentSource::new(UnavailableProvider), &mut rng)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SeedError::ContentFetch(ContentFetchError::Status { status: 502, .. })
    ));
    assert!(seeder.sink().events().is_empty());
}

#[tokio::test]
async fn test_prepare_failure_aborts_before_loading() {
    let seeder =
        Seeder::new(MemorySink::new().failing_prepare(), plan(10, 5)).with_content_targets(TARGETS);
    let mut rng = StdRng::seed_from_u64(5);

    let err = seeder.run(&procedural(), &mut rng).await.unwrap_err();

    assert!(matches!(err, SeedError::SchemaPrep(_)));
    assert_eq!(seeder.sink().insert_calls(), 0);
}

#[tokio::test]
async fn test_empty_run_still_finalizes() {
    let seeder = Seeder::new(MemorySink::new(), plan(0, 5)).with_content_targets(TARGETS);
    let mut rng = StdRng::seed_from_u64(6);

    let report = seeder.run(&procedural(), &mut rng).await.unwrap();

    assert_eq!(report.batches_planned, 0);
    assert_eq!(report.workspaces_written, 0);
    assert_eq!(
        seeder.sink().events().last(),
        Some(&SinkEvent::IndexesCreated)
    );
}

#[tokio::test]
async fn test_batches_never_exceed_batch_size() {
    let seeder =
        Seeder::new(MemorySink::dry_run(), plan(1_003, 100)).with_content_targets(TARGETS);
    let mut rng = StdRng::seed_from_u64(7);

    let report = seeder.run(&procedural(), &mut rng).await.unwrap();

    assert_eq!(report.batches_written, 11);
    assert_eq!(report.workspaces_written, 1_003);
    assert_eq!(seeder.sink().largest_batch(), 100);
    assert!(seeder.sink().workspaces().is_empty());
}

#[tokio::test]
async fn test_partitioned_identities_are_unique() {
    let generator = WorkspaceGenConfig {
        identity: IdentityStrategy::Partitioned { partitions: 3 },
        photos_per_workspace: 1..=1,
        ..Default::default()
    };
    let seeder = Seeder::new(MemorySink::new(), plan(30, 7))
        .with_generator(generator)
        .with_content_targets(TARGETS);
    let mut rng = StdRng::seed_from_u64(8);

    seeder.run(&procedural(), &mut rng).await.unwrap();

    let workspaces = seeder.sink().workspaces();
    let keys: HashSet<&str> = workspaces.iter().map(|w| w.key.as_str()).collect();
    assert_eq!(keys.len(), 30);
    for workspace in &workspaces {
        let (partition, padded) = workspace.key.split_once(':').unwrap();
        assert_eq!(partition.parse::<u64>().unwrap(), workspace.sequence % 3);
        assert_eq!(padded.len(), 9);
    }
}

#[tokio::test]
async fn test_page_cap_bounds_provider_calls() {
    let source = ContentSource::new(EndlessProvider {
        calls: AtomicUsize::new(0),
    })
    .with_max_pages(3);
    let targets = ContentTargets {
        words: 100,
        sentences: 100,
    };

    let pool = source.fetch_pool(targets).await.unwrap();

    assert_eq!(pool.urls.len(), 3);
    assert_eq!(pool.words.len(), 3);
    assert_eq!(pool.sentences.len(), 3);
}

#[tokio::test]
async fn test_rejected_workspaces_do_not_count_photos() {
    let seeder = Seeder::new(MemorySink::new().rejecting_key("3"), plan(10, 5))
        .with_content_targets(TARGETS);
    let mut rng = StdRng::seed_from_u64(9);

    let report = seeder.run(&procedural(), &mut rng).await.unwrap();

    let stored = seeder.sink().workspaces();
    let stored_photos: u64 = stored.iter().map(|w| w.photos.len() as u64).sum();
    assert_eq!(report.workspaces_written, 9);
    assert_eq!(report.records_rejected, 1);
    assert_eq!(report.photos_written, stored_photos);
    assert!(stored.iter().all(|w| w.key != "3"));
}
