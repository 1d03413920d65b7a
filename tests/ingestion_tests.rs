//! Ingestion engine tests
//!
//! Deduplication, device checks and batch behaviour against temporary SQLite
//! databases.

mod common;

use std::sync::Arc;

use common::*;
use release_tracker::errors::TrackerError;
use release_tracker::services::IngestionService;
use release_tracker::storage::{Candidate, IngestOutcome, DEFAULT_CHANGELOG};

#[tokio::test]
async fn test_insert_then_duplicate_filename() {
    let (storage, _dir) = create_temp_storage().await;
    register(&storage, device("alpha", "ABCD")).await;
    let service = IngestionService::new(storage.clone());

    let candidate = as_candidate(release("alpha", "V1", date(2023, 1, 1)));
    assert_eq!(
        service.ingest(&candidate).await.unwrap(),
        IngestOutcome::Inserted
    );
    assert_eq!(
        service.ingest(&candidate).await.unwrap(),
        IngestOutcome::AlreadyPresent
    );
    assert_eq!(storage.count_updates().await.unwrap(), 1);
}

#[tokio::test]
async fn test_duplicate_md5_under_new_filename() {
    let (storage, _dir) = create_temp_storage().await;
    register(&storage, device("alpha", "ABCD")).await;
    let service = IngestionService::new(storage.clone());

    let mut first = release("alpha", "V1", date(2023, 1, 1));
    first.md5 = Some(md5('a'));
    let mut mirror = first.clone();
    mirror.filename = "alpha_mirror.zip".to_string();

    service.ingest(&as_candidate(first)).await.unwrap();
    assert_eq!(
        service.ingest(&as_candidate(mirror)).await.unwrap(),
        IngestOutcome::AlreadyPresent
    );
    assert_eq!(storage.count_updates().await.unwrap(), 1);
}

#[tokio::test]
async fn test_duplicate_md5_ignores_hex_case() {
    let (storage, _dir) = create_temp_storage().await;
    register(&storage, device("alpha", "ABCD")).await;
    let service = IngestionService::new(storage.clone());

    let mut first = release("alpha", "V1", date(2023, 1, 1));
    first.md5 = Some("0123456789abcdef0123456789abcdef".to_string());
    let mut mirror = first.clone();
    mirror.filename = "mirror.zip".to_string();
    mirror.md5 = Some("0123456789ABCDEF0123456789ABCDEF".to_string());

    service.ingest(&as_candidate(first.clone())).await.unwrap();
    assert_eq!(
        service.ingest(&as_candidate(mirror)).await.unwrap(),
        IngestOutcome::AlreadyPresent
    );
    assert_eq!(storage.count_updates().await.unwrap(), 1);

    // firmware: stored lower-case whatever case arrives first
    let mut tracked = device("beta", "WXYZ");
    tracked.firmware_updater = true;
    register(&storage, tracked).await;
    let upper = firmware("beta", "V1", Some("ABCDEF0123456789ABCDEF0123456789"));
    let lower = firmware("beta", "V2", Some("abcdef0123456789abcdef0123456789"));
    assert_eq!(
        service.ingest(&Candidate::Firmware(upper)).await.unwrap(),
        IngestOutcome::Inserted
    );
    assert_eq!(
        service.ingest(&Candidate::Firmware(lower)).await.unwrap(),
        IngestOutcome::AlreadyPresent
    );
    assert_eq!(storage.count_firmware().await.unwrap(), 1);
}

#[tokio::test]
async fn test_stored_md5_is_lower_case() {
    let (storage, _dir) = create_temp_storage().await;
    register(&storage, device("alpha", "ABCD")).await;

    let mut candidate = release("alpha", "V1", date(2023, 1, 1));
    candidate.md5 = Some("0123456789ABCDEF0123456789ABCDEF".to_string());
    ingest(&storage, candidate.clone()).await;

    let stored = storage
        .update_by_filename(&candidate.filename)
        .await
        .unwrap()
        .expect("stored");
    assert_eq!(
        stored.md5.as_deref(),
        Some("0123456789abcdef0123456789abcdef")
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_ingest_of_same_release() {
    let (storage, _dir) = create_temp_storage().await;
    register(&storage, device("alpha", "ABCD")).await;
    let mut tracked = device("beta", "WXYZ");
    tracked.firmware_updater = true;
    register(&storage, tracked).await;
    let service = Arc::new(IngestionService::new(storage.clone()));

    for round in 0..10 {
        let mut update = release("alpha", &format!("V{}", round), date(2023, 1, 1));
        update.md5 = Some(md5(char::from(b'0' + round as u8)));
        let candidates = [
            as_candidate(update),
            Candidate::Firmware(firmware("beta", &format!("V{}", round), None)),
        ];

        for candidate in candidates {
            let writers: Vec<_> = (0..2)
                .map(|_| {
                    let service = service.clone();
                    let candidate = candidate.clone();
                    tokio::spawn(async move { service.ingest(&candidate).await })
                })
                .collect();

            let mut outcomes = Vec::new();
            for writer in writers {
                outcomes.push(writer.await.unwrap().unwrap());
            }
            assert_eq!(
                outcomes
                    .iter()
                    .filter(|o| **o == IngestOutcome::Inserted)
                    .count(),
                1,
                "round {}: {:?}",
                round,
                outcomes
            );
            assert!(outcomes.contains(&IngestOutcome::AlreadyPresent));
        }
    }

    assert_eq!(storage.count_updates().await.unwrap(), 10);
    assert_eq!(storage.count_firmware().await.unwrap(), 10);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_batches_do_not_abort() {
    let (storage, _dir) = create_temp_storage().await;
    register(&storage, device("alpha", "ABCD")).await;
    let service = Arc::new(IngestionService::new(storage.clone()));

    let candidates: Arc<Vec<Candidate>> = Arc::new(
        (0..20)
            .map(|i| as_candidate(release("alpha", &format!("V{}", i), date(2023, 1, 1))))
            .collect(),
    );

    let batches: Vec<_> = (0..3)
        .map(|_| {
            let service = service.clone();
            let candidates = candidates.clone();
            tokio::spawn(async move { service.ingest_batch(&candidates).await })
        })
        .collect();

    let mut inserted = 0;
    for batch in batches {
        let report = batch.await.unwrap().unwrap();
        assert!(report.failed.is_empty());
        assert_eq!(report.total(), 20);
        inserted += report.inserted;
    }
    assert_eq!(inserted, 20);
    assert_eq!(storage.count_updates().await.unwrap(), 20);
}

#[tokio::test]
async fn test_releases_without_md5_are_not_merged() {
    let (storage, _dir) = create_temp_storage().await;
    register(&storage, device("alpha", "ABCD")).await;

    ingest(&storage, release("alpha", "V1", date(2023, 1, 1))).await;
    ingest(&storage, release("alpha", "V2", date(2023, 2, 1))).await;
    assert_eq!(storage.count_updates().await.unwrap(), 2);
}

#[tokio::test]
async fn test_unknown_device_is_constraint_violation() {
    let (storage, _dir) = create_temp_storage().await;
    let service = IngestionService::new(storage.clone());

    let err = service
        .ingest(&as_candidate(release("ghost", "V1", None)))
        .await
        .unwrap_err();
    assert!(matches!(err, TrackerError::ConstraintViolation(_)));
    assert_eq!(storage.count_updates().await.unwrap(), 0);
}

#[tokio::test]
async fn test_firmware_requires_tracking_flag() {
    let (storage, _dir) = create_temp_storage().await;
    register(&storage, device("alpha", "ABCD")).await;
    let mut tracked = device("beta", "WXYZ");
    tracked.firmware_updater = true;
    register(&storage, tracked).await;
    let service = IngestionService::new(storage.clone());

    let err = service
        .ingest(&Candidate::Firmware(firmware("alpha", "V1", None)))
        .await
        .unwrap_err();
    assert!(matches!(err, TrackerError::ConstraintViolation(_)));

    let candidate = Candidate::Firmware(firmware("beta", "V1", Some(&md5('b'))));
    assert_eq!(
        service.ingest(&candidate).await.unwrap(),
        IngestOutcome::Inserted
    );
    assert_eq!(
        service.ingest(&candidate).await.unwrap(),
        IngestOutcome::AlreadyPresent
    );
    assert!(storage.firmware_exists("beta", "V1").await.unwrap());
    assert_eq!(storage.count_firmware().await.unwrap(), 1);
}

#[tokio::test]
async fn test_validation_happens_before_storage() {
    let (storage, _dir) = create_temp_storage().await;
    register(&storage, device("alpha", "ABCD")).await;
    let service = IngestionService::new(storage.clone());

    let mut candidate = release("alpha", "V1", None);
    candidate.version = String::new();
    let err = service.ingest(&as_candidate(candidate)).await.unwrap_err();
    assert!(matches!(err, TrackerError::Validation(_)));
    assert_eq!(storage.count_updates().await.unwrap(), 0);
}

#[tokio::test]
async fn test_batch_continues_past_candidate_failures() {
    let (storage, _dir) = create_temp_storage().await;
    register(&storage, device("alpha", "ABCD")).await;
    let service = IngestionService::new(storage.clone());

    let good = release("alpha", "V1", date(2023, 1, 1));
    let candidates = vec![
        as_candidate(good.clone()),
        as_candidate(release("ghost", "V1", None)),
        as_candidate(good),
        as_candidate(release("alpha", "V2", date(2023, 3, 1))),
    ];

    let report = service.ingest_batch(&candidates).await.unwrap();
    assert_eq!(report.inserted, 2);
    assert_eq!(report.already_present, 1);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].filename, "ghost_V1.zip");
    assert_eq!(report.total(), 4);
    assert_eq!(storage.count_updates().await.unwrap(), 2);
}

#[tokio::test]
async fn test_stored_record_round_trip() {
    let (storage, _dir) = create_temp_storage().await;
    register(&storage, device("alpha", "ABCD")).await;

    let mut candidate = release("alpha", "V1", date(2023, 1, 1));
    candidate.md5 = Some(md5('c'));
    ingest(&storage, candidate.clone()).await;

    let stored = storage
        .update_by_filename(&candidate.filename)
        .await
        .unwrap()
        .expect("stored");
    assert_eq!(stored.version, "V1");
    assert_eq!(stored.md5, candidate.md5);
    assert_eq!(stored.date, candidate.date);
    assert_eq!(stored.size, Some(4_500_000_000));
    assert_eq!(stored.changelog, DEFAULT_CHANGELOG);
    assert!(storage.update_exists(&candidate.filename).await.unwrap());
    assert!(!storage.update_exists("missing.zip").await.unwrap());
}

#[tokio::test]
async fn test_register_device_is_idempotent() {
    let (storage, _dir) = create_temp_storage().await;
    let alpha = device("alpha", "ABCD");
    assert!(storage.register_device(&alpha).await.unwrap());
    assert!(!storage.register_device(&alpha).await.unwrap());
    assert!(storage.device_exists("alpha").await.unwrap());
    assert_eq!(storage.load_devices().await.unwrap().len(), 1);
}
