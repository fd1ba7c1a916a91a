use crate::common::{TestHarness, blob, dataset_content};

use ::common::storage::{ArtifactStore, BoxReader};
use tokio::io::AsyncReadExt;
use tracker::ArtifactError;

fn reader(data: &[u8]) -> BoxReader {
    Box::new(std::io::Cursor::new(data.to_vec()))
}

#[tokio::test]
async fn store_and_open_round_trip() {
    let harness = TestHarness::spawn().await;
    let artifacts = harness.services.artifacts();

    artifacts
        .add_artifacts("E1", vec![blob("model.pkl", "s3://bucket/model.pkl")], false)
        .await
        .unwrap();

    let size = artifacts
        .store_payload("E1", "model.pkl", reader(b"serialized model bytes"))
        .await
        .unwrap();
    assert_eq!(size, 22);

    let mut payload = Vec::new();
    artifacts
        .open_payload("E1", "model.pkl")
        .await
        .unwrap()
        .read_to_end(&mut payload)
        .await
        .unwrap();
    assert_eq!(payload, b"serialized model bytes");
}

#[tokio::test]
async fn reference_kinds_refuse_payloads() {
    let harness = TestHarness::spawn().await;
    let artifacts = harness.services.artifacts();

    artifacts
        .add_artifacts(
            "E1",
            vec![dataset_content(
                "train_data",
                "reviews",
                serde_json::json!({}),
            )],
            false,
        )
        .await
        .unwrap();

    let err = artifacts
        .store_payload("E1", "train_data", reader(b"bytes"))
        .await
        .unwrap_err();
    assert!(matches!(err, ArtifactError::InvalidDescriptor(_)));
}

#[tokio::test]
async fn payload_without_record_is_not_found() {
    let harness = TestHarness::spawn().await;
    let artifacts = harness.services.artifacts();

    let err = artifacts
        .store_payload("E1", "ghost", reader(b"bytes"))
        .await
        .unwrap_err();
    assert!(matches!(err, ArtifactError::NotFound(_)));
}

#[tokio::test]
async fn open_before_store_is_not_found() {
    let harness = TestHarness::spawn().await;
    let artifacts = harness.services.artifacts();

    artifacts
        .add_artifacts("E1", vec![blob("model.pkl", "s3://bucket/model.pkl")], false)
        .await
        .unwrap();

    let err = match artifacts.open_payload("E1", "model.pkl").await {
        Ok(_) => panic!("expected open_payload to fail"),
        Err(e) => e,
    };
    assert!(matches!(err, ArtifactError::NotFound(_)));
}

#[tokio::test]
async fn metadata_delete_leaves_payload_bytes_in_place() {
    let harness = TestHarness::spawn().await;
    let artifacts = harness.services.artifacts();

    artifacts
        .add_artifacts("E1", vec![blob("model.pkl", "s3://bucket/model.pkl")], false)
        .await
        .unwrap();
    artifacts
        .store_payload("E1", "model.pkl", reader(b"bytes"))
        .await
        .unwrap();

    let storage_key = artifacts.payload_key("E1", "model.pkl").unwrap();
    artifacts
        .delete_artifacts("E1", &["model.pkl".into()])
        .await
        .unwrap();

    // The row is gone; the bytes are not. Physical cleanup is a separate step.
    assert!(matches!(
        artifacts.get_artifact("E1", "model.pkl").await,
        Err(ArtifactError::NotFound(_))
    ));
    assert!(harness.store.exists(&storage_key).await.unwrap());
}

#[tokio::test]
async fn delete_payloads_removes_bytes_and_keeps_metadata() {
    let harness = TestHarness::spawn().await;
    let artifacts = harness.services.artifacts();

    artifacts
        .add_artifacts("E1", vec![blob("model.pkl", "s3://bucket/model.pkl")], false)
        .await
        .unwrap();
    artifacts
        .store_payload("E1", "model.pkl", reader(b"bytes"))
        .await
        .unwrap();

    artifacts
        .delete_payloads("E1", &["model.pkl".into()])
        .await
        .unwrap();

    let storage_key = artifacts.payload_key("E1", "model.pkl").unwrap();
    assert!(!harness.store.exists(&storage_key).await.unwrap());
    assert!(artifacts.get_artifact("E1", "model.pkl").await.is_ok());
}

#[tokio::test]
async fn delete_payloads_skips_reference_kinds() {
    let harness = TestHarness::spawn().await;
    let artifacts = harness.services.artifacts();

    artifacts
        .add_artifacts(
            "E1",
            vec![
                blob("model.pkl", "s3://bucket/model.pkl"),
                dataset_content("train_data", "reviews", serde_json::json!({})),
            ],
            false,
        )
        .await
        .unwrap();
    artifacts
        .store_payload("E1", "model.pkl", reader(b"bytes"))
        .await
        .unwrap();

    artifacts
        .delete_payloads("E1", &["model.pkl".into(), "train_data".into()])
        .await
        .unwrap();

    let storage_key = artifacts.payload_key("E1", "model.pkl").unwrap();
    assert!(!harness.store.exists(&storage_key).await.unwrap());
    // The dataset reference is untouched and still resolvable.
    let view = artifacts.get_artifact("E1", "train_data").await.unwrap();
    assert!(view.linked_version_id.is_some());
}

#[tokio::test]
async fn delete_payloads_validates_every_key_first() {
    let harness = TestHarness::spawn().await;
    let artifacts = harness.services.artifacts();

    artifacts
        .add_artifacts("E1", vec![blob("model.pkl", "s3://bucket/model.pkl")], false)
        .await
        .unwrap();
    artifacts
        .store_payload("E1", "model.pkl", reader(b"bytes"))
        .await
        .unwrap();

    let err = artifacts
        .delete_payloads("E1", &["model.pkl".into(), "ghost".into()])
        .await
        .unwrap_err();
    assert!(matches!(err, ArtifactError::NotFound(_)));

    // The known key's bytes were not deleted.
    let storage_key = artifacts.payload_key("E1", "model.pkl").unwrap();
    assert!(harness.store.exists(&storage_key).await.unwrap());
}
