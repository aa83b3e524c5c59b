//! Vector index client scenarios.

use std::sync::Arc;

use serde_json::json;

use cache_client::clients::vector::{
    IndexInfo, MetadataValue, SearchHit, SearchOptions, SimilarityMetric, VectorIndexItem,
};
use cache_client::transport::StatusCode;
use cache_client::{Creation, ErrorKind, Outcome, OutcomeFamily, Transport, VectorIndexClient};

mod common;
use common::{credentials, fast_configuration, InMemoryService, ScriptedTransport};

const INDEX: &str = "index";

fn vector_client(transport: Arc<dyn Transport>) -> VectorIndexClient {
    VectorIndexClient::builder()
        .configuration(fast_configuration())
        .credentials(credentials())
        .transport(transport)
        .build()
        .unwrap()
}

fn sample_items() -> Vec<VectorIndexItem> {
    vec![
        VectorIndexItem::new("test_item_1", vec![1.0, 2.0]).with_metadata("key1", "value1"),
        VectorIndexItem::new("test_item_2", vec![3.0, 4.0]).with_metadata("key2", "value2"),
        VectorIndexItem::new("test_item_3", vec![5.0, 6.0])
            .with_metadata("key1", "value3")
            .with_metadata("key3", "value3"),
    ]
}

async fn seeded(metric: SimilarityMetric) -> (Arc<InMemoryService>, VectorIndexClient) {
    let service = InMemoryService::new();
    let client = vector_client(service.clone());
    assert_eq!(client.create_index(INDEX, 2, metric).await, Creation::Created);
    assert!(client.upsert_item_batch(INDEX, &sample_items()).await.is_success());
    (service, client)
}

fn ids(hits: &[SearchHit]) -> Vec<&str> {
    hits.iter().map(|hit| hit.id.as_str()).collect()
}

fn keys(hit: &SearchHit) -> Vec<&str> {
    hit.metadata.keys().map(String::as_str).collect()
}

#[tokio::test]
async fn test_search_with_metadata_projection() {
    let (_, client) = seeded(SimilarityMetric::InnerProduct).await;

    let hits = client
        .search(INDEX, &[1.0, 2.0], SearchOptions::default().top_k(3))
        .await
        .into_result()
        .unwrap();
    assert_eq!(ids(&hits), vec!["test_item_3", "test_item_2", "test_item_1"]);
    assert_eq!(hits.iter().map(|hit| hit.score).collect::<Vec<_>>(), vec![17.0, 11.0, 5.0]);
    assert!(hits.iter().all(|hit| hit.metadata.is_empty()));

    let hits = client
        .search(INDEX, &[1.0, 2.0], SearchOptions::default().top_k(3).metadata_fields(["key1"]))
        .await
        .into_result()
        .unwrap();
    assert_eq!(keys(&hits[0]), vec!["key1"]);
    assert_eq!(hits[0].metadata["key1"], MetadataValue::from("value3"));
    assert!(hits[1].metadata.is_empty());
    assert_eq!(hits[2].metadata["key1"], MetadataValue::from("value1"));

    let requested = ["key1", "key2", "key3", "key4"];
    let hits = client
        .search(INDEX, &[1.0, 2.0], SearchOptions::default().top_k(3).metadata_fields(requested))
        .await
        .into_result()
        .unwrap();
    assert_eq!(keys(&hits[0]), vec!["key1", "key3"]);
    assert_eq!(keys(&hits[1]), vec!["key2"]);
    assert_eq!(keys(&hits[2]), vec!["key1"]);

    let all = client
        .search(INDEX, &[1.0, 2.0], SearchOptions::default().top_k(3).all_metadata())
        .await
        .into_result()
        .unwrap();
    assert_eq!(all, hits);
}

#[tokio::test]
async fn test_top_k_and_threshold() {
    let (_, client) = seeded(SimilarityMetric::InnerProduct).await;

    let hits = client
        .search(INDEX, &[1.0, 2.0], SearchOptions::default().top_k(1))
        .await
        .into_result()
        .unwrap();
    assert_eq!(ids(&hits), vec!["test_item_3"]);

    let hits = client
        .search(INDEX, &[1.0, 2.0], SearchOptions::default().score_threshold(10.0))
        .await
        .into_result()
        .unwrap();
    assert_eq!(ids(&hits), vec!["test_item_3", "test_item_2"]);
}

#[tokio::test]
async fn test_euclidean_ranks_closest_first() {
    let (_, client) = seeded(SimilarityMetric::EuclideanSimilarity).await;

    let hits =
        client.search(INDEX, &[5.0, 6.0], SearchOptions::default()).await.into_result().unwrap();
    assert_eq!(ids(&hits), vec!["test_item_3", "test_item_2", "test_item_1"]);
    assert_eq!(hits[0].score, 0.0);
}

#[tokio::test]
async fn test_cosine_ranks_by_direction() {
    let service = InMemoryService::new();
    let client = vector_client(service.clone());
    client.create_index(INDEX, 2, SimilarityMetric::CosineSimilarity).await;
    let items = vec![
        VectorIndexItem::new("far", vec![10.0, 0.0]),
        VectorIndexItem::new("aligned", vec![0.5, 0.5]),
    ];
    client.upsert_item_batch(INDEX, &items).await;

    let hits =
        client.search(INDEX, &[3.0, 3.0], SearchOptions::default()).await.into_result().unwrap();
    assert_eq!(ids(&hits), vec!["aligned", "far"]);
    assert!((hits[0].score - 1.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_dimension_mismatch_rejected_locally() {
    let (service, client) = seeded(SimilarityMetric::InnerProduct).await;
    let before = service.calls();

    let outcome = client.search(INDEX, &[1.0, 2.0, 3.0], SearchOptions::default()).await;
    assert_eq!(outcome.error().map(|e| e.kind()), Some(ErrorKind::InvalidArgument));

    let outcome = client.upsert_item_batch(INDEX, &[VectorIndexItem::new("x", vec![1.0])]).await;
    assert_eq!(outcome.error().map(|e| e.kind()), Some(ErrorKind::InvalidArgument));

    let mixed =
        vec![VectorIndexItem::new("a", vec![1.0, 2.0]), VectorIndexItem::new("b", vec![1.0])];
    let outcome = client.upsert_item_batch("other", &mixed).await;
    assert_eq!(outcome.error().map(|e| e.kind()), Some(ErrorKind::InvalidArgument));

    assert_eq!(service.calls(), before);
}

#[tokio::test]
async fn test_unknown_index_checked_by_service() {
    let service = InMemoryService::new();
    let owner = vector_client(service.clone());
    owner.create_index(INDEX, 2, SimilarityMetric::InnerProduct).await;

    let stranger = vector_client(service.clone());
    assert_eq!(stranger.known_dimensions(INDEX), None);
    let outcome = stranger.search(INDEX, &[1.0, 2.0, 3.0], SearchOptions::default()).await;
    assert_eq!(outcome.error().map(|e| e.kind()), Some(ErrorKind::InvalidArgument));
    assert!(outcome.error().and_then(|e| e.transport_error()).is_some());

    let indexes = stranger.list_indexes().await.into_result().unwrap();
    assert_eq!(
        indexes,
        vec![IndexInfo {
            name: INDEX.into(),
            num_dimensions: 2,
            similarity_metric: SimilarityMetric::InnerProduct
        }]
    );
    assert_eq!(stranger.known_dimensions(INDEX), Some(2));
}

#[tokio::test]
async fn test_index_lifecycle() {
    let (_, client) = seeded(SimilarityMetric::InnerProduct).await;

    let outcome = client.create_index(INDEX, 2, SimilarityMetric::InnerProduct).await;
    assert_eq!(outcome, Creation::AlreadyExists);

    let removed = vec!["test_item_1".to_string(), "test_item_3".to_string()];
    assert!(client.delete_item_batch(INDEX, &removed).await.is_success());
    let hits =
        client.search(INDEX, &[1.0, 2.0], SearchOptions::default()).await.into_result().unwrap();
    assert_eq!(ids(&hits), vec!["test_item_2"]);

    assert!(client.delete_index(INDEX).await.is_success());
    assert_eq!(client.known_dimensions(INDEX), None);
    let outcome = client.delete_index(INDEX).await;
    assert_eq!(outcome.error().map(|e| e.kind()), Some(ErrorKind::NotFound));
}

#[tokio::test]
async fn test_invalid_arguments() {
    let service = InMemoryService::new();
    let client = vector_client(service.clone());

    assert!(client.create_index(INDEX, 0, SimilarityMetric::InnerProduct).await.is_failure());
    assert!(client.create_index(" ", 2, SimilarityMetric::InnerProduct).await.is_failure());
    assert!(client.search(INDEX, &[1.0], SearchOptions::default().top_k(0)).await.is_failure());
    assert!(client.search(INDEX, &[], SearchOptions::default()).await.is_failure());
    assert!(client.upsert_item_batch(INDEX, &[]).await.is_failure());
    assert!(client.delete_item_batch(INDEX, &[]).await.is_failure());
    assert!(client.delete_item_batch(INDEX, &[String::new()]).await.is_failure());
    assert_eq!(service.calls(), 0);
}

#[tokio::test]
async fn test_hits_clamped_to_requested_fields() {
    let transport = Arc::new(ScriptedTransport::replying(json!({
        "hits": [
            {"id": "a", "score": 0.9, "metadata": {"key1": "x", "secret": "y", "count": 3}},
            {"id": "b", "score": 0.5}
        ]
    })));
    let client = vector_client(transport.clone());

    let hits = client
        .search(INDEX, &[1.0, 2.0], SearchOptions::default().metadata_fields(["key1", "count"]))
        .await
        .into_result()
        .unwrap();

    assert_eq!(keys(&hits[0]), vec!["count", "key1"]);
    assert_eq!(hits[0].metadata["count"], MetadataValue::Integer(3));
    assert!(hits[1].metadata.is_empty());

    let request = &transport.requests()[0];
    assert_eq!(request.payload["metadata_fields"], json!({"fields": ["key1", "count"]}));
    assert_eq!(request.payload["top_k"], json!(10));
}

#[tokio::test(start_paused = true)]
async fn test_search_retried_on_unavailable() {
    let transport = Arc::new(ScriptedTransport::sequence(vec![
        Err(StatusCode::Unavailable),
        Ok(json!({"hits": []})),
    ]));
    let client = vector_client(transport.clone());

    let outcome = client.search(INDEX, &[1.0], SearchOptions::default()).await;
    assert_eq!(outcome, Outcome::Success(Vec::new()));
    assert_eq!(transport.calls(), 2);

    let outcome = client.create_index("fresh", 1, SimilarityMetric::InnerProduct).await;
    assert!(outcome.is_failure());
    assert_eq!(transport.calls(), 3);
}
