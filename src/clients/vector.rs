//! Vector index client.
//!
//! # Responsibilities
//! - Create, list and delete indexes (control plane)
//! - Upsert, search and delete items (data plane)
//! - Reject vectors whose dimension is inconsistent before any call
//!
//! # Design Decisions
//! - Dimensions learned from `create_index` and `list_indexes` are cached per
//!   client in a concurrent map; unknown indexes are checked by the service
//! - Search hits only ever carry the metadata fields that were requested

use std::collections::BTreeMap;
use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::clients::validation::{
    validate_index_name, validate_name, validate_non_empty, validate_positive,
};
use crate::clients::wire::{call, Empty};
use crate::clients::ClientBuilder;
use crate::config::ConfigError;
use crate::errors::SdkError;
use crate::outcome::{Creation, Outcome, OutcomeFamily};
use crate::pipeline::Pipeline;
use crate::transport::MethodDescriptor;

pub type CreateVectorIndexResponse = Creation;
pub type DeleteVectorIndexResponse = Outcome<()>;
pub type ListVectorIndexesResponse = Outcome<Vec<IndexInfo>>;
pub type VectorUpsertItemBatchResponse = Outcome<()>;
pub type VectorSearchResponse = Outcome<Vec<SearchHit>>;
pub type VectorDeleteItemBatchResponse = Outcome<()>;

/// Results returned by `search` when `top_k` is not set.
pub const DEFAULT_TOP_K: u32 = 10;

const CREATE_INDEX: MethodDescriptor =
    MethodDescriptor::control("control_client.ScsControl/CreateIndex", false);
const DELETE_INDEX: MethodDescriptor =
    MethodDescriptor::control("control_client.ScsControl/DeleteIndex", true);
const LIST_INDEXES: MethodDescriptor =
    MethodDescriptor::control("control_client.ScsControl/ListIndexes", true);
const UPSERT_ITEM_BATCH: MethodDescriptor =
    MethodDescriptor::data("vectorindex.VectorIndex/UpsertItemBatch", true);
const SEARCH: MethodDescriptor = MethodDescriptor::data("vectorindex.VectorIndex/Search", true);
const DELETE_ITEM_BATCH: MethodDescriptor =
    MethodDescriptor::data("vectorindex.VectorIndex/DeleteItemBatch", true);

/// How search scores are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityMetric {
    /// Higher is closer.
    #[default]
    CosineSimilarity,
    /// Higher is closer.
    InnerProduct,
    /// Squared euclidean distance; lower is closer.
    EuclideanSimilarity,
}

/// One index as reported by `list_indexes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexInfo {
    pub name: String,
    pub num_dimensions: u32,
    pub similarity_metric: SimilarityMetric,
}

/// Metadata value attached to an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Boolean(bool),
    Integer(i64),
    Double(f64),
    String(String),
    ListOfStrings(Vec<String>),
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        MetadataValue::String(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        MetadataValue::String(value)
    }
}

impl From<i64> for MetadataValue {
    fn from(value: i64) -> Self {
        MetadataValue::Integer(value)
    }
}

impl From<f64> for MetadataValue {
    fn from(value: f64) -> Self {
        MetadataValue::Double(value)
    }
}

impl From<bool> for MetadataValue {
    fn from(value: bool) -> Self {
        MetadataValue::Boolean(value)
    }
}

impl From<Vec<String>> for MetadataValue {
    fn from(value: Vec<String>) -> Self {
        MetadataValue::ListOfStrings(value)
    }
}

pub type Metadata = BTreeMap<String, MetadataValue>;

/// An item stored in an index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorIndexItem {
    pub id: String,
    pub vector: Vec<f32>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl VectorIndexItem {
    pub fn new(id: impl Into<String>, vector: Vec<f32>) -> Self {
        Self { id: id.into(), vector, metadata: Metadata::new() }
    }

    pub fn with_metadata(
        mut self,
        key: impl Into<String>,
        value: impl Into<MetadataValue>,
    ) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Which metadata fields search hits carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataFields {
    /// Only these fields, where the item has them.
    Fields(Vec<String>),
    /// Every stored field.
    All,
}

impl Default for MetadataFields {
    fn default() -> Self {
        MetadataFields::Fields(Vec::new())
    }
}

impl MetadataFields {
    fn clamp(&self, metadata: &mut Metadata) {
        if let MetadataFields::Fields(fields) = self {
            metadata.retain(|key, _| fields.iter().any(|field| field == key));
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    pub top_k: u32,
    pub metadata_fields: MetadataFields,
    /// Drop hits scoring worse than this.
    pub score_threshold: Option<f64>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            metadata_fields: MetadataFields::default(),
            score_threshold: None,
        }
    }
}

impl SearchOptions {
    pub fn top_k(mut self, top_k: u32) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn metadata_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.metadata_fields = MetadataFields::Fields(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn all_metadata(mut self) -> Self {
        self.metadata_fields = MetadataFields::All;
        self
    }

    pub fn score_threshold(mut self, threshold: f64) -> Self {
        self.score_threshold = Some(threshold);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,
    pub score: f64,
    #[serde(default)]
    pub metadata: Metadata,
}

#[derive(Serialize)]
struct CreateIndexRequest<'a> {
    index_name: &'a str,
    num_dimensions: u32,
    similarity_metric: SimilarityMetric,
}

#[derive(Serialize)]
struct IndexNameRequest<'a> {
    index_name: &'a str,
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    index_name: &'a str,
    items: &'a [VectorIndexItem],
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    index_name: &'a str,
    query_vector: &'a [f32],
    top_k: u32,
    metadata_fields: &'a MetadataFields,
    #[serde(skip_serializing_if = "Option::is_none")]
    score_threshold: Option<f64>,
}

#[derive(Serialize)]
struct DeleteItemsRequest<'a> {
    index_name: &'a str,
    ids: &'a [String],
}

#[derive(Deserialize)]
struct ListIndexesBody {
    indexes: Vec<IndexInfo>,
}

#[derive(Deserialize)]
struct SearchBody {
    hits: Vec<SearchHit>,
}

/// Client for the vector index service.
#[derive(Debug, Clone)]
pub struct VectorIndexClient {
    pipeline: Pipeline,
    dimensions: Arc<DashMap<String, u32>>,
}

impl VectorIndexClient {
    pub fn builder() -> ClientBuilder<VectorIndexClient> {
        ClientBuilder::new()
    }

    /// Dimension recorded for `index_name`, if this client has seen it.
    pub fn known_dimensions(&self, index_name: &str) -> Option<u32> {
        self.dimensions.get(index_name).map(|entry| *entry)
    }

    pub async fn create_index(
        &self,
        index_name: &str,
        num_dimensions: u32,
        similarity_metric: SimilarityMetric,
    ) -> CreateVectorIndexResponse {
        if let Err(error) = validate_index_name(index_name)
            .and_then(|()| validate_positive("number of dimensions", num_dimensions))
        {
            return Creation::failure(error);
        }
        let request = CreateIndexRequest { index_name, num_dimensions, similarity_metric };
        let outcome =
            call(&self.pipeline, CREATE_INDEX, index_name, &request, |_: Empty| Creation::Created)
                .await;
        if outcome == Creation::Created {
            self.dimensions.insert(index_name.to_string(), num_dimensions);
        }
        outcome
    }

    pub async fn delete_index(&self, index_name: &str) -> DeleteVectorIndexResponse {
        if let Err(error) = validate_index_name(index_name) {
            return Outcome::failure(error);
        }
        let request = IndexNameRequest { index_name };
        let outcome: Outcome<()> =
            call(&self.pipeline, DELETE_INDEX, index_name, &request, |_: Empty| {
                Outcome::Success(())
            })
            .await;
        if outcome.is_success() {
            self.dimensions.remove(index_name);
        }
        outcome
    }

    pub async fn list_indexes(&self) -> ListVectorIndexesResponse {
        let outcome: Outcome<Vec<IndexInfo>> =
            call(&self.pipeline, LIST_INDEXES, "", &serde_json::json!({}), |body: ListIndexesBody| {
                Outcome::Success(body.indexes)
            })
            .await;
        if let Outcome::Success(indexes) = &outcome {
            for index in indexes {
                self.dimensions.insert(index.name.clone(), index.num_dimensions);
            }
        }
        outcome
    }

    /// Insert or replace items. Every vector must share one dimension.
    pub async fn upsert_item_batch(
        &self,
        index_name: &str,
        items: &[VectorIndexItem],
    ) -> VectorUpsertItemBatchResponse {
        if let Err(error) = self.validate_items(index_name, items) {
            return Outcome::failure(error);
        }
        let request = UpsertRequest { index_name, items };
        call(&self.pipeline, UPSERT_ITEM_BATCH, index_name, &request, |_: Empty| {
            Outcome::Success(())
        })
        .await
    }

    /// Nearest items to `query_vector`, best first.
    pub async fn search(
        &self,
        index_name: &str,
        query_vector: &[f32],
        options: SearchOptions,
    ) -> VectorSearchResponse {
        if let Err(error) = validate_index_name(index_name)
            .and_then(|()| validate_positive("top_k", options.top_k))
            .and_then(|()| validate_non_empty("query vector", query_vector))
            .and_then(|()| self.check_dimensions(index_name, query_vector.len()))
        {
            return Outcome::failure(error);
        }
        let request = SearchRequest {
            index_name,
            query_vector,
            top_k: options.top_k,
            metadata_fields: &options.metadata_fields,
            score_threshold: options.score_threshold,
        };
        let fields = &options.metadata_fields;
        call(&self.pipeline, SEARCH, index_name, &request, |body: SearchBody| {
            let hits = body
                .hits
                .into_iter()
                .map(|mut hit| {
                    fields.clamp(&mut hit.metadata);
                    hit
                })
                .collect();
            Outcome::Success(hits)
        })
        .await
    }

    pub async fn delete_item_batch(
        &self,
        index_name: &str,
        ids: &[String],
    ) -> VectorDeleteItemBatchResponse {
        if let Err(error) = validate_index_name(index_name)
            .and_then(|()| validate_non_empty("item ids", ids))
            .and_then(|()| ids.iter().try_for_each(|id| validate_name("item id", id)))
        {
            return Outcome::failure(error);
        }
        let request = DeleteItemsRequest { index_name, ids };
        call(&self.pipeline, DELETE_ITEM_BATCH, index_name, &request, |_: Empty| {
            Outcome::Success(())
        })
        .await
    }

    fn validate_items(&self, index_name: &str, items: &[VectorIndexItem]) -> Result<(), SdkError> {
        validate_index_name(index_name)?;
        validate_non_empty("items", items)?;

        let dimension = items[0].vector.len();
        if dimension == 0 {
            return Err(SdkError::invalid_argument(format!(
                "item '{}' has an empty vector",
                items[0].id
            )));
        }
        for item in items {
            validate_name("item id", &item.id)?;
            if item.vector.len() != dimension {
                return Err(SdkError::invalid_argument(format!(
                    "item '{}' has {} dimensions, expected {dimension}",
                    item.id,
                    item.vector.len()
                )));
            }
        }
        self.check_dimensions(index_name, dimension)
    }

    fn check_dimensions(&self, index_name: &str, dimension: usize) -> Result<(), SdkError> {
        match self.known_dimensions(index_name) {
            Some(expected) if expected as usize != dimension => {
                Err(SdkError::invalid_argument(format!(
                    "index '{index_name}' has {expected} dimensions, got a vector with {dimension}"
                )))
            }
            _ => Ok(()),
        }
    }
}

impl ClientBuilder<VectorIndexClient> {
    pub fn build(self) -> Result<VectorIndexClient, ConfigError> {
        Ok(VectorIndexClient { pipeline: self.pipeline()?, dimensions: Arc::new(DashMap::new()) })
    }
}
