//! Shared transports and fixtures for integration tests.

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose;
use base64::Engine as _;
use serde_json::{json, Map, Value};
use tokio::time::Instant;

use cache_client::config::Configuration;
use cache_client::middleware::headers::AUTHORIZATION_HEADER;
use cache_client::pipeline::RESOURCE_HEADER;
use cache_client::resilience::{ExponentialBackoff, FixedCountRetryStrategy};
use cache_client::transport::StatusCode;
use cache_client::{
    CacheClient, CredentialSource, Transport, TransportError, TransportRequest, TransportResponse,
};

pub const TOKEN: &str = "test-token";
pub const CONTROL_ENDPOINT: &str = "control.test.local";
pub const CACHE_ENDPOINT: &str = "cache.test.local";

pub fn credentials() -> CredentialSource {
    CredentialSource::Resolved {
        auth_token: TOKEN.to_string(),
        control_endpoint: CONTROL_ENDPOINT.to_string(),
        cache_endpoint: CACHE_ENDPOINT.to_string(),
    }
}

/// Three attempts, short backoff, generous timeout.
pub fn fast_configuration() -> Configuration {
    let backoff = ExponentialBackoff::new(Duration::from_millis(5), Duration::from_millis(20));
    Configuration::builder()
        .retry_strategy(Arc::new(FixedCountRetryStrategy::new(3).with_backoff(backoff)))
        .build()
        .unwrap()
}

pub fn cache_client(transport: Arc<dyn Transport>) -> CacheClient {
    CacheClient::builder()
        .configuration(fast_configuration())
        .credentials(credentials())
        .transport(transport)
        .build()
        .unwrap()
}

type Reply = Result<TransportResponse, TransportError>;
type Handler = dyn Fn(&TransportRequest, u32) -> Reply + Send + Sync;

/// Transport whose replies are computed by a closure from the request and
/// the 0-based invocation index.
pub struct ScriptedTransport {
    handler: Box<Handler>,
    latency: Option<Duration>,
    calls: AtomicU32,
    requests: Mutex<Vec<TransportRequest>>,
}

impl ScriptedTransport {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&TransportRequest, u32) -> Reply + Send + Sync + 'static,
    {
        Self {
            handler: Box::new(handler),
            latency: None,
            calls: AtomicU32::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Every call fails with `status`.
    pub fn failing(status: StatusCode) -> Self {
        Self::new(move |_, _| Err(TransportError::new(status, "scripted failure")))
    }

    /// Every call succeeds with `payload`.
    pub fn replying(payload: Value) -> Self {
        Self::new(move |_, _| Ok(TransportResponse::new(payload.clone())))
    }

    /// Replies in order; once exhausted every call fails with `Unavailable`.
    pub fn sequence(replies: Vec<Result<Value, StatusCode>>) -> Self {
        Self::new(move |_, index| match replies.get(index as usize) {
            Some(Ok(payload)) => Ok(TransportResponse::new(payload.clone())),
            Some(Err(status)) => Err(TransportError::new(*status, "scripted failure")),
            None => Err(TransportError::new(StatusCode::Unavailable, "script exhausted")),
        })
    }

    /// Sleep before replying.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl fmt::Debug for ScriptedTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptedTransport").field("calls", &self.calls()).finish()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn invoke(&self, request: TransportRequest, _deadline: Instant) -> Reply {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        (self.handler)(&request, index)
    }
}

enum ItemData {
    Scalar(String),
    Set(BTreeSet<String>),
    Dictionary(BTreeMap<String, String>),
    List(VecDeque<String>),
    SortedSet(BTreeMap<String, f64>),
}

struct Item {
    data: ItemData,
    expires_at: Instant,
}

#[derive(Default)]
struct CacheData {
    items: HashMap<String, Item>,
    leaderboards: HashMap<String, BTreeMap<u32, f64>>,
}

impl CacheData {
    fn live(&mut self, key: &str) -> Option<&mut Item> {
        let expired = self.items.get(key).is_some_and(|item| item.expires_at <= Instant::now());
        if expired {
            self.items.remove(key);
        }
        self.items.get_mut(key)
    }
}

struct Index {
    dimensions: u32,
    metric: String,
    items: BTreeMap<String, (Vec<f64>, Map<String, Value>)>,
}

#[derive(Default)]
struct State {
    caches: HashMap<String, CacheData>,
    indexes: HashMap<String, Index>,
    published: Vec<(String, String, Value)>,
}

/// In-memory stand-in for the remote service.
///
/// Checks the auth header, routes by method name and keeps all state in a
/// single mutex.
#[derive(Default)]
pub struct InMemoryService {
    state: Mutex<State>,
    calls: AtomicU32,
}

impl fmt::Debug for InMemoryService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryService").field("calls", &self.calls()).finish()
    }
}

fn err(status: StatusCode, detail: &str) -> TransportError {
    TransportError::new(status, detail)
}

fn not_found(what: &str) -> TransportError {
    err(StatusCode::NotFound, &format!("{what} not found"))
}

fn wrong_type() -> TransportError {
    err(StatusCode::FailedPrecondition, "wrong item type")
}

fn missing(name: &str) -> TransportError {
    err(StatusCode::InvalidArgument, &format!("missing {name}"))
}

fn str_field<'a>(payload: &'a Value, name: &str) -> Result<&'a str, TransportError> {
    payload[name].as_str().ok_or_else(|| missing(name))
}

fn u64_field(payload: &Value, name: &str) -> Result<u64, TransportError> {
    payload[name].as_u64().ok_or_else(|| missing(name))
}

fn strings(payload: &Value, name: &str) -> Vec<String> {
    payload[name]
        .as_array()
        .map(|values| values.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
        .unwrap_or_default()
}

fn floats(value: &Value) -> Vec<f64> {
    value
        .as_array()
        .map(|values| values.iter().filter_map(Value::as_f64).collect())
        .unwrap_or_default()
}

fn decode_text(encoded: &str) -> Option<String> {
    let bytes = general_purpose::STANDARD.decode(encoded).ok()?;
    String::from_utf8(bytes).ok()
}

fn encode_text(text: &str) -> String {
    general_purpose::STANDARD.encode(text)
}

fn scalar(payload: &Value) -> Result<Item, TransportError> {
    let value = str_field(payload, "value")?.to_string();
    Ok(Item { data: ItemData::Scalar(value), expires_at: expiry(payload)? })
}

fn expiry(payload: &Value) -> Result<Instant, TransportError> {
    Ok(Instant::now() + Duration::from_millis(u64_field(payload, "ttl_ms")?))
}

fn score(metric: &str, a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    match metric {
        "inner_product" => dot,
        "euclidean_similarity" => a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum(),
        _ => {
            let norm = |v: &[f64]| v.iter().map(|x| x * x).sum::<f64>().sqrt();
            dot / (norm(a) * norm(b))
        }
    }
}

impl InMemoryService {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Service with the named caches already created.
    pub fn with_caches(names: &[&str]) -> Arc<Self> {
        let service = Self::default();
        {
            let mut state = service.state.lock().unwrap();
            for name in names {
                state.caches.insert(name.to_string(), CacheData::default());
            }
        }
        Arc::new(service)
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Messages published so far as `(cache, topic, value)`.
    pub fn published(&self) -> Vec<(String, String, Value)> {
        self.state.lock().unwrap().published.clone()
    }

    fn handle(&self, request: &TransportRequest) -> Result<Value, TransportError> {
        if request.metadata.get(AUTHORIZATION_HEADER).map(String::as_str) != Some(TOKEN) {
            return Err(err(StatusCode::Unauthenticated, "invalid auth token"));
        }

        let payload = &request.payload;
        let mut state = self.state.lock().unwrap();
        let name = request.method.name();

        match name {
            "CreateCache" => {
                let cache = str_field(payload, "cache_name")?;
                if state.caches.contains_key(cache) {
                    return Err(err(StatusCode::AlreadyExists, "cache already exists"));
                }
                state.caches.insert(cache.to_string(), CacheData::default());
                Ok(json!({}))
            }
            "DeleteCache" => {
                let cache = str_field(payload, "cache_name")?;
                state.caches.remove(cache).ok_or_else(|| not_found("cache"))?;
                Ok(json!({}))
            }
            "FlushCache" => {
                let cache = str_field(payload, "cache_name")?;
                let data = state.caches.get_mut(cache).ok_or_else(|| not_found("cache"))?;
                *data = CacheData::default();
                Ok(json!({}))
            }
            "ListCaches" => {
                let mut names: Vec<&String> = state.caches.keys().collect();
                names.sort();
                let caches: Vec<Value> =
                    names.into_iter().map(|name| json!({ "name": name })).collect();
                Ok(json!({ "caches": caches }))
            }
            "Ping" => Ok(json!({})),
            "CreateIndex" | "DeleteIndex" | "ListIndexes" | "UpsertItemBatch" | "Search"
            | "DeleteItemBatch" => Self::handle_vector(&mut state, name, payload),
            "Publish" => {
                let cache = str_field(payload, "cache_name")?;
                if !state.caches.contains_key(cache) {
                    return Err(not_found("cache"));
                }
                let topic = str_field(payload, "topic")?.to_string();
                state.published.push((cache.to_string(), topic, payload["value"].clone()));
                Ok(json!({}))
            }
            _ => {
                let cache = request
                    .metadata
                    .get(RESOURCE_HEADER)
                    .ok_or_else(|| err(StatusCode::InvalidArgument, "missing cache header"))?;
                let data = state.caches.get_mut(cache).ok_or_else(|| not_found("cache"))?;
                Self::handle_data(data, name, payload)
            }
        }
    }

    fn handle_data(
        data: &mut CacheData,
        name: &str,
        payload: &Value,
    ) -> Result<Value, TransportError> {
        match name {
            "Get" => match data.live(str_field(payload, "key")?) {
                Some(Item { data: ItemData::Scalar(value), .. }) => {
                    Ok(json!({ "result": "hit", "value": value }))
                }
                Some(_) => Err(wrong_type()),
                None => Ok(json!({ "result": "miss" })),
            },
            "Set" => {
                let item = scalar(payload)?;
                data.items.insert(str_field(payload, "key")?.to_string(), item);
                Ok(json!({}))
            }
            "SetIfNotExists" => {
                let key = str_field(payload, "key")?;
                if data.live(key).is_some() {
                    return Ok(json!({ "result": "not_stored" }));
                }
                let item = scalar(payload)?;
                data.items.insert(key.to_string(), item);
                Ok(json!({ "result": "stored" }))
            }
            "Delete" => {
                data.items.remove(str_field(payload, "key")?);
                Ok(json!({}))
            }
            "Increment" => {
                let key = str_field(payload, "key")?;
                let amount = payload["amount"].as_i64().unwrap_or(0);
                let expires_at = expiry(payload)?;
                let current = match data.live(key) {
                    Some(Item { data: ItemData::Scalar(value), .. }) => decode_text(value)
                        .and_then(|text| text.parse::<i64>().ok())
                        .ok_or_else(|| {
                            err(StatusCode::FailedPrecondition, "value is not an integer")
                        })?,
                    Some(_) => return Err(wrong_type()),
                    None => 0,
                };
                let value = current + amount;
                data.items.insert(
                    key.to_string(),
                    Item { data: ItemData::Scalar(encode_text(&value.to_string())), expires_at },
                );
                Ok(json!({ "value": value }))
            }
            "KeysExist" => {
                let exists: Vec<bool> =
                    strings(payload, "keys").iter().map(|key| data.live(key).is_some()).collect();
                Ok(json!({ "exists": exists }))
            }
            "ItemGetTtl" => match data.live(str_field(payload, "key")?) {
                Some(item) => {
                    let remaining = item.expires_at.saturating_duration_since(Instant::now());
                    Ok(json!({ "result": "hit", "remaining_ttl_ms": remaining.as_millis() as u64 }))
                }
                None => Ok(json!({ "result": "miss" })),
            },
            "ItemGetType" => match data.live(str_field(payload, "key")?) {
                Some(item) => {
                    let item_type = match item.data {
                        ItemData::Scalar(_) => "scalar",
                        ItemData::Set(_) => "set",
                        ItemData::Dictionary(_) => "dictionary",
                        ItemData::List(_) => "list",
                        ItemData::SortedSet(_) => "sorted_set",
                    };
                    Ok(json!({ "result": "hit", "item_type": item_type }))
                }
                None => Ok(json!({ "result": "miss" })),
            },
            "UpdateTtl" => {
                let ttl = Duration::from_millis(u64_field(payload, "ttl_ms")?);
                let condition = str_field(payload, "condition")?;
                let Some(item) = data.live(str_field(payload, "key")?) else {
                    return Ok(json!({ "result": "miss" }));
                };
                let remaining = item.expires_at.saturating_duration_since(Instant::now());
                let apply = match condition {
                    "increase_only" => ttl > remaining,
                    "decrease_only" => ttl < remaining,
                    _ => true,
                };
                if !apply {
                    return Ok(json!({ "result": "miss" }));
                }
                item.expires_at = Instant::now() + ttl;
                Ok(json!({ "result": "set" }))
            }
            "SetUnion" | "SetDifference" => {
                let set_name = str_field(payload, "set_name")?.to_string();
                let elements = strings(payload, "elements");
                if name == "SetUnion" {
                    let expires_at = expiry(payload)?;
                    if data.live(&set_name).is_none() {
                        let item = Item { data: ItemData::Set(BTreeSet::new()), expires_at };
                        data.items.insert(set_name.clone(), item);
                    }
                }
                match data.live(&set_name) {
                    Some(Item { data: ItemData::Set(set), .. }) => {
                        for element in elements {
                            if name == "SetUnion" {
                                set.insert(element);
                            } else {
                                set.remove(&element);
                            }
                        }
                        Ok(json!({}))
                    }
                    Some(_) => Err(wrong_type()),
                    None => Ok(json!({})),
                }
            }
            "SetFetch" => match data.live(str_field(payload, "set_name")?) {
                Some(Item { data: ItemData::Set(set), .. }) if !set.is_empty() => {
                    Ok(json!({ "result": "hit", "elements": set.iter().collect::<Vec<_>>() }))
                }
                Some(Item { data: ItemData::Set(_), .. }) | None => Ok(json!({ "result": "miss" })),
                Some(_) => Err(wrong_type()),
            },
            "DictionarySet" => {
                let dictionary = str_field(payload, "dictionary_name")?.to_string();
                let expires_at = expiry(payload)?;
                if data.live(&dictionary).is_none() {
                    let item = Item { data: ItemData::Dictionary(BTreeMap::new()), expires_at };
                    data.items.insert(dictionary.clone(), item);
                }
                match data.live(&dictionary) {
                    Some(Item { data: ItemData::Dictionary(fields), .. }) => {
                        let field = str_field(payload, "field")?.to_string();
                        fields.insert(field, str_field(payload, "value")?.to_string());
                        Ok(json!({}))
                    }
                    _ => Err(wrong_type()),
                }
            }
            "DictionaryFetch" => match data.live(str_field(payload, "dictionary_name")?) {
                Some(Item { data: ItemData::Dictionary(fields), .. }) => {
                    let items: Vec<Value> =
                        fields.iter().map(|(f, v)| json!({ "field": f, "value": v })).collect();
                    Ok(json!({ "result": "hit", "items": items }))
                }
                None => Ok(json!({ "result": "miss" })),
                Some(_) => Err(wrong_type()),
            },
            "ListPushFront" => {
                let list = str_field(payload, "list_name")?.to_string();
                let expires_at = expiry(payload)?;
                if data.live(&list).is_none() {
                    let item = Item { data: ItemData::List(VecDeque::new()), expires_at };
                    data.items.insert(list.clone(), item);
                }
                match data.live(&list) {
                    Some(Item { data: ItemData::List(values), .. }) => {
                        values.push_front(str_field(payload, "value")?.to_string());
                        Ok(json!({ "list_length": values.len() }))
                    }
                    _ => Err(wrong_type()),
                }
            }
            "ListFetch" => match data.live(str_field(payload, "list_name")?) {
                Some(Item { data: ItemData::List(values), .. }) => {
                    Ok(json!({ "result": "hit", "values": values.iter().collect::<Vec<_>>() }))
                }
                None => Ok(json!({ "result": "miss" })),
                Some(_) => Err(wrong_type()),
            },
            "SortedSetPut" => {
                let set_name = str_field(payload, "set_name")?.to_string();
                let expires_at = expiry(payload)?;
                if data.live(&set_name).is_none() {
                    let item = Item { data: ItemData::SortedSet(BTreeMap::new()), expires_at };
                    data.items.insert(set_name.clone(), item);
                }
                match data.live(&set_name) {
                    Some(Item { data: ItemData::SortedSet(members), .. }) => {
                        for element in payload["elements"].as_array().into_iter().flatten() {
                            let score = element["score"].as_f64().unwrap_or_default();
                            members.insert(str_field(element, "value")?.to_string(), score);
                        }
                        Ok(json!({}))
                    }
                    _ => Err(wrong_type()),
                }
            }
            "SortedSetFetchByRank" | "SortedSetFetchByScore" => {
                let members = match data.live(str_field(payload, "set_name")?) {
                    Some(Item { data: ItemData::SortedSet(members), .. }) => members.clone(),
                    Some(_) => return Err(wrong_type()),
                    None => return Ok(json!({ "result": "miss" })),
                };
                let mut ordered: Vec<(String, f64)> = members.into_iter().collect();
                ordered.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
                if str_field(payload, "order")? == "descending" {
                    ordered.reverse();
                }
                let selected: Vec<(String, f64)> = if name == "SortedSetFetchByRank" {
                    let start = u64_field(payload, "start_rank")? as usize;
                    let end = u64_field(payload, "end_rank")? as usize;
                    ordered.into_iter().skip(start).take(end.saturating_sub(start)).collect()
                } else {
                    let min = payload["min_score"].as_f64().unwrap_or(f64::NEG_INFINITY);
                    let max = payload["max_score"].as_f64().unwrap_or(f64::INFINITY);
                    ordered.into_iter().filter(|(_, s)| *s >= min && *s <= max).collect()
                };
                let elements: Vec<Value> = selected
                    .into_iter()
                    .map(|(value, score)| json!({ "value": value, "score": score }))
                    .collect();
                Ok(json!({ "result": "hit", "elements": elements }))
            }
            "SortedSetGetScore" => {
                let value = str_field(payload, "value")?;
                match data.live(str_field(payload, "set_name")?) {
                    Some(Item { data: ItemData::SortedSet(members), .. }) => {
                        match members.get(value) {
                            Some(score) => Ok(json!({ "result": "hit", "score": score })),
                            None => Ok(json!({ "result": "miss" })),
                        }
                    }
                    Some(_) => Err(wrong_type()),
                    None => Ok(json!({ "result": "miss" })),
                }
            }
            "UpsertElements" => {
                let name = str_field(payload, "leaderboard")?.to_string();
                let board = data.leaderboards.entry(name).or_default();
                for element in payload["elements"].as_array().into_iter().flatten() {
                    let id = element["id"].as_u64().unwrap_or_default() as u32;
                    board.insert(id, element["score"].as_f64().unwrap_or_default());
                }
                Ok(json!({}))
            }
            "GetByRank" => {
                let name = str_field(payload, "leaderboard")?;
                let board = data.leaderboards.get(name).cloned().unwrap_or_default();
                let mut elements: Vec<(u32, f64)> = board.into_iter().collect();
                elements.sort_by(|a, b| a.1.total_cmp(&b.1));
                if str_field(payload, "order")? == "descending" {
                    elements.reverse();
                }
                let start = u64_field(payload, "start_rank")? as usize;
                let end = u64_field(payload, "end_rank")? as usize;
                let ranked: Vec<Value> = elements
                    .into_iter()
                    .enumerate()
                    .skip(start)
                    .take(end.saturating_sub(start))
                    .map(|(rank, (id, score))| json!({ "id": id, "score": score, "rank": rank }))
                    .collect();
                Ok(json!({ "elements": ranked }))
            }
            "GetLeaderboardLength" => {
                let name = str_field(payload, "leaderboard")?;
                let count = data.leaderboards.get(name).map_or(0, BTreeMap::len);
                Ok(json!({ "count": count }))
            }
            "DeleteLeaderboard" => {
                data.leaderboards.remove(str_field(payload, "leaderboard")?);
                Ok(json!({}))
            }
            other => Err(err(StatusCode::Unimplemented, &format!("unknown method {other}"))),
        }
    }

    fn handle_vector(
        state: &mut State,
        name: &str,
        payload: &Value,
    ) -> Result<Value, TransportError> {
        if name == "ListIndexes" {
            let mut indexes: Vec<Value> = state
                .indexes
                .iter()
                .map(|(name, index)| {
                    json!({
                        "name": name,
                        "num_dimensions": index.dimensions,
                        "similarity_metric": index.metric
                    })
                })
                .collect();
            indexes.sort_by(|a, b| a["name"].as_str().cmp(&b["name"].as_str()));
            return Ok(json!({ "indexes": indexes }));
        }

        let index_name = str_field(payload, "index_name")?;
        if name == "CreateIndex" {
            if state.indexes.contains_key(index_name) {
                return Err(err(StatusCode::AlreadyExists, "index already exists"));
            }
            let index = Index {
                dimensions: u64_field(payload, "num_dimensions")? as u32,
                metric: str_field(payload, "similarity_metric")?.to_string(),
                items: BTreeMap::new(),
            };
            state.indexes.insert(index_name.to_string(), index);
            return Ok(json!({}));
        }
        if name == "DeleteIndex" {
            state.indexes.remove(index_name).ok_or_else(|| not_found("index"))?;
            return Ok(json!({}));
        }

        let index = state.indexes.get_mut(index_name).ok_or_else(|| not_found("index"))?;
        match name {
            "UpsertItemBatch" => {
                for item in payload["items"].as_array().into_iter().flatten() {
                    let vector = floats(&item["vector"]);
                    if vector.len() != index.dimensions as usize {
                        return Err(err(StatusCode::InvalidArgument, "dimension mismatch"));
                    }
                    let metadata = item["metadata"].as_object().cloned().unwrap_or_default();
                    index.items.insert(str_field(item, "id")?.to_string(), (vector, metadata));
                }
                Ok(json!({}))
            }
            "DeleteItemBatch" => {
                for id in strings(payload, "ids") {
                    index.items.remove(&id);
                }
                Ok(json!({}))
            }
            "Search" => {
                let query = floats(&payload["query_vector"]);
                if query.len() != index.dimensions as usize {
                    return Err(err(StatusCode::InvalidArgument, "dimension mismatch"));
                }
                let top_k = u64_field(payload, "top_k")? as usize;
                let lower_is_better = index.metric == "euclidean_similarity";
                let threshold = payload["score_threshold"].as_f64();
                let fields = &payload["metadata_fields"];

                let mut hits: Vec<(String, f64, Map<String, Value>)> = index
                    .items
                    .iter()
                    .map(|(id, (vector, metadata))| {
                        (id.clone(), score(&index.metric, &query, vector), metadata.clone())
                    })
                    .filter(|(_, score, _)| match threshold {
                        Some(limit) if lower_is_better => *score <= limit,
                        Some(limit) => *score >= limit,
                        None => true,
                    })
                    .collect();
                hits.sort_by(|a, b| {
                    if lower_is_better {
                        a.1.total_cmp(&b.1)
                    } else {
                        b.1.total_cmp(&a.1)
                    }
                });
                hits.truncate(top_k);

                let hits: Vec<Value> = hits
                    .into_iter()
                    .map(|(id, score, mut metadata)| {
                        if fields.as_str() != Some("all") {
                            let wanted = strings(fields, "fields");
                            metadata =
                                metadata.into_iter().filter(|(k, _)| wanted.contains(k)).collect();
                        }
                        json!({ "id": id, "score": score, "metadata": metadata })
                    })
                    .collect();
                Ok(json!({ "hits": hits }))
            }
            other => Err(err(StatusCode::Unimplemented, &format!("unknown method {other}"))),
        }
    }
}

#[async_trait]
impl Transport for InMemoryService {
    async fn invoke(&self, request: TransportRequest, _deadline: Instant) -> Reply {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.handle(&request).map(TransportResponse::new)
    }
}
