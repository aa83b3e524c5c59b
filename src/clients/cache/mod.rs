//! Cache client: cache lifecycle and scalar item operations.
//!
//! Collection operations (sets, dictionaries, lists) live in
//! [`collections`] and sorted sets in [`sorted_set`]. Every operation
//! returns a type alias onto one of the outcome families so callers can
//! match on it exhaustively.

pub mod collections;
pub mod sorted_set;
pub mod types;

use std::time::Duration;

use futures_util::future::join_all;
use serde::{Deserialize, Serialize};

pub use types::{CacheDictionary, CacheInfo, CacheSet, CacheValue, ItemType};

use crate::clients::validation::{ttl_millis, validate_cache_name, validate_non_empty};
use crate::clients::wire::{call, Empty};
use crate::clients::ClientBuilder;
use crate::config::ConfigError;
use crate::errors::SdkError;
use crate::outcome::{Conditional, Creation, Lookup, Outcome, OutcomeFamily, TtlUpdate};
use crate::pipeline::Pipeline;
use crate::transport::MethodDescriptor;

pub use collections::{
    CacheDictionaryFetchResponse, CacheDictionarySetFieldResponse, CacheListFetchResponse,
    CacheListPushFrontResponse, CacheSetAddElementsResponse, CacheSetFetchResponse,
    CacheSetRemoveElementsResponse,
};
pub use sorted_set::{
    CacheSortedSetFetchResponse, CacheSortedSetGetScoreResponse, CacheSortedSetPutElementsResponse,
    SortedSetElement,
};

/// TTL applied to writes that do not specify one.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

pub type CreateCacheResponse = Creation;
pub type DeleteCacheResponse = Outcome<()>;
pub type ListCachesResponse = Outcome<Vec<CacheInfo>>;
pub type FlushCacheResponse = Outcome<()>;
pub type PingResponse = Outcome<()>;
pub type CacheGetResponse = Lookup<CacheValue>;
pub type CacheGetBatchResponse = Outcome<Vec<(CacheValue, CacheGetResponse)>>;
pub type CacheSetResponse = Outcome<()>;
pub type CacheSetBatchResponse = Outcome<Vec<(CacheValue, CacheSetResponse)>>;
pub type CacheSetIfNotExistsResponse = Conditional<()>;
pub type CacheDeleteResponse = Outcome<()>;
pub type CacheIncrementResponse = Outcome<i64>;
pub type CacheKeysExistResponse = Outcome<Vec<bool>>;
pub type CacheItemGetTtlResponse = Lookup<Duration>;
pub type CacheItemGetTypeResponse = Lookup<ItemType>;
pub type CacheUpdateTtlResponse = TtlUpdate;

const CREATE_CACHE: MethodDescriptor =
    MethodDescriptor::control("control_client.ScsControl/CreateCache", false);
const DELETE_CACHE: MethodDescriptor =
    MethodDescriptor::control("control_client.ScsControl/DeleteCache", true);
const LIST_CACHES: MethodDescriptor =
    MethodDescriptor::control("control_client.ScsControl/ListCaches", true);
const FLUSH_CACHE: MethodDescriptor =
    MethodDescriptor::control("control_client.ScsControl/FlushCache", true);
const PING: MethodDescriptor = MethodDescriptor::data("cache_client.Ping/Ping", true);
const GET: MethodDescriptor = MethodDescriptor::data("cache_client.Scs/Get", true);
const SET: MethodDescriptor = MethodDescriptor::data("cache_client.Scs/Set", true);
const SET_IF_NOT_EXISTS: MethodDescriptor =
    MethodDescriptor::data("cache_client.Scs/SetIfNotExists", false);
const DELETE: MethodDescriptor = MethodDescriptor::data("cache_client.Scs/Delete", true);
const INCREMENT: MethodDescriptor = MethodDescriptor::data("cache_client.Scs/Increment", false);
const KEYS_EXIST: MethodDescriptor = MethodDescriptor::data("cache_client.Scs/KeysExist", true);
const ITEM_GET_TTL: MethodDescriptor = MethodDescriptor::data("cache_client.Scs/ItemGetTtl", true);
const ITEM_GET_TYPE: MethodDescriptor =
    MethodDescriptor::data("cache_client.Scs/ItemGetType", true);
const UPDATE_TTL: MethodDescriptor = MethodDescriptor::data("cache_client.Scs/UpdateTtl", true);

#[derive(Serialize)]
struct CacheNameRequest<'a> {
    cache_name: &'a str,
}

#[derive(Serialize)]
struct KeyRequest<'a> {
    key: &'a CacheValue,
}

#[derive(Serialize)]
struct SetRequest<'a> {
    key: &'a CacheValue,
    value: &'a CacheValue,
    ttl_ms: u64,
}

#[derive(Serialize)]
struct IncrementRequest<'a> {
    key: &'a CacheValue,
    amount: i64,
    ttl_ms: u64,
}

#[derive(Serialize)]
struct KeysExistRequest<'a> {
    keys: &'a [CacheValue],
}

#[derive(Serialize, Clone, Copy)]
#[serde(rename_all = "snake_case")]
enum TtlCondition {
    Always,
    IncreaseOnly,
    DecreaseOnly,
}

#[derive(Serialize)]
struct UpdateTtlRequest<'a> {
    key: &'a CacheValue,
    ttl_ms: u64,
    condition: TtlCondition,
}

#[derive(Deserialize)]
struct ListCachesBody {
    caches: Vec<CacheInfo>,
}

#[derive(Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
enum GetBody {
    Hit { value: CacheValue },
    Miss,
}

#[derive(Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
enum ConditionalBody {
    Stored,
    NotStored,
}

#[derive(Deserialize)]
struct IncrementBody {
    value: i64,
}

#[derive(Deserialize)]
struct KeysExistBody {
    exists: Vec<bool>,
}

#[derive(Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
enum ItemTtlBody {
    Hit { remaining_ttl_ms: u64 },
    Miss,
}

#[derive(Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
enum ItemTypeBody {
    Hit { item_type: ItemType },
    Miss,
}

#[derive(Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
enum UpdateTtlBody {
    Set,
    Miss,
}

fn validate_key(cache_name: &str, key: &CacheValue) -> Result<(), SdkError> {
    validate_cache_name(cache_name)?;
    validate_non_empty("key", key.as_bytes())
}

/// Client for the cache service.
///
/// Cheap to clone; clones share the transport and configuration.
#[derive(Debug, Clone)]
pub struct CacheClient {
    pipeline: Pipeline,
    default_ttl: Duration,
}

impl CacheClient {
    pub fn builder() -> ClientBuilder<CacheClient> {
        ClientBuilder::new()
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    fn ttl_ms(&self, ttl: Option<Duration>) -> Result<u64, SdkError> {
        ttl_millis(ttl.unwrap_or(self.default_ttl))
    }

    pub async fn create_cache(&self, cache_name: &str) -> CreateCacheResponse {
        if let Err(error) = validate_cache_name(cache_name) {
            return Creation::failure(error);
        }
        let request = CacheNameRequest { cache_name };
        call(&self.pipeline, CREATE_CACHE, cache_name, &request, |_: Empty| Creation::Created).await
    }

    pub async fn delete_cache(&self, cache_name: &str) -> DeleteCacheResponse {
        if let Err(error) = validate_cache_name(cache_name) {
            return Outcome::failure(error);
        }
        let request = CacheNameRequest { cache_name };
        call(&self.pipeline, DELETE_CACHE, cache_name, &request, |_: Empty| {
            Outcome::Success(())
        })
        .await
    }

    pub async fn list_caches(&self) -> ListCachesResponse {
        call(&self.pipeline, LIST_CACHES, "", &serde_json::json!({}), |body: ListCachesBody| {
            Outcome::Success(body.caches)
        })
        .await
    }

    /// Remove every item from a cache, keeping the cache itself.
    pub async fn flush_cache(&self, cache_name: &str) -> FlushCacheResponse {
        if let Err(error) = validate_cache_name(cache_name) {
            return Outcome::failure(error);
        }
        let request = CacheNameRequest { cache_name };
        call(&self.pipeline, FLUSH_CACHE, cache_name, &request, |_: Empty| {
            Outcome::Success(())
        })
        .await
    }

    pub async fn ping(&self) -> PingResponse {
        call(&self.pipeline, PING, "", &serde_json::json!({}), |_: Empty| {
            Outcome::Success(())
        })
        .await
    }

    pub async fn get(&self, cache_name: &str, key: impl Into<CacheValue>) -> CacheGetResponse {
        let key = key.into();
        if let Err(error) = validate_key(cache_name, &key) {
            return Lookup::failure(error);
        }
        let request = KeyRequest { key: &key };
        call(&self.pipeline, GET, cache_name, &request, |body: GetBody| match body {
            GetBody::Hit { value } => Lookup::Hit(value),
            GetBody::Miss => Lookup::Miss,
        })
        .await
    }

    /// Concurrent `get` of every key; results keep the order of `keys`.
    pub async fn get_batch<I, K>(&self, cache_name: &str, keys: I) -> CacheGetBatchResponse
    where
        I: IntoIterator<Item = K>,
        K: Into<CacheValue>,
    {
        let keys: Vec<CacheValue> = keys.into_iter().map(Into::into).collect();
        if let Err(error) =
            validate_cache_name(cache_name).and_then(|()| validate_non_empty("keys", &keys))
        {
            return Outcome::failure(error);
        }
        let lookups = join_all(keys.iter().map(|key| self.get(cache_name, key))).await;
        Outcome::Success(keys.into_iter().zip(lookups).collect())
    }

    /// Concurrent `set` of every pair, all with the same `ttl`.
    ///
    /// Each key gets its own outcome, in input order. Only a bad cache name,
    /// an empty batch or a bad TTL fail the batch as a whole.
    pub async fn set_batch<I, K, V>(
        &self,
        cache_name: &str,
        items: I,
        ttl: Option<Duration>,
    ) -> CacheSetBatchResponse
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<CacheValue>,
        V: Into<CacheValue>,
    {
        let items: Vec<(CacheValue, CacheValue)> =
            items.into_iter().map(|(key, value)| (key.into(), value.into())).collect();
        if let Err(error) = validate_cache_name(cache_name)
            .and_then(|()| validate_non_empty("items", &items))
            .and_then(|()| self.ttl_ms(ttl))
        {
            return Outcome::failure(error);
        }
        let writes = items.iter().map(|(key, value)| self.set(cache_name, key, value, ttl));
        let results = join_all(writes).await;
        Outcome::Success(items.into_iter().map(|(key, _)| key).zip(results).collect())
    }

    /// Store `value` under `key`; `ttl` defaults to the client's default TTL.
    pub async fn set(
        &self,
        cache_name: &str,
        key: impl Into<CacheValue>,
        value: impl Into<CacheValue>,
        ttl: Option<Duration>,
    ) -> CacheSetResponse {
        let (key, value) = (key.into(), value.into());
        let ttl_ms = match self.validate_write(cache_name, &key, ttl) {
            Ok(ttl_ms) => ttl_ms,
            Err(error) => return Outcome::failure(error),
        };
        let request = SetRequest { key: &key, value: &value, ttl_ms };
        call(&self.pipeline, SET, cache_name, &request, |_: Empty| Outcome::Success(())).await
    }

    /// Store `value` only if `key` holds nothing.
    pub async fn set_if_not_exists(
        &self,
        cache_name: &str,
        key: impl Into<CacheValue>,
        value: impl Into<CacheValue>,
        ttl: Option<Duration>,
    ) -> CacheSetIfNotExistsResponse {
        let (key, value) = (key.into(), value.into());
        let ttl_ms = match self.validate_write(cache_name, &key, ttl) {
            Ok(ttl_ms) => ttl_ms,
            Err(error) => return Conditional::failure(error),
        };
        let request = SetRequest { key: &key, value: &value, ttl_ms };
        call(&self.pipeline, SET_IF_NOT_EXISTS, cache_name, &request, |body: ConditionalBody| {
            match body {
                ConditionalBody::Stored => Conditional::Stored(()),
                ConditionalBody::NotStored => Conditional::NotStored,
            }
        })
        .await
    }

    pub async fn delete(
        &self,
        cache_name: &str,
        key: impl Into<CacheValue>,
    ) -> CacheDeleteResponse {
        let key = key.into();
        if let Err(error) = validate_key(cache_name, &key) {
            return Outcome::failure(error);
        }
        let request = KeyRequest { key: &key };
        call(&self.pipeline, DELETE, cache_name, &request, |_: Empty| Outcome::Success(())).await
    }

    /// Add `amount` to the integer stored under `key`, creating it at zero first.
    pub async fn increment(
        &self,
        cache_name: &str,
        key: impl Into<CacheValue>,
        amount: i64,
        ttl: Option<Duration>,
    ) -> CacheIncrementResponse {
        let key = key.into();
        let ttl_ms = match self.validate_write(cache_name, &key, ttl) {
            Ok(ttl_ms) => ttl_ms,
            Err(error) => return Outcome::failure(error),
        };
        let request = IncrementRequest { key: &key, amount, ttl_ms };
        call(&self.pipeline, INCREMENT, cache_name, &request, |body: IncrementBody| {
            Outcome::Success(body.value)
        })
        .await
    }

    /// Existence of each key, in request order.
    pub async fn keys_exist<I, K>(&self, cache_name: &str, keys: I) -> CacheKeysExistResponse
    where
        I: IntoIterator<Item = K>,
        K: Into<CacheValue>,
    {
        let keys: Vec<CacheValue> = keys.into_iter().map(Into::into).collect();
        if let Err(error) =
            validate_cache_name(cache_name).and_then(|()| validate_non_empty("keys", &keys))
        {
            return Outcome::failure(error);
        }
        let expected = keys.len();
        let request = KeysExistRequest { keys: &keys };
        call(&self.pipeline, KEYS_EXIST, cache_name, &request, |body: KeysExistBody| {
            if body.exists.len() != expected {
                return Outcome::failure(SdkError::internal(format!(
                    "expected {expected} existence flags, got {}",
                    body.exists.len()
                )));
            }
            Outcome::Success(body.exists)
        })
        .await
    }

    /// Remaining lifetime of the item under `key`.
    pub async fn item_get_ttl(
        &self,
        cache_name: &str,
        key: impl Into<CacheValue>,
    ) -> CacheItemGetTtlResponse {
        let key = key.into();
        if let Err(error) = validate_key(cache_name, &key) {
            return Lookup::failure(error);
        }
        let request = KeyRequest { key: &key };
        call(&self.pipeline, ITEM_GET_TTL, cache_name, &request, |body: ItemTtlBody| match body {
            ItemTtlBody::Hit { remaining_ttl_ms } => {
                Lookup::Hit(Duration::from_millis(remaining_ttl_ms))
            }
            ItemTtlBody::Miss => Lookup::Miss,
        })
        .await
    }

    pub async fn item_get_type(
        &self,
        cache_name: &str,
        key: impl Into<CacheValue>,
    ) -> CacheItemGetTypeResponse {
        let key = key.into();
        if let Err(error) = validate_key(cache_name, &key) {
            return Lookup::failure(error);
        }
        let request = KeyRequest { key: &key };
        call(&self.pipeline, ITEM_GET_TYPE, cache_name, &request, |body: ItemTypeBody| match body {
            ItemTypeBody::Hit { item_type } => Lookup::Hit(item_type),
            ItemTypeBody::Miss => Lookup::Miss,
        })
        .await
    }

    /// Overwrite the remaining lifetime of the item under `key`.
    pub async fn update_ttl(
        &self,
        cache_name: &str,
        key: impl Into<CacheValue>,
        ttl: Duration,
    ) -> CacheUpdateTtlResponse {
        self.change_ttl(cache_name, key.into(), ttl, TtlCondition::Always).await
    }

    /// Set the lifetime to `ttl` only if that extends it; otherwise `Miss`.
    pub async fn increase_ttl(
        &self,
        cache_name: &str,
        key: impl Into<CacheValue>,
        ttl: Duration,
    ) -> CacheUpdateTtlResponse {
        self.change_ttl(cache_name, key.into(), ttl, TtlCondition::IncreaseOnly).await
    }

    /// Set the lifetime to `ttl` only if that shortens it; otherwise `Miss`.
    pub async fn decrease_ttl(
        &self,
        cache_name: &str,
        key: impl Into<CacheValue>,
        ttl: Duration,
    ) -> CacheUpdateTtlResponse {
        self.change_ttl(cache_name, key.into(), ttl, TtlCondition::DecreaseOnly).await
    }

    async fn change_ttl(
        &self,
        cache_name: &str,
        key: CacheValue,
        ttl: Duration,
        condition: TtlCondition,
    ) -> CacheUpdateTtlResponse {
        let ttl_ms = match self.validate_write(cache_name, &key, Some(ttl)) {
            Ok(ttl_ms) => ttl_ms,
            Err(error) => return TtlUpdate::failure(error),
        };
        let request = UpdateTtlRequest { key: &key, ttl_ms, condition };
        call(&self.pipeline, UPDATE_TTL, cache_name, &request, |body: UpdateTtlBody| match body {
            UpdateTtlBody::Set => TtlUpdate::Set,
            UpdateTtlBody::Miss => TtlUpdate::Miss,
        })
        .await
    }

    fn validate_write(
        &self,
        cache_name: &str,
        key: &CacheValue,
        ttl: Option<Duration>,
    ) -> Result<u64, SdkError> {
        validate_key(cache_name, key)?;
        self.ttl_ms(ttl)
    }
}

impl ClientBuilder<CacheClient> {
    /// TTL for writes that do not pass one explicitly.
    pub fn default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = Some(ttl);
        self
    }

    pub fn build(self) -> Result<CacheClient, ConfigError> {
        let default_ttl = self.default_ttl.unwrap_or(DEFAULT_TTL);
        ttl_millis(default_ttl).map_err(|error| {
            ConfigError::InvalidArgument(format!("default ttl: {}", error.message()))
        })?;
        let pipeline = self.pipeline()?;
        Ok(CacheClient { pipeline, default_ttl })
    }
}
