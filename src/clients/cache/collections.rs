//! Set, dictionary and list operations on [`CacheClient`].

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::clients::cache::{CacheClient, CacheDictionary, CacheSet, CacheValue};
use crate::clients::validation::{validate_cache_name, validate_non_empty};
use crate::clients::wire::{call, Empty};
use crate::errors::SdkError;
use crate::outcome::{Lookup, Outcome, OutcomeFamily};
use crate::transport::MethodDescriptor;

pub type CacheSetAddElementsResponse = Outcome<()>;
pub type CacheSetRemoveElementsResponse = Outcome<()>;
pub type CacheSetFetchResponse = Lookup<CacheSet>;
pub type CacheDictionarySetFieldResponse = Outcome<()>;
pub type CacheDictionaryFetchResponse = Lookup<CacheDictionary>;
/// Length of the list after the push.
pub type CacheListPushFrontResponse = Outcome<u32>;
pub type CacheListFetchResponse = Lookup<Vec<CacheValue>>;

const SET_UNION: MethodDescriptor = MethodDescriptor::data("cache_client.Scs/SetUnion", true);
const SET_DIFFERENCE: MethodDescriptor =
    MethodDescriptor::data("cache_client.Scs/SetDifference", true);
const SET_FETCH: MethodDescriptor = MethodDescriptor::data("cache_client.Scs/SetFetch", true);
const DICTIONARY_SET: MethodDescriptor =
    MethodDescriptor::data("cache_client.Scs/DictionarySet", true);
const DICTIONARY_FETCH: MethodDescriptor =
    MethodDescriptor::data("cache_client.Scs/DictionaryFetch", true);
const LIST_PUSH_FRONT: MethodDescriptor =
    MethodDescriptor::data("cache_client.Scs/ListPushFront", false);
const LIST_FETCH: MethodDescriptor = MethodDescriptor::data("cache_client.Scs/ListFetch", true);

#[derive(Serialize)]
struct SetElementsRequest<'a> {
    set_name: &'a CacheValue,
    elements: &'a [CacheValue],
    #[serde(skip_serializing_if = "Option::is_none")]
    ttl_ms: Option<u64>,
}

#[derive(Serialize)]
struct SetFetchRequest<'a> {
    set_name: &'a CacheValue,
}

#[derive(Serialize)]
struct DictionarySetRequest<'a> {
    dictionary_name: &'a CacheValue,
    field: &'a CacheValue,
    value: &'a CacheValue,
    ttl_ms: u64,
}

#[derive(Serialize)]
struct DictionaryFetchRequest<'a> {
    dictionary_name: &'a CacheValue,
}

#[derive(Serialize)]
struct ListPushRequest<'a> {
    list_name: &'a CacheValue,
    value: &'a CacheValue,
    ttl_ms: u64,
}

#[derive(Serialize)]
struct ListFetchRequest<'a> {
    list_name: &'a CacheValue,
}

#[derive(Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
enum SetFetchBody {
    Hit { elements: Vec<CacheValue> },
    Miss,
}

#[derive(Deserialize)]
struct DictionaryItem {
    field: CacheValue,
    value: CacheValue,
}

#[derive(Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
enum DictionaryFetchBody {
    Hit { items: Vec<DictionaryItem> },
    Miss,
}

#[derive(Deserialize)]
struct ListPushBody {
    list_length: u32,
}

#[derive(Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
enum ListFetchBody {
    Hit { values: Vec<CacheValue> },
    Miss,
}

fn collect<I, V>(elements: I) -> Vec<CacheValue>
where
    I: IntoIterator<Item = V>,
    V: Into<CacheValue>,
{
    elements.into_iter().map(Into::into).collect()
}

fn validate_item(cache_name: &str, what: &str, name: &CacheValue) -> Result<(), SdkError> {
    validate_cache_name(cache_name)?;
    validate_non_empty(what, name.as_bytes())
}

impl CacheClient {
    /// Add `elements` to the set, creating it if needed.
    pub async fn set_add_elements<I, V>(
        &self,
        cache_name: &str,
        set_name: impl Into<CacheValue>,
        elements: I,
        ttl: Option<Duration>,
    ) -> CacheSetAddElementsResponse
    where
        I: IntoIterator<Item = V>,
        V: Into<CacheValue>,
    {
        let (set_name, elements) = (set_name.into(), collect(elements));
        let ttl_ms = match validate_item(cache_name, "set name", &set_name)
            .and_then(|()| validate_non_empty("elements", &elements))
            .and_then(|()| self.ttl_ms(ttl))
        {
            Ok(ttl_ms) => ttl_ms,
            Err(error) => return Outcome::failure(error),
        };
        let request = SetElementsRequest {
            set_name: &set_name,
            elements: &elements,
            ttl_ms: Some(ttl_ms),
        };
        call(&self.pipeline, SET_UNION, cache_name, &request, |_: Empty| Outcome::Success(())).await
    }

    /// Remove `elements` from the set. Missing sets and elements are not errors.
    pub async fn set_remove_elements<I, V>(
        &self,
        cache_name: &str,
        set_name: impl Into<CacheValue>,
        elements: I,
    ) -> CacheSetRemoveElementsResponse
    where
        I: IntoIterator<Item = V>,
        V: Into<CacheValue>,
    {
        let (set_name, elements) = (set_name.into(), collect(elements));
        if let Err(error) = validate_item(cache_name, "set name", &set_name)
            .and_then(|()| validate_non_empty("elements", &elements))
        {
            return Outcome::failure(error);
        }
        let request = SetElementsRequest { set_name: &set_name, elements: &elements, ttl_ms: None };
        call(&self.pipeline, SET_DIFFERENCE, cache_name, &request, |_: Empty| {
            Outcome::Success(())
        })
        .await
    }

    pub async fn set_fetch(
        &self,
        cache_name: &str,
        set_name: impl Into<CacheValue>,
    ) -> CacheSetFetchResponse {
        let set_name = set_name.into();
        if let Err(error) = validate_item(cache_name, "set name", &set_name) {
            return Lookup::failure(error);
        }
        let request = SetFetchRequest { set_name: &set_name };
        call(&self.pipeline, SET_FETCH, cache_name, &request, |body: SetFetchBody| match body {
            SetFetchBody::Hit { elements } => Lookup::Hit(elements.into_iter().collect()),
            SetFetchBody::Miss => Lookup::Miss,
        })
        .await
    }

    pub async fn dictionary_set_field(
        &self,
        cache_name: &str,
        dictionary_name: impl Into<CacheValue>,
        field: impl Into<CacheValue>,
        value: impl Into<CacheValue>,
        ttl: Option<Duration>,
    ) -> CacheDictionarySetFieldResponse {
        let (dictionary_name, field, value) = (dictionary_name.into(), field.into(), value.into());
        let ttl_ms = match validate_item(cache_name, "dictionary name", &dictionary_name)
            .and_then(|()| validate_non_empty("field", field.as_bytes()))
            .and_then(|()| self.ttl_ms(ttl))
        {
            Ok(ttl_ms) => ttl_ms,
            Err(error) => return Outcome::failure(error),
        };
        let request = DictionarySetRequest {
            dictionary_name: &dictionary_name,
            field: &field,
            value: &value,
            ttl_ms,
        };
        call(&self.pipeline, DICTIONARY_SET, cache_name, &request, |_: Empty| {
            Outcome::Success(())
        })
        .await
    }

    pub async fn dictionary_fetch(
        &self,
        cache_name: &str,
        dictionary_name: impl Into<CacheValue>,
    ) -> CacheDictionaryFetchResponse {
        let dictionary_name = dictionary_name.into();
        if let Err(error) = validate_item(cache_name, "dictionary name", &dictionary_name) {
            return Lookup::failure(error);
        }
        let request = DictionaryFetchRequest { dictionary_name: &dictionary_name };
        call(&self.pipeline, DICTIONARY_FETCH, cache_name, &request, |body: DictionaryFetchBody| {
            match body {
                DictionaryFetchBody::Hit { items } => {
                    Lookup::Hit(items.into_iter().map(|item| (item.field, item.value)).collect())
                }
                DictionaryFetchBody::Miss => Lookup::Miss,
            }
        })
        .await
    }

    /// Push `value` onto the front of the list, creating it if needed.
    pub async fn list_push_front(
        &self,
        cache_name: &str,
        list_name: impl Into<CacheValue>,
        value: impl Into<CacheValue>,
        ttl: Option<Duration>,
    ) -> CacheListPushFrontResponse {
        let (list_name, value) = (list_name.into(), value.into());
        let ttl_ms = match validate_item(cache_name, "list name", &list_name)
            .and_then(|()| self.ttl_ms(ttl))
        {
            Ok(ttl_ms) => ttl_ms,
            Err(error) => return Outcome::failure(error),
        };
        let request = ListPushRequest { list_name: &list_name, value: &value, ttl_ms };
        call(&self.pipeline, LIST_PUSH_FRONT, cache_name, &request, |body: ListPushBody| {
            Outcome::Success(body.list_length)
        })
        .await
    }

    /// Every value in the list, front first.
    pub async fn list_fetch(
        &self,
        cache_name: &str,
        list_name: impl Into<CacheValue>,
    ) -> CacheListFetchResponse {
        let list_name = list_name.into();
        if let Err(error) = validate_item(cache_name, "list name", &list_name) {
            return Lookup::failure(error);
        }
        let request = ListFetchRequest { list_name: &list_name };
        call(&self.pipeline, LIST_FETCH, cache_name, &request, |body: ListFetchBody| match body {
            ListFetchBody::Hit { values } => Lookup::Hit(values),
            ListFetchBody::Miss => Lookup::Miss,
        })
        .await
    }
}
