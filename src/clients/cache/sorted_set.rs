//! Sorted set operations on [`CacheClient`].
//!
//! A sorted set maps each distinct value to a finite `f64` score. Fetches
//! return elements ordered by score.

use std::ops::Range;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::clients::cache::{CacheClient, CacheValue};
use crate::clients::leaderboard::SortOrder;
use crate::clients::validation::{validate_cache_name, validate_non_empty};
use crate::clients::wire::{call, Empty};
use crate::errors::SdkError;
use crate::outcome::{Lookup, Outcome, OutcomeFamily};
use crate::transport::MethodDescriptor;

pub type CacheSortedSetPutElementsResponse = Outcome<()>;
pub type CacheSortedSetFetchResponse = Lookup<Vec<SortedSetElement>>;
pub type CacheSortedSetGetScoreResponse = Lookup<f64>;

const SORTED_SET_PUT: MethodDescriptor =
    MethodDescriptor::data("cache_client.Scs/SortedSetPut", true);
const SORTED_SET_FETCH_BY_RANK: MethodDescriptor =
    MethodDescriptor::data("cache_client.Scs/SortedSetFetchByRank", true);
const SORTED_SET_FETCH_BY_SCORE: MethodDescriptor =
    MethodDescriptor::data("cache_client.Scs/SortedSetFetchByScore", true);
const SORTED_SET_GET_SCORE: MethodDescriptor =
    MethodDescriptor::data("cache_client.Scs/SortedSetGetScore", true);

/// One member of a sorted set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortedSetElement {
    pub value: CacheValue,
    pub score: f64,
}

impl SortedSetElement {
    pub fn new(value: impl Into<CacheValue>, score: f64) -> Self {
        Self { value: value.into(), score }
    }
}

#[derive(Serialize)]
struct PutElementsRequest<'a> {
    set_name: &'a CacheValue,
    elements: &'a [SortedSetElement],
    ttl_ms: u64,
}

#[derive(Serialize)]
struct FetchByRankRequest<'a> {
    set_name: &'a CacheValue,
    start_rank: u32,
    end_rank: u32,
    order: SortOrder,
}

/// Score bounds are inclusive; an absent bound is open.
#[derive(Serialize)]
struct FetchByScoreRequest<'a> {
    set_name: &'a CacheValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    min_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_score: Option<f64>,
    order: SortOrder,
}

#[derive(Serialize)]
struct GetScoreRequest<'a> {
    set_name: &'a CacheValue,
    value: &'a CacheValue,
}

#[derive(Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
enum FetchBody {
    Hit { elements: Vec<SortedSetElement> },
    Miss,
}

#[derive(Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
enum GetScoreBody {
    Hit { score: f64 },
    Miss,
}

fn validate_set(cache_name: &str, set_name: &CacheValue) -> Result<(), SdkError> {
    validate_cache_name(cache_name)?;
    validate_non_empty("sorted set name", set_name.as_bytes())
}

fn validate_scores(elements: &[SortedSetElement]) -> Result<(), SdkError> {
    validate_non_empty("elements", elements)?;
    if elements.iter().any(|element| !element.score.is_finite()) {
        return Err(SdkError::invalid_argument("scores must be finite"));
    }
    Ok(())
}

fn validate_score_range(min: Option<f64>, max: Option<f64>) -> Result<(), SdkError> {
    if min.is_some_and(f64::is_nan) || max.is_some_and(f64::is_nan) {
        return Err(SdkError::invalid_argument("score bounds must not be NaN"));
    }
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            return Err(SdkError::invalid_argument(format!(
                "min score {min} exceeds max score {max}"
            )));
        }
    }
    Ok(())
}

fn lift_fetch(body: FetchBody) -> CacheSortedSetFetchResponse {
    match body {
        FetchBody::Hit { elements } => Lookup::Hit(elements),
        FetchBody::Miss => Lookup::Miss,
    }
}

impl CacheClient {
    /// Add elements or replace the scores of values already in the set.
    pub async fn sorted_set_put_elements<I, V>(
        &self,
        cache_name: &str,
        set_name: impl Into<CacheValue>,
        elements: I,
        ttl: Option<Duration>,
    ) -> CacheSortedSetPutElementsResponse
    where
        I: IntoIterator<Item = (V, f64)>,
        V: Into<CacheValue>,
    {
        let set_name = set_name.into();
        let elements: Vec<SortedSetElement> = elements
            .into_iter()
            .map(|(value, score)| SortedSetElement::new(value, score))
            .collect();
        let ttl_ms = match validate_set(cache_name, &set_name)
            .and_then(|()| validate_scores(&elements))
            .and_then(|()| self.ttl_ms(ttl))
        {
            Ok(ttl_ms) => ttl_ms,
            Err(error) => return Outcome::failure(error),
        };
        let request = PutElementsRequest { set_name: &set_name, elements: &elements, ttl_ms };
        call(&self.pipeline, SORTED_SET_PUT, cache_name, &request, |_: Empty| {
            Outcome::Success(())
        })
        .await
    }

    /// Elements whose rank in `order` falls in `ranks` (end exclusive).
    pub async fn sorted_set_fetch_by_rank(
        &self,
        cache_name: &str,
        set_name: impl Into<CacheValue>,
        ranks: Range<u32>,
        order: SortOrder,
    ) -> CacheSortedSetFetchResponse {
        let set_name = set_name.into();
        if let Err(error) = validate_set(cache_name, &set_name) {
            return Lookup::failure(error);
        }
        if ranks.start >= ranks.end {
            return Lookup::failure(SdkError::invalid_argument(format!(
                "rank range {}..{} is empty",
                ranks.start, ranks.end
            )));
        }
        let request = FetchByRankRequest {
            set_name: &set_name,
            start_rank: ranks.start,
            end_rank: ranks.end,
            order,
        };
        call(&self.pipeline, SORTED_SET_FETCH_BY_RANK, cache_name, &request, lift_fetch).await
    }

    /// Elements scored within `[min, max]`; `None` leaves that side open.
    pub async fn sorted_set_fetch_by_score(
        &self,
        cache_name: &str,
        set_name: impl Into<CacheValue>,
        min: Option<f64>,
        max: Option<f64>,
        order: SortOrder,
    ) -> CacheSortedSetFetchResponse {
        let set_name = set_name.into();
        if let Err(error) =
            validate_set(cache_name, &set_name).and_then(|()| validate_score_range(min, max))
        {
            return Lookup::failure(error);
        }
        let request = FetchByScoreRequest {
            set_name: &set_name,
            min_score: min,
            max_score: max,
            order,
        };
        call(&self.pipeline, SORTED_SET_FETCH_BY_SCORE, cache_name, &request, lift_fetch).await
    }

    /// Score of `value`; `Miss` if the set or the value is absent.
    pub async fn sorted_set_get_score(
        &self,
        cache_name: &str,
        set_name: impl Into<CacheValue>,
        value: impl Into<CacheValue>,
    ) -> CacheSortedSetGetScoreResponse {
        let (set_name, value) = (set_name.into(), value.into());
        if let Err(error) = validate_set(cache_name, &set_name) {
            return Lookup::failure(error);
        }
        let request = GetScoreRequest { set_name: &set_name, value: &value };
        call(&self.pipeline, SORTED_SET_GET_SCORE, cache_name, &request, |body: GetScoreBody| {
            match body {
                GetScoreBody::Hit { score } => Lookup::Hit(score),
                GetScoreBody::Miss => Lookup::Miss,
            }
        })
        .await
    }
}
