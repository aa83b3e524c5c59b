//! Leaderboard client.
//!
//! A leaderboard lives inside a cache and maps integer ids to scores.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::clients::validation::{validate_cache_name, validate_name, validate_non_empty};
use crate::clients::wire::{call, Empty};
use crate::clients::ClientBuilder;
use crate::config::ConfigError;
use crate::errors::SdkError;
use crate::outcome::{Outcome, OutcomeFamily};
use crate::pipeline::Pipeline;
use crate::transport::MethodDescriptor;

pub type LeaderboardUpsertResponse = Outcome<()>;
pub type LeaderboardFetchResponse = Outcome<Vec<RankedElement>>;
pub type LeaderboardLengthResponse = Outcome<u32>;
pub type LeaderboardDeleteResponse = Outcome<()>;

/// Largest rank range one fetch may cover.
pub const MAX_FETCH_RANGE: u32 = 8192;

const UPSERT: MethodDescriptor =
    MethodDescriptor::data("leaderboard.Leaderboard/UpsertElements", true);
const FETCH_BY_RANK: MethodDescriptor =
    MethodDescriptor::data("leaderboard.Leaderboard/GetByRank", true);
const LENGTH: MethodDescriptor =
    MethodDescriptor::data("leaderboard.Leaderboard/GetLeaderboardLength", true);
const DELETE: MethodDescriptor =
    MethodDescriptor::data("leaderboard.Leaderboard/DeleteLeaderboard", true);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardElement {
    pub id: u32,
    pub score: f64,
}

/// Element returned by a fetch, with its 0-based rank.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankedElement {
    pub id: u32,
    pub score: f64,
    pub rank: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

#[derive(Serialize)]
struct LeaderboardRequest<'a> {
    cache_name: &'a str,
    leaderboard: &'a str,
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    cache_name: &'a str,
    leaderboard: &'a str,
    elements: &'a [LeaderboardElement],
}

#[derive(Serialize)]
struct FetchByRankRequest<'a> {
    cache_name: &'a str,
    leaderboard: &'a str,
    start_rank: u32,
    end_rank: u32,
    order: SortOrder,
}

#[derive(Deserialize)]
struct FetchBody {
    elements: Vec<RankedElement>,
}

#[derive(Deserialize)]
struct LengthBody {
    count: u32,
}

#[derive(Debug, Clone)]
pub struct LeaderboardClient {
    pipeline: Pipeline,
}

fn validate_target(cache_name: &str, leaderboard: &str) -> Result<(), SdkError> {
    validate_cache_name(cache_name)?;
    validate_name("leaderboard", leaderboard)
}

fn validate_rank_range(range: &Range<u32>) -> Result<(), SdkError> {
    if range.start >= range.end {
        return Err(SdkError::invalid_argument(format!(
            "rank range {}..{} is empty",
            range.start, range.end
        )));
    }
    if range.end - range.start > MAX_FETCH_RANGE {
        return Err(SdkError::invalid_argument(format!(
            "rank range may span at most {MAX_FETCH_RANGE} elements"
        )));
    }
    Ok(())
}

impl LeaderboardClient {
    pub fn builder() -> ClientBuilder<LeaderboardClient> {
        ClientBuilder::new()
    }

    /// Insert elements or replace the scores of existing ids.
    pub async fn upsert(
        &self,
        cache_name: &str,
        leaderboard: &str,
        elements: &[LeaderboardElement],
    ) -> LeaderboardUpsertResponse {
        if let Err(error) = validate_target(cache_name, leaderboard)
            .and_then(|()| validate_non_empty("elements", elements))
        {
            return Outcome::failure(error);
        }
        let request = UpsertRequest { cache_name, leaderboard, elements };
        call(&self.pipeline, UPSERT, cache_name, &request, |_: Empty| Outcome::Success(())).await
    }

    /// Elements whose rank falls in `ranks` (end exclusive).
    pub async fn fetch_by_rank(
        &self,
        cache_name: &str,
        leaderboard: &str,
        ranks: Range<u32>,
        order: SortOrder,
    ) -> LeaderboardFetchResponse {
        if let Err(error) =
            validate_target(cache_name, leaderboard).and_then(|()| validate_rank_range(&ranks))
        {
            return Outcome::failure(error);
        }
        let request = FetchByRankRequest {
            cache_name,
            leaderboard,
            start_rank: ranks.start,
            end_rank: ranks.end,
            order,
        };
        call(&self.pipeline, FETCH_BY_RANK, cache_name, &request, |body: FetchBody| {
            Outcome::Success(body.elements)
        })
        .await
    }

    pub async fn length(&self, cache_name: &str, leaderboard: &str) -> LeaderboardLengthResponse {
        if let Err(error) = validate_target(cache_name, leaderboard) {
            return Outcome::failure(error);
        }
        let request = LeaderboardRequest { cache_name, leaderboard };
        call(&self.pipeline, LENGTH, cache_name, &request, |body: LengthBody| {
            Outcome::Success(body.count)
        })
        .await
    }

    pub async fn delete(&self, cache_name: &str, leaderboard: &str) -> LeaderboardDeleteResponse {
        if let Err(error) = validate_target(cache_name, leaderboard) {
            return Outcome::failure(error);
        }
        let request = LeaderboardRequest { cache_name, leaderboard };
        call(&self.pipeline, DELETE, cache_name, &request, |_: Empty| Outcome::Success(())).await
    }
}

impl ClientBuilder<LeaderboardClient> {
    pub fn build(self) -> Result<LeaderboardClient, ConfigError> {
        Ok(LeaderboardClient { pipeline: self.pipeline()? })
    }
}
