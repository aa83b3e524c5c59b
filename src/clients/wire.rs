//! JSON payload helpers shared by every client.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::errors::SdkError;
use crate::outcome::OutcomeFamily;
use crate::pipeline::Pipeline;
use crate::transport::MethodDescriptor;

pub(crate) fn encode<T: Serialize>(request: &T) -> Result<Value, SdkError> {
    serde_json::to_value(request)
        .map_err(|e| SdkError::internal(format!("failed to encode request: {e}")))
}

pub(crate) fn decode<T: DeserializeOwned>(payload: Value) -> Result<T, SdkError> {
    serde_json::from_value(payload)
        .map_err(|e| SdkError::internal(format!("unexpected response payload: {e}")))
}

/// Encode `request`, run it through the pipeline and lift the decoded response.
pub(crate) async fn call<Req, Resp, R>(
    pipeline: &Pipeline,
    method: MethodDescriptor,
    resource: &str,
    request: &Req,
    lift: impl FnOnce(Resp) -> R,
) -> R
where
    Req: Serialize,
    Resp: DeserializeOwned,
    R: OutcomeFamily,
{
    let payload = match encode(request) {
        Ok(payload) => payload,
        Err(error) => return R::failure(error),
    };
    pipeline
        .execute(method, resource, payload, |payload| decode(payload).map(lift))
        .await
}

/// Response body carrying nothing of interest.
#[derive(Debug, serde::Deserialize)]
pub(crate) struct Empty {}
