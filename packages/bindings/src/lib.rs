use napi::Result as NapiResult;
use napi_derive::napi;

use syndicate_core::distribution::{self, DistributionRequest};
use syndicate_core::sensitivity::{self, SensitivityInput};
use syndicate_core::waterfall::{self, DealEconomics};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Waterfall
// ---------------------------------------------------------------------------

/// Run the distribution waterfall for a JSON deal and return the JSON
/// envelope with tiers and the returns summary.
#[napi]
pub fn calculate_waterfall(input_json: String) -> NapiResult<String> {
    let deal: DealEconomics = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = waterfall::calculate_waterfall(&deal).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Distributions
// ---------------------------------------------------------------------------

#[napi]
pub fn distribute_pro_rata(input_json: String) -> NapiResult<String> {
    let request: DistributionRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = distribution::distribute_pro_rata(&request).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Sensitivity
// ---------------------------------------------------------------------------

#[napi]
pub fn waterfall_sensitivity(input_json: String) -> NapiResult<String> {
    let input: SensitivityInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = sensitivity::calculate_sensitivity(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn engine_version() -> String {
    syndicate_core::VERSION.to_string()
}
