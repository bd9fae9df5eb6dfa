//! Query parameter types for the activity endpoints.

use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tenantwatch_core::pagination::PageState;
use tenantwatch_core::query::DEFAULT_ERROR_THRESHOLD;

use crate::error::AppError;

/// Query string extractor that rejects malformed parameters with the usual
/// `{error, code}` JSON body instead of axum's plain-text rejection.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// `?page=` (zero-based, default `0`).
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
}

impl PageParams {
    pub fn page_state(&self) -> PageState {
        PageState::at(self.page.unwrap_or(0))
    }
}

/// `?tenant_id=&page=`. A missing or blank tenant id means "recent".
#[derive(Debug, Deserialize)]
pub struct TenantSearchParams {
    #[serde(default)]
    pub tenant_id: String,
    pub page: Option<u32>,
}

/// `?threshold=&page=`.
#[derive(Debug, Deserialize)]
pub struct ErrorRateParams {
    pub threshold: Option<f64>,
    pub page: Option<u32>,
}

impl ErrorRateParams {
    pub fn threshold(&self) -> f64 {
        self.threshold.unwrap_or(DEFAULT_ERROR_THRESHOLD)
    }
}
