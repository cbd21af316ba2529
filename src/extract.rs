//! Request extractors

use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;

use crate::{AppError, AppState};

/// `Json<T>` whose rejections use the service's `{"error": ...}` body.
///
/// Statuses are the framework's: 422 when the body does not match `T`
/// (missing field, wrong numeric subtype), 400 for malformed JSON, 415 when
/// the request is not declared as JSON.
pub struct ValidJson<T>(pub T);

#[axum::async_trait]
impl<T> FromRequest<AppState> for ValidJson<T>
where
    T: DeserializeOwned + Send,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(AppError::Rejected {
                status: rejection.status(),
                message: state.config.locale.invalid_request(&rejection.body_text()),
            }),
        }
    }
}
