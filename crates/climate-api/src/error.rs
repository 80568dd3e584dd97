use crate::registry::RegionNotFound;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use climate_types::{ErrorBody, InvalidRequest};

#[derive(Debug)]
pub(crate) enum ApiError {
    RegionNotFound(RegionNotFound),
    InvalidRequest(InvalidRequest),
    InvalidBody(JsonRejection),
    MissingQuery(&'static str),
    Internal(String),
}

impl From<RegionNotFound> for ApiError {
    fn from(err: RegionNotFound) -> Self {
        ApiError::RegionNotFound(err)
    }
}

impl From<InvalidRequest> for ApiError {
    fn from(err: InvalidRequest) -> Self {
        ApiError::InvalidRequest(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(err: JsonRejection) -> Self {
        ApiError::InvalidBody(err)
    }
}

impl ApiError {
    pub(crate) fn status(&self) -> StatusCode {
        match self {
            ApiError::RegionNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidRequest(_) | ApiError::MissingQuery(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::InvalidBody(rejection) => rejection.status(),
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub(crate) fn body(&self) -> ErrorBody {
        match self {
            ApiError::RegionNotFound(err) => ErrorBody {
                detail: err.to_string(),
                available_regions: Some(err.available.clone()),
            },
            ApiError::InvalidRequest(err) => ErrorBody {
                detail: err.to_string(),
                available_regions: None,
            },
            ApiError::InvalidBody(rejection) => ErrorBody {
                detail: rejection.body_text(),
                available_regions: None,
            },
            ApiError::MissingQuery(field) => ErrorBody {
                detail: format!("missing query parameter {field}"),
                available_regions: None,
            },
            ApiError::Internal(detail) => ErrorBody {
                detail: detail.clone(),
                available_regions: None,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = self.body();
        if status.is_server_error() {
            tracing::error!(status = %status, detail = %body.detail, "request failed");
        } else {
            tracing::warn!(status = %status, detail = %body.detail, "request rejected");
        }
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_not_found_is_404_with_regions() {
        let err = ApiError::from(RegionNotFound {
            requested: "Atlantis".to_string(),
            available: vec!["Austin, TX".to_string()],
        });
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        let body = err.body();
        assert_eq!(
            body.detail,
            "Region 'Atlantis' not found. Available regions: ['Austin, TX']"
        );
        assert_eq!(body.available_regions, Some(vec!["Austin, TX".to_string()]));
    }

    #[test]
    fn validation_and_internal_statuses() {
        let invalid = ApiError::from(InvalidRequest {
            field: "latitude",
            message: "91 must be between -90 and 90".to_string(),
        });
        assert_eq!(invalid.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(invalid.body().detail, "latitude: 91 must be between -90 and 90");
        assert_eq!(
            ApiError::MissingQuery("region2").status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        let internal = ApiError::Internal("Failed to reload artifacts: boom".to_string());
        assert_eq!(internal.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
