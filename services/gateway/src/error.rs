use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use types::errors::AuctionError;

/// Central error type for the Gateway application
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Auction(#[from] AuctionError),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

impl AppError {
    fn parts(&self) -> (StatusCode, String, &'static str) {
        match self {
            AppError::Auction(err) => {
                let (status, code) = match err {
                    AuctionError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
                    AuctionError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                    AuctionError::AuctionClosed { .. } => {
                        (StatusCode::BAD_REQUEST, "AUCTION_CLOSED")
                    }
                    AuctionError::InvalidAmount => (StatusCode::BAD_REQUEST, "INVALID_AMOUNT"),
                    AuctionError::AmountOutOfRange => {
                        (StatusCode::BAD_REQUEST, "AMOUNT_OUT_OF_RANGE")
                    }
                    AuctionError::BidTooHigh { .. } => (StatusCode::BAD_REQUEST, "BID_TOO_HIGH"),
                    AuctionError::Store(_) => {
                        return (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            "Internal server error".to_string(),
                            "INTERNAL_ERROR",
                        );
                    }
                };
                (status, err.to_string(), code)
            }
            AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                "INTERNAL_ERROR",
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message, code) = self.parts();

        if status.is_server_error() {
            tracing::error!(error = %self, detail = ?self, "Request failed");
        }

        let body = Json(json!({
            "error": code,
            "message": error_message
        }));

        (status, body).into_response()
    }
}
