//! JSON bodies returned by the submit endpoint.

use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use receipt_ledger::{ErrorKind, ExistingReceipt, SubmitResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptedBody {
    pub success: bool,
    pub message: String,
    pub row: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateBody {
    pub is_duplicate: bool,
    pub row: u64,
    pub existing_receipt: ExistingReceipt,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureBody {
    pub success: bool,
    pub error: String,
}

/// Map a submit result to its HTTP response.
///
/// Accepted and duplicate are both 200. Failures are 400 when the caller
/// sent something unusable and 500 when storage failed.
pub fn submit_response(result: SubmitResult) -> HttpResponse {
    match result {
        SubmitResult::Accepted { row_index } => HttpResponse::Ok().json(AcceptedBody {
            success: true,
            message: format!("Receipt added at row {}.", row_index),
            row: row_index,
        }),
        SubmitResult::Duplicate {
            row_index,
            existing,
        } => HttpResponse::Ok().json(DuplicateBody {
            is_duplicate: true,
            row: row_index,
            message: format!(
                "Duplicate of row {}. Resubmit with force=true to add it anyway.",
                row_index
            ),
            existing_receipt: existing,
        }),
        SubmitResult::Failure { error } => {
            let status = match error.kind() {
                ErrorKind::Input => StatusCode::BAD_REQUEST,
                ErrorKind::Storage => StatusCode::INTERNAL_SERVER_ERROR,
            };
            HttpResponse::build(status).json(FailureBody {
                success: false,
                error: error.to_string(),
            })
        }
    }
}
