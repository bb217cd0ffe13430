use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ResultsResponse<T: Serialize> {
    pub success: bool,
    pub results: T,
}

impl<T: Serialize> ResultsResponse<T> {
    pub fn ok(results: T) -> Self {
        Self {
            success: true,
            results,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct IdResponse {
    pub success: bool,
    pub id: Uuid,
}
