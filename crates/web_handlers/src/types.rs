use serde::Serialize;

/// Success envelope wrapping every JSON response body.
///
/// Error responses bypass the envelope and render as
/// `{"error": code, "message": text}` from the error types themselves.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    /// Always true; errors never use this envelope.
    pub success: bool,
    /// The response payload.
    pub data: T,
}

impl<T> ApiResponse<T> {
    /// Wraps a payload in the success envelope.
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_serializes_with_a_success_flag() {
        let body = serde_json::to_value(ApiResponse::new(vec![1, 2, 3])).unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["data"], serde_json::json!([1, 2, 3]));
    }
}
