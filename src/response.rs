use serde::Serialize;

/// Uniform response envelope: `data` carries the payload on success and is
/// `null` on failure; `errors` is the ordered list of validation messages
/// and is empty on success.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub data: Option<T>,
    pub errors: Vec<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            data: Some(data),
            errors: Vec::new(),
        }
    }

    pub fn failure(errors: Vec<String>) -> Self {
        Self {
            data: None,
            errors,
        }
    }
}
