use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: Option<T>, message: Option<String>) -> Self {
        Self {
            success: true,
            data,
            message,
            errors: None,
        }
    }

    pub fn error(message: Option<String>, errors: Option<Vec<String>>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            message,
            errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope_shape() {
        let response = ApiResponse::success(
            Some(serde_json::json!({"name": "Shoes"})),
            Some("Category retrieved successfully.".to_string()),
        );
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["data"]["name"], "Shoes");
        assert_eq!(value["message"], "Category retrieved successfully.");
        assert!(value.get("errors").is_none());
    }

    #[test]
    fn test_success_with_null_data() {
        let response = ApiResponse::<()>::success(
            None,
            Some("Category created successfully.".to_string()),
        );
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["success"], true);
        assert!(value["data"].is_null());
    }

    #[test]
    fn test_error_envelope_shape() {
        let response = ApiResponse::<()>::error(Some("Name is required.".to_string()), None);
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["success"], false);
        assert!(value["data"].is_null());
        assert_eq!(value["message"], "Name is required.");
    }
}
