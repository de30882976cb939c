//! Reusable OpenAPI response types for consistent API documentation.

use super::ErrorResponse;
use utoipa::ToResponse;

#[derive(ToResponse)]
#[response(
    description = "Internal Server Error",
    content_type = "application/json",
    example = json!({
        "code": 1005,
        "error": "INTERNAL_ERROR",
        "detail": "An internal server error occurred"
    })
)]
pub struct InternalServerErrorResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Bad Request - Validation Error",
    content_type = "application/json",
    example = json!({
        "code": 1001,
        "error": "VALIDATION_ERROR",
        "detail": "Request validation failed",
        "errors": {
            "email": [{
                "code": "email",
                "message": "must be a valid email address",
                "params": {"value": "not-an-email"}
            }]
        }
    })
)]
pub struct BadRequestValidationResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Bad Request - Invalid id",
    content_type = "application/json",
    example = json!({
        "code": 1002,
        "error": "INVALID_ID",
        "detail": "Invalid id: abc"
    })
)]
pub struct BadRequestIdResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Unprocessable Entity - Malformed JSON body",
    content_type = "application/json",
    example = json!({
        "code": 1003,
        "error": "JSON_EXTRACTION",
        "detail": "Failed to deserialize the JSON body into the target type: missing field `age`"
    })
)]
pub struct UnprocessableEntityResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Resource not found",
    content_type = "application/json",
    example = json!({
        "code": 1004,
        "error": "NOT_FOUND",
        "detail": "User not found"
    })
)]
pub struct NotFoundResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Conflict - Email already in use",
    content_type = "application/json",
    example = json!({
        "code": 1008,
        "error": "CONFLICT",
        "detail": "Email already in use"
    })
)]
pub struct ConflictResponse(pub ErrorResponse);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;
    use serde_json::Value;
    use utoipa::openapi::RefOr;

    fn example_of<'a, R: ToResponse<'a>>() -> Value {
        match R::response().1 {
            RefOr::T(response) => response.content["application/json"]
                .example
                .clone()
                .unwrap(),
            RefOr::Ref(_) => panic!("expected an inline response"),
        }
    }

    #[test]
    fn test_examples_match_error_codes() {
        let cases = [
            (example_of::<InternalServerErrorResponse>(), ErrorCode::InternalError),
            (example_of::<BadRequestValidationResponse>(), ErrorCode::ValidationError),
            (example_of::<BadRequestIdResponse>(), ErrorCode::InvalidId),
            (example_of::<UnprocessableEntityResponse>(), ErrorCode::JsonExtraction),
            (example_of::<NotFoundResponse>(), ErrorCode::NotFound),
            (example_of::<ConflictResponse>(), ErrorCode::Conflict),
        ];

        for (example, code) in cases {
            assert_eq!(example["code"], code.code());
            assert_eq!(example["error"], code.as_str());
        }
    }

    #[test]
    fn test_examples_show_user_messages() {
        assert_eq!(example_of::<NotFoundResponse>()["detail"], "User not found");
        assert_eq!(
            example_of::<ConflictResponse>()["detail"],
            "Email already in use"
        );
    }
}
