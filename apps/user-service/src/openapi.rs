//! OpenAPI documentation configuration

use utoipa::OpenApi;

/// Combined OpenAPI documentation for the User Service
#[derive(OpenApi)]
#[openapi(
    info(
        title = "User Service API",
        version = "1.0",
        description = "Simple CRUD API for user management",
        contact(name = "Mark Ko", email = "MarkKo@gmail.com"),
        license(name = "Apache 2.0")
    ),
    servers(
        (url = "http://localhost:8080", description = "Development")
    ),
    nest(
        (path = "/users", api = domain_users::ApiDoc)
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info() {
        let doc = ApiDoc::openapi();
        assert_eq!(doc.info.title, "User Service API");
        assert_eq!(doc.info.version, "1.0");

        let contact = doc.info.contact.unwrap();
        assert_eq!(contact.name.as_deref(), Some("Mark Ko"));
        assert_eq!(contact.email.as_deref(), Some("MarkKo@gmail.com"));
        assert_eq!(doc.info.license.unwrap().name, "Apache 2.0");
    }

    #[test]
    fn test_user_paths_are_nested() {
        let doc = ApiDoc::openapi();
        for path in [
            "/users",
            "/users/create",
            "/users/read/{id}",
            "/users/update/{id}",
            "/users/delete/{id}",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing path {}", path);
        }
    }
}
