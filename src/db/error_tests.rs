//! Unit tests for database error types

#[cfg(test)]
mod tests {
    use crate::db::error::DbError;
    use std::error::Error;

    #[test]
    fn test_not_found_error() {
        let error = DbError::NotFound("articles:1".to_string());
        assert_eq!(error.to_string(), "Document not found: articles:1");
    }

    #[test]
    fn test_invalid_input_error() {
        let error = DbError::InvalidInput("missing _index".to_string());
        assert_eq!(error.to_string(), "Invalid input: missing _index");
    }

    #[test]
    fn test_json_error_has_source() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error = DbError::from(json_err);
        assert!(error.to_string().starts_with("Invalid document source"));
        assert!(error.source().is_some());
    }

    #[test]
    fn test_error_debug() {
        let error = DbError::InvalidInput("test error".to_string());
        let debug = format!("{error:?}");
        assert!(debug.contains("InvalidInput"));
        assert!(debug.contains("test error"));
    }

    #[test]
    fn test_error_source_none_for_plain_variants() {
        let error = DbError::NotFound("x".to_string());
        assert!(error.source().is_none());
    }

    #[test]
    fn test_not_found_error_creation() {
        let id = "articles:7";
        let error = DbError::NotFound(id.to_string());

        match error {
            DbError::NotFound(p) => assert_eq!(p, id),
            _ => panic!("Expected NotFound variant"),
        }
    }
}
