//! Import command - load search hits into the local store

use crate::{BulkError, db::Database, query::RowSource};
use serde::Deserialize;
use std::fs;
use std::path::Path;

type Result<T> = std::result::Result<T, BulkError>;

/// Accepted file shapes: a plain array of hits, or a search response
#[derive(Deserialize)]
#[serde(untagged)]
enum ImportFile {
    Hits(Vec<RowSource>),
    Response { hits: HitsBlock },
}

#[derive(Deserialize)]
struct HitsBlock {
    hits: Vec<RowSource>,
}

/// Parse hits from JSON text, optionally forcing every hit into `index`
///
/// # Errors
///
/// Returns `BulkError::JsonError` if the text is neither an array of hits nor
/// a search response.
pub fn parse_hits(text: &str, index: Option<&str>) -> Result<Vec<RowSource>> {
    let mut rows = match serde_json::from_str::<ImportFile>(text) {
        Ok(ImportFile::Hits(rows)) => rows,
        Ok(ImportFile::Response { hits }) => hits.hits,
        // re-parse as an array for a precise error
        Err(_) => serde_json::from_str::<Vec<RowSource>>(text)?,
    };

    if let Some(index) = index {
        for row in &mut rows {
            row.index = index.to_string();
        }
    }
    Ok(rows)
}

/// Execute the import command
///
/// # Errors
/// Returns an error if the file cannot be read or parsed, or a document cannot be stored
pub fn execute(db: &Database, file: &Path, index: Option<&str>, quiet: bool) -> Result<usize> {
    let text = fs::read_to_string(file).map_err(|e| {
        BulkError::InvalidInput(format!("Cannot read '{}': {e}", file.display()))
    })?;
    let rows = parse_hits(&text, index)?;

    let stored = db.insert_many(&rows)?;
    db.flush()?;

    tracing::info!(file = %file.display(), stored, "imported documents");
    if !quiet {
        println!("Imported {stored} document(s) from {}", file.display());
    }
    Ok(stored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::RowIdentifier;
    use crate::testing::TestDb;

    #[test]
    fn test_parse_array() {
        let rows = parse_hits(
            r#"[{"_index":"articles","_id":"1","_source":{"title":"A"}},{"_index":"articles","_id":"2"}]"#,
            None,
        )
        .unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[1].source.is_null());
    }

    #[test]
    fn test_parse_search_response() {
        let rows = parse_hits(
            r#"{"took":3,"hits":{"total":1,"hits":[{"_index":"a","_id":"1","_source":{}}]}}"#,
            None,
        )
        .unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_parse_index_override() {
        let rows = parse_hits(r#"[{"_index":"a","_id":"1"}]"#, Some("b")).unwrap();
        assert_eq!(rows[0].index, "b");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            parse_hits(r#"{"nope":true}"#, None),
            Err(BulkError::JsonError(_))
        ));
    }

    #[test]
    fn test_import_file() {
        let test_db = TestDb::new();
        let file = test_db.path().join("hits.json");
        fs::write(&file, r#"[{"_index":"articles","_id":"1","_source":{"title":"A"}}]"#).unwrap();

        let stored = execute(test_db.db(), &file, None, true).unwrap();

        assert_eq!(stored, 1);
        assert!(test_db.db().contains(&RowIdentifier::new("articles", "1")).unwrap());
    }

    #[test]
    fn test_import_missing_file() {
        let test_db = TestDb::new();
        let result = execute(test_db.db(), Path::new("/nonexistent/hits.json"), None, true);
        assert!(matches!(result, Err(BulkError::InvalidInput(_))));
    }
}
