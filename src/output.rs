//! JSON response types and formatting for CLI output.

use mnemon::{Error, MemoryRecord, SearchHit};
use serde::Serialize;

/// Response for successful memory insertion.
#[derive(Serialize)]
pub struct AddResponse {
    pub status: String,
    pub ids: Vec<String>,
}

/// Response for search results.
#[derive(Serialize)]
pub struct SearchResponse {
    pub results: Vec<SearchHit>,
}

/// Response for threshold deletion.
#[derive(Serialize)]
pub struct ForgetResponse {
    pub status: String,
    pub deleted: usize,
    pub score_limit: f64,
}

/// Response for retrieving a specific memory.
#[derive(Serialize)]
pub struct GetResponse {
    #[serde(flatten)]
    pub memory: MemoryRecord,
    pub dimensions: usize,
}

/// Response for deletion by id.
#[derive(Serialize)]
pub struct DeleteResponse {
    pub status: String,
    pub deleted: usize,
}

/// Response for counting memories.
#[derive(Serialize)]
pub struct CountResponse {
    pub collection: String,
    pub count: usize,
}

/// Response for listing memories.
#[derive(Serialize)]
pub struct ListResponse {
    pub memories: Vec<MemoryRecord>,
}

/// Version response.
#[derive(Serialize)]
pub struct VersionResponse {
    pub name: String,
    pub version: String,
}

/// Response for errors.
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Print a value as formatted JSON to stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<(), Error> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> MemoryRecord {
        MemoryRecord {
            id: "test-id".to_string(),
            text: "test content".to_string(),
            embedding: vec![0.6, 0.8],
            created_at: "2024-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_serialize_add_response() {
        let response = AddResponse {
            status: "added".to_string(),
            ids: vec!["a".to_string(), "b".to_string()],
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"status\":\"added\""));
        assert!(json.contains("\"ids\":[\"a\",\"b\"]"));
    }

    #[test]
    fn test_serialize_search_response() {
        let response = SearchResponse {
            results: vec![SearchHit {
                id: "test-id".to_string(),
                text: "test content".to_string(),
                distance: 0.25,
            }],
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"results\""));
        assert!(json.contains("\"distance\":0.25"));
    }

    #[test]
    fn test_serialize_get_response_flattens_record() {
        let response = GetResponse {
            memory: record(),
            dimensions: 2,
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["id"], "test-id");
        assert_eq!(value["text"], "test content");
        assert_eq!(value["dimensions"], 2);
        assert!(value.get("embedding").is_none());
    }

    #[test]
    fn test_serialize_forget_response() {
        let response = ForgetResponse {
            status: "forgotten".to_string(),
            deleted: 3,
            score_limit: 0.5,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"deleted\":3"));
        assert!(json.contains("\"score_limit\":0.5"));
    }
}
