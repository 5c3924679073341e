//! Request and response types for the work-log backend

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Body of a streamed chat request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The user's question
    pub question: String,
    /// Logical conversation the question belongs to
    pub session_id: String,
}

/// A work-log entry to submit
///
/// `project` and `tomorrow` are required by the backend; the rest default to
/// empty. A missing `record_date` means "today" server-side.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_date: Option<NaiveDate>,
    #[serde(default)]
    pub product: String,
    pub project: String,
    #[serde(default)]
    pub others: String,
    #[serde(default)]
    pub risks: String,
    pub tomorrow: String,
}

/// Server echo of a stored work record
#[derive(Debug, Clone, Deserialize)]
pub struct WorkRecordReceipt {
    pub record_date: NaiveDate,
    pub product: String,
    pub project: String,
    pub others: String,
    pub risks: String,
    pub tomorrow: String,
    pub created_at: String,
}

/// Error payload attached to non-success responses
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_wire_shape() {
        let req = ChatRequest {
            question: "what did I do last week?".into(),
            session_id: "abc-123".into(),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["question"], "what did I do last week?");
        assert_eq!(json["session_id"], "abc-123");
    }

    #[test]
    fn test_work_record_omits_missing_date() {
        let record = WorkRecord {
            project: "shipped the login module".into(),
            tomorrow: "wire up payments".into(),
            ..Default::default()
        };
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("record_date").is_none());
        assert_eq!(json["project"], "shipped the login module");
    }

    #[test]
    fn test_error_body_parses_fastapi_detail() {
        let body: ErrorBody = serde_json::from_str(r#"{"detail":"no record for 2025-11-30"}"#).unwrap();
        assert_eq!(body.detail, "no record for 2025-11-30");
    }
}
