use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::message::Message;
use super::patient::PatientInfo;

/// Snapshot of a conversation handed to the report renderer.
///
/// Read-only once staged: the renderer never mutates it, and uploaded files
/// are carried by name only — the core never retains file bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationRecord {
    pub patient_info: PatientInfo,
    pub messages: Vec<Message>,
    #[serde(default)]
    pub files: Vec<String>,
    pub date: DateTime<Utc>,
}

/// A previously generated report. The handle points at the stored document;
/// the blob's lifetime is owned by the store, not by the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedReport {
    pub id: String,
    pub date: DateTime<Utc>,
    pub patient_name: String,
    pub document_handle: String,
}

/// One completed exchange appended to the chat history log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub date: DateTime<Utc>,
    pub patient_name: String,
    pub messages: Vec<Message>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::message::MessageRole;
    use crate::models::patient::ParticipantRole;

    #[test]
    fn record_round_trips_through_json() {
        let record = ConversationRecord {
            patient_info: PatientInfo {
                name: "Ada".into(),
                role: ParticipantRole::Patient,
                cancer_type: "Breast".into(),
                stage: None,
                treatments: None,
                concerns: None,
            },
            messages: vec![Message::new(MessageRole::Assistant, "Hello Ada")],
            files: vec!["scan.pdf".into()],
            date: Utc::now(),
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"patientInfo\""));
        let back: ConversationRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn files_default_to_empty() {
        let record: ConversationRecord = serde_json::from_str(
            r#"{
                "patientInfo": {"name":"Ada","role":"patient","cancerType":"Lung"},
                "messages": [],
                "date": "2026-03-01T10:00:00Z"
            }"#,
        )
        .unwrap();
        assert!(record.files.is_empty());
    }

    #[test]
    fn saved_report_uses_camel_case_keys() {
        let report = SavedReport {
            id: "r1".into(),
            date: Utc::now(),
            patient_name: "Ada".into(),
            document_handle: "/api/reports/r1/document".into(),
        };
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"patientName\""));
        assert!(json.contains("\"documentHandle\""));
    }
}
