use serde::{Deserialize, Serialize};

/// Whether the person chatting is the patient themselves or someone
/// caring for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantRole {
    Patient,
    Caregiver,
}

impl ParticipantRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Patient => "patient",
            Self::Caregiver => "caregiver",
        }
    }
}

/// Onboarding details collected before the first chat turn.
///
/// `stage`, `treatments` and `concerns` are optional free-text fields;
/// empty strings from the form are treated the same as absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientInfo {
    pub name: String,
    pub role: ParticipantRole,
    pub cancer_type: String,
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(default)]
    pub treatments: Option<String>,
    #[serde(default)]
    pub concerns: Option<String>,
}

impl PatientInfo {
    /// The synthetic first user turn built from onboarding answers.
    ///
    /// The UI submits this through the normal chat path so the model sees
    /// the person's context before their first real question.
    pub fn introduction(&self) -> String {
        let mut intro = format!(
            "Hello, I'm {}. I'm a {} dealing with {} cancer",
            self.name,
            self.role.as_str(),
            self.cancer_type,
        );
        if let Some(stage) = self.stage.as_deref().filter(|s| !s.trim().is_empty()) {
            intro.push_str(&format!(" at stage {stage}"));
        }
        intro.push('.');
        if let Some(t) = self.treatments.as_deref().filter(|s| !s.trim().is_empty()) {
            intro.push_str(&format!(" I've been undergoing {t}."));
        }
        if let Some(c) = self.concerns.as_deref().filter(|s| !s.trim().is_empty()) {
            intro.push_str(&format!(" My main concerns are: {c}"));
        }
        intro
    }
}
