//! Common types used across the WorkSim system

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Which side of the training conversation the human trainee is playing.
///
/// `Customer` means the trainee plays the customer and the model answers as a
/// support agent; `Employee` means the trainee plays the employee and the
/// model plays the customer while grading the trainee's replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    Customer,
    Employee,
}

impl ChatRole {
    pub fn from_str(s: &str) -> Option<ChatRole> {
        match s.to_lowercase().as_str() {
            "customer" => Some(ChatRole::Customer),
            "employee" => Some(ChatRole::Employee),
            _ => None,
        }
    }

    /// Korean speaker label used when rendering history into prompts
    pub fn prompt_label(&self) -> &'static str {
        match self {
            ChatRole::Customer => "고객",
            ChatRole::Employee => "직원",
        }
    }
}

/// One turn of conversation history, supplied by the caller. The orchestrator
/// never persists these; it only reads the most recent bounded suffix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: ChatRole,
    pub content: String,
}

/// A generated role-play scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub situation: String,
    pub customer_type: String,
    pub first_message: String,
}

/// Structured grading of one trainee reply
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evaluation {
    pub score: u32,
    pub max_score: u32,
    pub feedback: String,
}

/// Result of a chat turn. `evaluation` is present only when the trainee plays
/// the employee role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatOutcome {
    pub response: String,
    pub evaluation: Option<Evaluation>,
}

/// Inbound chat request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub project_id: String,
    pub conversation_id: String,
    pub user_id: Option<String>,
    pub role: ChatRole,
    pub message: String,
    pub model_id: String,
    pub api_keys: Option<HashMap<String, String>>,
    pub guidelines: Option<String>,
    pub history: Option<Vec<ConversationTurn>>,
}

/// Inbound scenario-generation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioRequest {
    pub project_id: String,
    pub user_id: Option<String>,
    pub model_id: String,
    pub api_keys: Option<HashMap<String, String>>,
    pub guidelines: Option<String>,
}

/// Receipt for a completed document upload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub file_id: String,
    pub chunk_count: usize,
}

/// Outcome of a project-file deletion. Failures are reported here rather than
/// propagated as errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteOutcome {
    pub success: bool,
    pub message: String,
}

/// Service health report: local provider reachability plus which provider
/// backends are wired into the capability table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub local_provider_reachable: bool,
    pub providers: std::collections::BTreeMap<String, bool>,
}

/// Local model listing. Listing errors degrade to an empty list plus message
/// instead of failing the request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocalModels {
    pub models: Vec<String>,
    pub error: Option<String>,
}

/// Result of a best-effort parse: the value is always usable, `degraded`
/// records whether any field fell back to its documented default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parsed<T> {
    pub value: T,
    pub degraded: bool,
}

impl<T> Parsed<T> {
    /// A parse that matched the expected format completely
    pub fn clean(value: T) -> Self {
        Self {
            value,
            degraded: false,
        }
    }

    /// A parse where at least one field fell back to a default
    pub fn degraded(value: T) -> Self {
        Self {
            value,
            degraded: true,
        }
    }
}
