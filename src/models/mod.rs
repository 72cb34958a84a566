pub mod message;
pub mod patient;
pub mod record;
pub mod settings;

pub use message::{Message, MessageRole};
pub use patient::{ParticipantRole, PatientInfo};
pub use record::{ConversationRecord, HistoryEntry, SavedReport};
pub use settings::AppSettings;
