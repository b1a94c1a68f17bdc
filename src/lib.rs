pub mod chat;
pub mod doc_processor;
pub mod knowledge;
pub mod llm;
pub mod prompt;
pub mod retrieval;
pub mod session;
pub mod settings;

pub use chat::{ConversationLog, Message, Role};
pub use llm::{GenerationConfig, Generator, LlmError, Provider};
pub use session::{Session, SessionError, UploadReport, UploadedFile};
pub use settings::{ApiKey, ProviderKind, Settings, SettingsError};
