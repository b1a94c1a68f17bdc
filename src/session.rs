use crate::chat::{ConversationLog, Message};
use crate::doc_processor::{self, DocError};
use crate::knowledge::DocumentStore;
use crate::llm::{gemini, openai, Generator, LlmError, Provider};
use crate::prompt;
use crate::retrieval::{self, DEFAULT_TOP_K};
use crate::settings::{ProviderKind, Settings};

/// A file handed over by the presentation layer.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }
}

/// What happened to each file of an upload batch.
#[derive(Debug, Default)]
pub struct UploadReport {
    pub added: usize,
    pub skipped_empty: Vec<String>,
    pub failed: Vec<(String, DocError)>,
}

impl UploadReport {
    pub fn total(&self) -> usize {
        self.added + self.skipped_empty.len() + self.failed.len()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("no files uploaded")]
    NoFiles,
    #[error("question is empty")]
    EmptyQuestion,
    #[error("API key not configured")]
    MissingCredential,
    #[error(transparent)]
    Generation(#[from] LlmError),
}

/// Everything one user works with: knowledge base, transcript, settings.
#[derive(Debug, Default)]
pub struct Session {
    settings: Settings,
    documents: DocumentStore,
    log: ConversationLog,
}

impl Session {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            documents: DocumentStore::new(),
            log: ConversationLog::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn documents(&self) -> &[String] {
        self.documents.documents()
    }

    pub fn messages(&self) -> &[Message] {
        self.log.all()
    }

    /// Extract and store a batch of files.
    ///
    /// A file that fails to extract is recorded in the report and does not
    /// stop the rest of the batch. Blank extractions are not stored.
    pub fn add_files(&mut self, files: Vec<UploadedFile>) -> Result<UploadReport, SessionError> {
        if files.is_empty() {
            return Err(SessionError::NoFiles);
        }

        let mut report = UploadReport::default();
        for file in files {
            match doc_processor::parse_bytes(&file.filename, &file.bytes) {
                Ok(parsed) => {
                    if self.documents.add(parsed.content) {
                        report.added += 1;
                    } else {
                        tracing::info!(file = %file.filename, "no text extracted, skipping");
                        report.skipped_empty.push(file.filename);
                    }
                }
                Err(e) => {
                    tracing::warn!(file = %file.filename, error = %e, "extraction failed");
                    report.failed.push((file.filename, e));
                }
            }
        }

        tracing::info!(
            added = report.added,
            skipped = report.skipped_empty.len(),
            failed = report.failed.len(),
            total_documents = self.documents.len(),
            "files added to knowledge base"
        );
        Ok(report)
    }

    pub fn clear_documents(&mut self) {
        self.documents.clear();
    }

    pub fn clear_chat(&mut self) {
        tracing::info!(removed = self.log.len(), "chat cleared");
        self.log.clear();
    }

    /// Build the generation backend for the current settings.
    pub fn provider(&self) -> Result<Provider, SessionError> {
        let api_key = self
            .settings
            .api_key()
            .cloned()
            .ok_or(SessionError::MissingCredential)?;
        let provider = match self.settings.provider() {
            ProviderKind::Gemini => Provider::Gemini(gemini::GeminiConfig {
                api_key,
                base_url: self.base_url_or(gemini::DEFAULT_BASE_URL),
            }),
            ProviderKind::OpenAi => Provider::OpenAi(openai::OpenAiConfig {
                api_key,
                base_url: self.base_url_or(openai::DEFAULT_BASE_URL),
            }),
        };
        Ok(provider)
    }

    fn base_url_or(&self, default: &str) -> String {
        self.settings.base_url().unwrap_or(default).to_string()
    }

    /// Prompt for `question` from the current knowledge base.
    pub fn build_prompt(&self, question: &str) -> String {
        let context_docs = retrieval::search(self.documents.documents(), question, DEFAULT_TOP_K);
        tracing::debug!(context_docs = context_docs.len(), "retrieved context");
        prompt::compose(&context_docs, question)
    }

    /// Answer a question with retrieved context.
    ///
    /// The transcript only changes when generation succeeds, and then by a
    /// full user/assistant pair.
    pub async fn ask<G: Generator + ?Sized>(
        &mut self,
        generator: &G,
        question: &str,
    ) -> Result<String, SessionError> {
        if question.trim().is_empty() {
            return Err(SessionError::EmptyQuestion);
        }
        if self.settings.api_key().is_none() {
            return Err(SessionError::MissingCredential);
        }

        let prompt = self.build_prompt(question);
        let config = self.settings.generation_config();
        let answer = generator.generate(&prompt, &config).await?;

        self.log.push_exchange(question, answer.clone());
        Ok(answer)
    }
}
