/// In-memory knowledge base: extracted document texts in upload order.
#[derive(Debug, Default, Clone)]
pub struct DocumentStore {
    docs: Vec<String>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a document. Blank texts are rejected and `false` is returned.
    pub fn add(&mut self, text: String) -> bool {
        if text.trim().is_empty() {
            return false;
        }
        self.docs.push(text);
        true
    }

    pub fn clear(&mut self) {
        tracing::info!(removed = self.docs.len(), "knowledge base cleared");
        self.docs.clear();
    }

    pub fn documents(&self) -> &[String] {
        &self.docs
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}
