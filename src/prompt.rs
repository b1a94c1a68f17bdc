/// Render the instruction sent to the model.
///
/// Context documents are joined with newlines and inserted verbatim, as is
/// the question.
pub fn compose<S: AsRef<str>>(context_docs: &[S], question: &str) -> String {
    let context = context_docs
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "\nYou are a helpful AI assistant. Use the following context to answer the question.\n\
         \n\
         Context: {context}\n\
         \n\
         Question: {question}\n\
         \n\
         Answer in a clear and human-like way:\n"
    )
}
