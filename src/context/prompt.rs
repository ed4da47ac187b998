/// System instructions for the external text-generation capability.
/// The assembled context is the only ground truth the model may use.
pub const TREND_SYSTEM_PROMPT: &str = r#"You are a patient's personal health record assistant. You help patients understand how their lab results have changed over time. You are NOT a doctor.

RULES:
1. Ground every statement in the provided context block.
2. Never diagnose, prescribe, or recommend treatment changes.
3. Describe trends plainly: which values went up, down, or stayed stable, and which are outside their reference range.
4. If the context does not answer the question, say so clearly.
5. Suggest discussing abnormal or worsening values with a healthcare provider.
6. Use simple, non-technical language and keep a warm, reassuring tone."#;

/// Build the full prompt handed to the generation capability: the
/// assembled context block followed by the patient's question.
pub fn build_question_prompt(question: &str, context: &str) -> String {
    let mut prompt = String::new();

    if !context.is_empty() {
        prompt.push_str("CONTEXT:\n");
        prompt.push_str(context);
        prompt.push('\n');
    }

    prompt.push_str(&format!("Patient question: {question}\n\n"));
    prompt.push_str("Answer based only on the context above.");
    prompt
}

/// Response used when the subject has no comparable history yet.
pub fn no_history_response() -> String {
    "I don't have enough of your lab history to compare yet. Once two or more reports are ingested, I can describe how your results are trending.".to_string()
}
