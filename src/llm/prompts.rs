//! Prompt text shared by the language-model backends.

/// Characters of content forwarded to Gemini for summarization.
pub const GOOGLE_SUMMARY_CONTENT_CHARS: usize = 300_000;
/// Characters of the summary embedded in a quiz prompt.
pub const QUIZ_SUMMARY_CHARS: usize = 1_000;
/// Characters of source content embedded in a quiz prompt.
pub const QUIZ_CONTENT_CHARS: usize = 2_000;

pub const SUMMARY_SYSTEM: &str =
    "You are an expert summarizer. Provide clear, educational summaries.";

pub const QUIZ_SYSTEM: &str =
    "You are an expert quiz generator for educational content. Return ONLY valid JSON.";

const QUIZ_SCHEMA_EXAMPLE: &str = r#"{
    "questions": [
        {
            "id": 1,
            "question": "Question text here?",
            "type": "multiple_choice",
            "options": ["Option A", "Option B", "Option C", "Option D"],
            "correct_answer": "Option A",
            "explanation": "Why this answer is correct based on the content"
        },
        {
            "id": 2,
            "question": "True or False statement",
            "type": "true_false",
            "correct_answer": true,
            "explanation": "Explanation"
        },
        {
            "id": 3,
            "question": "Fill in the blank: The capital of France is _____",
            "type": "fill_blank",
            "correct_answer": "Paris",
            "explanation": "From the content"
        }
    ]
}"#;

/// Longest prefix of `text` holding at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

pub fn summary_prompt(content: &str, max_content_chars: usize) -> String {
    format!(
        "Provide a concise summary of the following content in 150-200 words only.\n\
         Focus on the 3-5 most important key points.\n\
         Make it suitable for educational purposes.\n\
         Keep it brief and impactful.\n\n\
         Content:\n{}\n\n\
         Summary:",
        truncate_chars(content, max_content_chars)
    )
}

pub fn quiz_prompt(summary: &str, content: &str, num_questions: usize) -> String {
    format!(
        "Based on the following summary and source content, generate {} educational quiz questions.\n\
         Mix multiple_choice, true_false and fill_blank questions.\n\n\
         Return ONLY valid JSON (no markdown code blocks) with this exact structure:\n{}\n\n\
         SUMMARY (use this for context):\n{}\n\n\
         SOURCE CONTENT (ground questions here):\n{}\n\n\
         Generate now:",
        num_questions,
        QUIZ_SCHEMA_EXAMPLE,
        truncate_chars(summary, QUIZ_SUMMARY_CHARS),
        truncate_chars(content, QUIZ_CONTENT_CHARS)
    )
}
