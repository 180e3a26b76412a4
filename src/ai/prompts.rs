/// Reply format shared by every naming prompt
const JSON_REPLY: &str =
    r#"Reply with JSON only, on a single line: {"suggested_name": "name", "category": "category", "confidence": 0.9}"#;

/// Vision prompt for photos and screenshots
pub fn image_prompt() -> String {
    format!(
        "Based on the content of this image, suggest a short file name in English or Chinese (at most 15 words).\n{}",
        JSON_REPLY
    )
}

/// Vision prompt for the rasterized first page of a PDF
pub fn pdf_prompt() -> String {
    format!(
        "This is the first page of a PDF document. Based on what the document says, suggest a short file name in English or Chinese (at most 15 words).\n{}",
        JSON_REPLY
    )
}

/// Text prompt for files the model cannot look at
pub fn filename_prompt(base_name: &str) -> String {
    format!(
        "Original file name: {}\nBased on what the name means, suggest a short file name in English or Chinese (at most 15 words).\n{}",
        base_name, JSON_REPLY
    )
}

/// Prompt for remote chat-completion providers
pub fn remote_prompt(file_name: &str, extension: &str) -> String {
    format!(
        r#"You are a file naming expert. Produce a concise, meaningful new name for this file.

Original file name: {}
File type: {}

Requirements:
1. At most 20 characters
2. Do not include the extension
3. Do not use any of these characters: / \ : * ? " < > |
4. English or Chinese, keep it short

Return a single JSON object and nothing else:
{{"suggested_name": "new name", "category": "file category", "confidence": 0.9}}"#,
        file_name, extension
    )
}
