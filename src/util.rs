// Telegram rejects messages longer than 4096 characters
pub const MAX_MESSAGE_LENGTH: usize = 4096;

/// Splits text into segments of at most `limit` characters, preserving order.
pub fn chunk_text(text: &str, limit: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut count = 0;

    for c in text.chars() {
        if count == limit {
            chunks.push(std::mem::take(&mut current));
            count = 0;
        }
        current.push(c);
        count += 1;
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

/// Parses the keyword input format: one keyword or phrase per line,
/// surrounding whitespace trimmed, empty lines dropped.
pub fn split_keywords(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}
