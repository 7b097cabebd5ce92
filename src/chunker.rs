use tracing::debug;

pub const DEFAULT_MAX_WORDS: usize = 28;

/// Splits `text` into chunks of at most `max_words` whitespace-separated words.
///
/// The same chunks feed narration and subtitle images, so both stay in sync.
/// A `max_words` of zero is treated as one.
pub fn chunk_text(text: &str, max_words: usize) -> Vec<String> {
    let max_words = max_words.max(1);
    let normalized = text.replace(['\r', '\n'], " ");

    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::with_capacity(max_words);
    for word in normalized.split_whitespace() {
        current.push(word);
        if current.len() >= max_words {
            chunks.push(current.join(" "));
            current.clear();
        }
    }
    if !current.is_empty() {
        chunks.push(current.join(" "));
    }

    debug!("Split text into {} chunks of up to {} words", chunks.len(), max_words);
    chunks
}
