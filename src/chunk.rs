/// Splits a narration script into word chunks for the scene-breakdown
/// fan-out, so each model call stays well inside its context window.
///
/// Words are whitespace-delimited; every chunk holds exactly
/// `chunk_size_words` words except possibly the last. Order is preserved
/// with no overlap and no gap: joining the chunks with single spaces
/// reproduces the whitespace-normalized script.
pub fn chunk_script(script: &str, chunk_size_words: usize) -> Vec<String> {
    assert!(chunk_size_words > 0, "chunk size must be positive");

    let words: Vec<&str> = script.split_whitespace().collect();
    if words.is_empty() {
        return Vec::new();
    }

    words
        .chunks(chunk_size_words)
        .map(|chunk| chunk.join(" "))
        .collect()
}
