//! Splitting long replies into transport-sized chunks.

/// Maximum characters Telegram accepts in a single message.
pub const MESSAGE_LIMIT: usize = 4096;

/// Split `text` into ordered chunks of at most `limit` characters.
///
/// Chunk boundaries fall on character boundaries but make no attempt to
/// avoid splitting mid-word. Concatenating the chunks in order reproduces
/// `text` exactly; empty input yields no chunks.
pub fn segment(text: &str, limit: usize) -> Vec<String> {
    debug_assert!(limit > 0);

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut count = 0;

    for ch in text.chars() {
        current.push(ch);
        count += 1;
        if count == limit {
            chunks.push(std::mem::take(&mut current));
            count = 0;
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_no_chunks() {
        assert!(segment("", 10).is_empty());
        assert!(segment("", MESSAGE_LIMIT).is_empty());
    }

    #[test]
    fn short_input_is_a_single_chunk() {
        assert_eq!(segment("hello", 10), vec!["hello"]);
    }

    #[test]
    fn chunks_respect_the_limit_and_concatenate_back() {
        let text = "abcdefghij".repeat(100);
        for limit in [1, 3, 7, 10, 999, 4096] {
            let chunks = segment(&text, limit);
            assert!(chunks.iter().all(|c| c.chars().count() <= limit));
            assert_eq!(chunks.concat(), text);
        }
    }

    #[test]
    fn exact_multiple_of_limit_has_no_trailing_empty_chunk() {
        let chunks = segment("abcdef", 3);
        assert_eq!(chunks, vec!["abc", "def"]);
    }

    #[test]
    fn multibyte_text_splits_on_character_boundaries() {
        let text = "пример вывода с кириллицей".repeat(50);
        let chunks = segment(&text, 17);
        assert!(chunks.iter().all(|c| c.chars().count() <= 17));
        assert_eq!(chunks.concat(), text);
    }
}
