//! Splitting long text into provider-sized chunks.
//!
//! Prefers sentence boundaries; falls back to hard character splits only
//! when a single sentence itself exceeds the limit. No input character is
//! ever dropped — concatenating the chunks reproduces the text up to
//! inter-sentence whitespace.

/// Split `text` into chunks of at most `max_chars` characters each.
pub fn split_chunks(text: &str, max_chars: usize) -> Vec<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    if trimmed.chars().count() <= max_chars {
        return vec![trimmed.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();

    for sentence in split_sentences(trimmed) {
        let sentence_len = sentence.chars().count();

        if sentence_len > max_chars {
            if !current.is_empty() {
                chunks.push(current.trim_end().to_string());
                current.clear();
            }
            let mut pieces = hard_split(&sentence, max_chars);
            // The last piece may still take on following sentences.
            if let Some(last) = pieces.pop() {
                chunks.extend(pieces);
                current = last;
                current.push(' ');
            }
            continue;
        }

        if current.chars().count() + sentence_len < max_chars {
            current.push_str(&sentence);
            current.push(' ');
        } else {
            if !current.is_empty() {
                chunks.push(current.trim_end().to_string());
            }
            current = sentence;
            current.push(' ');
        }
    }

    if !current.trim().is_empty() {
        chunks.push(current.trim_end().to_string());
    }

    chunks
}

/// Split on sentence-terminating punctuation followed by whitespace.
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        if matches!(c, '.' | '?' | '!') && chars.peek().is_none_or(|n| n.is_whitespace()) {
            while chars.peek().is_some_and(|n| n.is_whitespace()) {
                chars.next();
            }
            let sentence = current.trim().to_string();
            if !sentence.is_empty() {
                sentences.push(sentence);
            }
            current.clear();
        }
    }

    let tail = current.trim().to_string();
    if !tail.is_empty() {
        sentences.push(tail);
    }

    sentences
}

/// Split a single over-long sentence at character boundaries.
fn hard_split(sentence: &str, max_chars: usize) -> Vec<String> {
    let chars: Vec<char> = sentence.chars().collect();
    chars
        .chunks(max_chars)
        .map(|piece| piece.iter().collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Concatenation with all whitespace removed, for loss checks.
    fn squash(s: &str) -> String {
        s.chars().filter(|c| !c.is_whitespace()).collect()
    }

    #[test]
    fn test_short_text_is_one_chunk() {
        let chunks = split_chunks("Hello world.", 100);
        assert_eq!(chunks, vec!["Hello world.".to_string()]);
    }

    #[test]
    fn test_empty_text_has_no_chunks() {
        assert!(split_chunks("   ", 100).is_empty());
    }

    #[test]
    fn test_splits_on_sentence_boundaries() {
        let text = "One two three. Four five six! Seven eight nine?";
        let chunks = split_chunks(text, 20);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0], "One two three.");
        assert_eq!(chunks[1], "Four five six!");
        assert_eq!(chunks[2], "Seven eight nine?");
    }

    #[test]
    fn test_accumulates_sentences_below_limit() {
        let text = "A b. C d. E f. G h.";
        let chunks = split_chunks(text, 100);
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn test_hard_split_for_single_long_sentence() {
        let sentence = "x".repeat(10);
        let chunks = split_chunks(&sentence, 4);
        assert!(chunks.iter().all(|c| c.chars().count() <= 4));
        assert_eq!(squash(&chunks.join("")), sentence);
    }

    #[test]
    fn test_chunk_size_invariant_10k_chars() {
        // One long paragraph of repeated sentences.
        let sentence = "The quick brown fox jumps over the lazy dog and keeps on running. ";
        let mut text = String::new();
        while text.chars().count() < 10_000 {
            text.push_str(sentence);
        }
        let text = text.chars().take(10_000).collect::<String>();

        let chunks = split_chunks(&text, 4_500);
        assert!(chunks.len() >= 3);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 4_500, "chunk too long");
        }
        assert_eq!(squash(&chunks.join(" ")), squash(&text));
    }

    #[test]
    fn test_no_trailing_content_dropped() {
        let text = format!("{} trailing words without period", "Complete sentence. ".repeat(30));
        let chunks = split_chunks(&text, 80);
        assert_eq!(squash(&chunks.join(" ")), squash(&text));
        assert!(chunks.last().unwrap().contains("trailing words"));
    }

    #[test]
    fn test_multibyte_safe_hard_split() {
        let sentence = "é".repeat(10);
        let chunks = split_chunks(&sentence, 3);
        assert!(chunks.iter().all(|c| c.chars().count() <= 3));
        assert_eq!(squash(&chunks.join("")), sentence);
    }
}
