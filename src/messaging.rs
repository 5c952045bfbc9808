//! Discord messaging: size limits and outbound chunking.

pub mod discord;

pub use discord::DiscordHandler;

/// Hard per-message character limit imposed by Discord.
pub const MESSAGE_CHAR_LIMIT: usize = 2000;

/// Chunk size for replies over the hard limit; the margin leaves headroom
/// under the platform cap.
pub const REPLY_CHUNK_CHARS: usize = 1990;

/// Split `text` into consecutive chunks of at most `max_chars` characters.
///
/// Splits are purely positional so the chunks concatenate back to the
/// original string. Counts characters, not bytes; a chunk never lands inside
/// a UTF-8 code point.
pub fn split_message(text: &str, max_chars: usize) -> Vec<&str> {
    debug_assert!(max_chars > 0);
    let mut chunks = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        let boundary = rest
            .char_indices()
            .nth(max_chars)
            .map(|(index, _)| index)
            .unwrap_or(rest.len());
        chunks.push(&rest[..boundary]);
        rest = &rest[boundary..];
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_one_chunk() {
        assert_eq!(split_message("hello", REPLY_CHUNK_CHARS), vec!["hello"]);
        let exactly = "a".repeat(REPLY_CHUNK_CHARS);
        assert_eq!(split_message(&exactly, REPLY_CHUNK_CHARS).len(), 1);
    }

    #[test]
    fn two_chunk_split_round_trips() {
        let text = "x".repeat(3980);
        let chunks = split_message(&text, REPLY_CHUNK_CHARS);
        assert_eq!(chunks.len(), 2);
        assert!(chunks.iter().all(|c| c.chars().count() <= REPLY_CHUNK_CHARS));
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn five_thousand_chars_make_three_chunks() {
        let text = "y".repeat(5000);
        let chunks = split_message(&text, REPLY_CHUNK_CHARS);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].chars().count(), 1990);
        assert_eq!(chunks[1].chars().count(), 1990);
        assert_eq!(chunks[2].chars().count(), 1020);
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn counts_characters_not_bytes() {
        // Three bytes per character; byte-based slicing would split early.
        let text = "あ".repeat(4000);
        let chunks = split_message(&text, REPLY_CHUNK_CHARS);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].chars().count(), 1990);
        assert_eq!(chunks[2].chars().count(), 20);
        assert_eq!(chunks.concat(), text);
    }
}
