//! Fixed-width splitting of long answers into message-sized pieces.

/// Default piece size, kept under Telegram's 4096-character message cap.
pub const DEFAULT_CHUNK_LIMIT: usize = 4000;

/// Split `text` into consecutive pieces of at most `limit` characters.
///
/// Counts Unicode scalar values, so a piece never ends inside a character.
/// A `limit` of zero is treated as one. Empty input yields no pieces.
pub fn chunks(text: &str, limit: usize) -> Chunks<'_> {
    Chunks {
        rest: text,
        limit: limit.max(1),
    }
}

/// Lazy iterator returned by [`chunks`]. Cloning restarts from the clone point.
#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    rest: &'a str,
    limit: usize,
}

impl<'a> Iterator for Chunks<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.rest.is_empty() {
            return None;
        }
        let end = self
            .rest
            .char_indices()
            .nth(self.limit)
            .map_or(self.rest.len(), |(idx, _)| idx);
        let (head, tail) = self.rest.split_at(end);
        self.rest = tail;
        Some(head)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.rest.is_empty() {
            return (0, Some(0));
        }
        // Byte length bounds the char count from above; each char is at most 4 bytes.
        let bytes = self.rest.len();
        (
            bytes.div_ceil(self.limit.saturating_mul(4)),
            Some(bytes.div_ceil(self.limit)),
        )
    }
}

impl std::iter::FusedIterator for Chunks<'_> {}
