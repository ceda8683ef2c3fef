use crate::pool;

/// The trimming policy applied when a field is completed.
///
/// Trimming adjusts the field's token offsets only; the characters stay in
/// the arena untouched. Quoted fields are never trimmed.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Trim {
    /// Leave fields exactly as they were read.
    #[default]
    None,
    /// Remove leading whitespace.
    Start,
    /// Remove trailing whitespace.
    End,
    /// Remove both leading and trailing whitespace.
    Both,
}

impl Trim {
    /// Whether this policy removes leading whitespace.
    pub fn trims_start(&self) -> bool {
        matches!(*self, Trim::Start | Trim::Both)
    }

    /// Whether this policy removes trailing whitespace.
    pub fn trims_end(&self) -> bool {
        matches!(*self, Trim::End | Trim::Both)
    }
}

/// The location of a single field within a row arena.
///
/// Offsets are byte offsets into the arena and always fall on character
/// boundaries. Invariant: `start + len <= arena.len()`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FieldToken {
    /// Byte offset of the first character of the field.
    pub start: u32,
    /// Byte length of the field.
    pub len: u32,
    /// Whether the field was enclosed in quotes in the input.
    pub quoted: bool,
}

/// A reusable row buffer: an append-only char arena plus the token list
/// locating each completed field inside it.
///
/// The buffer is recycled from row to row with `reset`, which is O(1) and
/// keeps the storage. Storage is rented from the shared pool and returned
/// on drop.
#[derive(Debug)]
pub struct RowBuffer {
    /// All field characters of the current row, stored contiguously.
    arena: String,
    /// The location of each completed field.
    tokens: Vec<FieldToken>,
    /// Arena offset where the in-progress field begins.
    field_start: u32,
}

impl RowBuffer {
    /// Create a row buffer with pooled storage.
    pub fn new() -> RowBuffer {
        RowBuffer {
            arena: pool::rent_string(0),
            tokens: Vec::with_capacity(32),
            field_start: 0,
        }
    }

    /// Clear the arena and token list without releasing storage.
    pub fn reset(&mut self) {
        self.arena.clear();
        self.tokens.clear();
        self.field_start = 0;
    }

    /// Append one character to the in-progress field.
    pub fn push(&mut self, ch: char) {
        self.arena.push(ch);
    }

    /// The length in bytes of the in-progress field.
    pub fn current_field_len(&self) -> usize {
        self.arena.len() - self.field_start as usize
    }

    /// Complete the in-progress field, applying the trim policy by shrinking
    /// the token's window over the arena. No characters are moved or copied.
    pub fn complete_field(&mut self, quoted: bool, trim: Trim) {
        let start = self.field_start as usize;
        let raw = &self.arena[start..];
        let (offset, len) = if quoted {
            (0, raw.len())
        } else {
            let lead = if trim.trims_start() {
                raw.len() - raw.trim_start().len()
            } else {
                0
            };
            let trimmed = if trim.trims_end() {
                raw[lead..].trim_end()
            } else {
                &raw[lead..]
            };
            (lead, trimmed.len())
        };
        self.tokens.push(FieldToken {
            start: (start + offset) as u32,
            len: len as u32,
            quoted,
        });
        self.field_start = self.arena.len() as u32;
    }

    /// True if this row is a blank line: exactly one zero-length unquoted
    /// field.
    pub fn is_blank_line(&self) -> bool {
        self.tokens.len() == 1 && self.tokens[0].len == 0 && !self.tokens[0].quoted
    }

    /// The number of completed fields.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// True if no field has been completed yet.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Return the field at index `i`, or `None` if out of range.
    pub fn field(&self, i: usize) -> Option<&str> {
        self.tokens.get(i).map(|t| {
            let start = t.start as usize;
            &self.arena[start..start + t.len as usize]
        })
    }

    /// The token list of the completed fields.
    pub fn tokens(&self) -> &[FieldToken] {
        &self.tokens
    }

    /// The number of bytes currently stored in the arena.
    pub fn arena_len(&self) -> usize {
        self.arena.len()
    }
}

impl Default for RowBuffer {
    fn default() -> RowBuffer {
        RowBuffer::new()
    }
}

impl Drop for RowBuffer {
    fn drop(&mut self) {
        pool::give_string(std::mem::take(&mut self.arena));
    }
}
