use std::fmt;
use std::ops;

use crate::buffer::RowBuffer;

/// A read-only view of one parsed row.
///
/// The view borrows the parser's row buffer: every field accessor returns a
/// slice into the shared arena without copying. The borrow ties the view's
/// lifetime to the parser, so a row cannot outlive the next read. Callers who
/// need to keep field data use [`Row::field_string`].
#[derive(Clone, Copy)]
pub struct Row<'r> {
    buf: &'r RowBuffer,
    row_index: u64,
    line_number: u64,
}

impl<'r> Row<'r> {
    pub(crate) fn new(buf: &'r RowBuffer, row_index: u64, line_number: u64) -> Row<'r> {
        Row { buf, row_index, line_number }
    }

    /// The number of fields in this row.
    pub fn field_count(&self) -> usize {
        self.buf.len()
    }

    /// True if the row has no fields.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Return the field at index `i`, or `None` if out of range.
    pub fn get(&self, i: usize) -> Option<&'r str> {
        self.buf.field(i)
    }

    /// Return the field at index `i` as a borrowed slice of the row arena.
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of range; use [`Row::get`] for a fallible lookup.
    pub fn field_span(&self, i: usize) -> &'r str {
        match self.buf.field(i) {
            Some(field) => field,
            None => panic!(
                "field index {} out of range for row with {} fields",
                i,
                self.buf.len()
            ),
        }
    }

    /// Return the field at index `i` as an owned string.
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of range.
    pub fn field_string(&self, i: usize) -> String {
        self.field_span(i).to_string()
    }

    /// Whether the field at index `i` was enclosed in quotes in the input.
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of range.
    pub fn was_quoted(&self, i: usize) -> bool {
        self.buf.tokens()[i].quoted
    }

    /// The zero-based index of this row, counting data rows only.
    pub fn row_index(&self) -> u64 {
        self.row_index
    }

    /// The one-based number of the physical line this row ended on.
    pub fn line_number(&self) -> u64 {
        self.line_number
    }

    /// Returns an iterator over the fields of this row.
    pub fn iter(&self) -> RowIter<'r> {
        RowIter { row: *self, i: 0 }
    }
}

impl<'r> ops::Index<usize> for Row<'r> {
    type Output = str;

    fn index(&self, i: usize) -> &str {
        self.field_span(i)
    }
}

impl<'r> IntoIterator for &Row<'r> {
    type Item = &'r str;
    type IntoIter = RowIter<'r>;

    fn into_iter(self) -> RowIter<'r> {
        self.iter()
    }
}

impl<'r> fmt::Debug for Row<'r> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Row")
            .field("row_index", &self.row_index)
            .field("line_number", &self.line_number)
            .field("fields", &self.iter().collect::<Vec<_>>())
            .finish()
    }
}

/// An iterator over the fields of a row.
pub struct RowIter<'r> {
    row: Row<'r>,
    i: usize,
}

impl<'r> Iterator for RowIter<'r> {
    type Item = &'r str;

    fn next(&mut self) -> Option<&'r str> {
        let field = self.row.get(self.i)?;
        self.i += 1;
        Some(field)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let rest = self.row.field_count() - self.i;
        (rest, Some(rest))
    }
}

impl<'r> ExactSizeIterator for RowIter<'r> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Trim;

    fn buffer(fields: &[&str]) -> RowBuffer {
        let mut buf = RowBuffer::new();
        for field in fields {
            for ch in field.chars() {
                buf.push(ch);
            }
            buf.complete_field(false, Trim::None);
        }
        buf
    }

    #[test]
    fn accessors() {
        let buf = buffer(&["a", "bc", ""]);
        let row = Row::new(&buf, 4, 9);

        assert_eq!(row.field_count(), 3);
        assert_eq!(row.get(1), Some("bc"));
        assert_eq!(row.get(3), None);
        assert_eq!(&row[0], "a");
        assert_eq!(row.field_string(2), "");
        assert_eq!(row.row_index(), 4);
        assert_eq!(row.line_number(), 9);
        assert_eq!(row.iter().collect::<Vec<_>>(), vec!["a", "bc", ""]);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn out_of_range_index_panics() {
        let buf = buffer(&["only"]);
        let row = Row::new(&buf, 0, 1);
        let _ = row.field_span(1);
    }
}
