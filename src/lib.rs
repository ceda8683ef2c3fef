/*!
csvflow is a streaming CSV reader and writer.

Rows are parsed incrementally by a character-level state machine and exposed
as zero-copy field slices over a pooled, recycled row buffer. Writing makes
quoting decisions strictly on content and escapes quotes with segmented
writes. Blocking and async (tokio) surfaces share the same state machine, so
their behavior is identical.

# Reading

[`Reader`] parses rows on demand. Each [`Row`] borrows the reader's internal
buffer and is valid until the next read; copy a field with
[`Row::field_string`] if you need to keep it.

```
use csvflow::{Options, Reader};

# fn example() -> Result<(), csvflow::Error> {
let data = "\
id,name,notes
1,\"Ada,Lovelace\",\"line1
line2\"
";
let mut rdr = Reader::from_reader(Options::default(), data.as_bytes())?;
while let Some(row) = rdr.read_row()? {
    assert_eq!(row.field_span(1), "Ada,Lovelace");
    assert_eq!(row.field_span(2), "line1\nline2");
}
# Ok(())
# }
# example().unwrap();
```

Rows can also be materialized as name/value dictionaries
([`Reader::read_dictionary`]) or deserialized into records with serde:

```
use csvflow::{Options, Reader};
use serde::Deserialize;

# fn example() -> Result<(), csvflow::Error> {
#[derive(Deserialize)]
struct City {
    city: String,
    pop: u64,
}

let data = "city,pop\nBoston,4628910\n";
let mut rdr = Reader::from_reader(Options::default(), data.as_bytes())?;
for result in rdr.deserialize::<City>() {
    let record = result?;
    assert_eq!(record.pop, 4628910);
    assert_eq!(record.city, "Boston");
}
# Ok(())
# }
# example().unwrap();
```

# Writing

[`Writer`] quotes only what needs quoting: fields containing the delimiter,
the quote, a newline, or boundary whitespace.

```
use csvflow::{Options, Writer};

# fn example() -> Result<(), csvflow::Error> {
let options = Options { newline: Some("\n".to_string()), ..Options::default() };
let mut wtr = Writer::from_options(options, String::new())?;
wtr.write_record(["id", "text"])?;
wtr.write_record(["1", "say \"hi\""])?;
assert_eq!(wtr.into_inner()?, "id,text\n1,\"say \"\"hi\"\"\"\n");
# Ok(())
# }
# example().unwrap();
```

# Error handling

Reading is strict by default: the first structural anomaly (stray quote,
unterminated quote, column-count mismatch) fails with an [`Error`] carrying
the row, line and field. Under [`ReadMode::Lenient`] each anomaly instead
invokes the configured `bad_data_callback` exactly once and parsing
continues with best-effort field contents.

# Async

The [`aio`] module mirrors the blocking API on tokio I/O, suspending only
at read, write and flush boundaries.
*/

#![deny(missing_docs)]

pub use csvflow_core::{
    Anomaly, AnomalyKind, FieldToken, Newline, Row, RowIter, Trim,
};

pub use crate::convert::{ConvertError, Culture, FromField, ToField};
pub use crate::de::{DeserializeError, DeserializeErrorKind};
pub use crate::error::{BadDataContext, Error, ErrorKind, Position, Result};
pub use crate::input::{CharRead, Utf8Reader};
pub use crate::options::{BadDataHandler, NameMatch, Options, ReadMode};
pub use crate::output::{CharWrite, Utf8Writer};
pub use crate::reader::{DeserializeIter, Reader};
pub use crate::writer::Writer;

pub mod aio;
pub mod convert;
mod de;
mod error;
mod input;
mod options;
mod output;
mod reader;
mod ser;
mod writer;
