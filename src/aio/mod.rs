/*!
Asynchronous readers and writers.

The async surface mirrors the blocking one and runs the exact same state
machine; only the refill and drain primitives differ, so parsing behavior
cannot diverge between the two. Futures suspend exclusively at input-read,
output-write and flush boundaries.

Cancellation follows Rust's model: every `.await` is a cancellation point,
and dropping an in-flight future is the cancellation signal. A reader
dropped mid-row stays consistent; calling it again resumes from where the
input stream left off. A writer dropped mid-field may leave a partial field
in its output buffer.

# Example

```no_run
use csvflow::aio::AsyncReader;
use csvflow::Options;

# async fn example() -> Result<(), csvflow::Error> {
let file = tokio::fs::File::open("data.csv").await?;
let mut rdr = AsyncReader::from_reader(Options::default(), file)?;
while let Some(row) = rdr.read_row().await? {
    println!("{} fields", row.field_count());
}
# Ok(())
# }
```
*/

pub use self::io::{AsyncCharRead, AsyncCharWrite, Utf8AsyncReader, Utf8AsyncWriter};
pub use self::reader::AsyncReader;
pub use self::writer::AsyncWriter;

mod io;
mod reader;
mod writer;
