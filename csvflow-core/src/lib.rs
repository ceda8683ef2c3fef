/*!
`csvflow-core` provides the engine underneath the
[`csvflow`](https://docs.rs/csvflow) crate: an incremental character-level CSV
parser, a pooled row buffer with zero-copy field slices, and the quoting
emitter used when writing.

This crate knows nothing about I/O. The parser is fed chunks of characters
and reports when it needs more, so the same state machine serves blocking and
asynchronous callers. If you want to read CSV from files, readers or async
streams, use `csvflow` instead.

# Example: parsing rows

```
use csvflow_core::{Parser, Status};

let chars: Vec<char> = "a,b\nx,\"y,z\"\n".chars().collect();
let mut parser = Parser::new();
let mut rows = 0;
let mut input = &chars[..];
loop {
    let (n, status) = parser.advance(input, true);
    input = &input[n..];
    match status {
        Status::NeedInput => unreachable!("the whole input was supplied"),
        Status::Row => {
            rows += 1;
            if rows == 2 {
                assert_eq!(parser.row().get(1), Some("y,z"));
            }
        }
        Status::End => break,
    }
}
assert_eq!(rows, 2);
```

# Example: deciding quotes

```
use csvflow_core::Emitter;

let emitter = Emitter::new();
assert!(emitter.needs_quotes("a,b"));
assert!(!emitter.needs_quotes("plain"));
let runs: Vec<&str> = emitter.escape_runs("say \"hi\"").collect();
assert_eq!(runs, vec!["say ", "hi", ""]);
```
*/

#![deny(missing_docs)]

pub use crate::buffer::{FieldToken, RowBuffer, Trim};
pub use crate::reader::{Anomaly, AnomalyKind, Newline, Parser, ParserBuilder, Status};
pub use crate::row::{Row, RowIter};
pub use crate::writer::{Emitter, EmitterBuilder, EscapeRuns};

mod buffer;
pub mod pool;
mod reader;
mod row;
mod writer;
