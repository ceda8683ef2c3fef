use std::io::{self, Read};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use csvflow::{
    ErrorKind, NameMatch, Newline, Options, ReadMode, Reader, Trim, Writer,
};
use serde::{Deserialize, Serialize};

fn rows(data: &str, options: Options) -> Vec<Vec<String>> {
    let mut rdr = Reader::from_reader(options, data.as_bytes()).unwrap();
    let mut out = Vec::new();
    while let Some(row) = rdr.read_row().unwrap() {
        out.push(row.iter().map(str::to_string).collect());
    }
    out
}

#[test]
fn quoted_delimiter() {
    let mut rdr =
        Reader::from_reader(Options::default(), "id,name\n1,\"Ada,Lovelace\"\n".as_bytes())
            .unwrap();
    let row = rdr.read_row().unwrap().unwrap();
    assert_eq!(row.iter().collect::<Vec<_>>(), vec!["1", "Ada,Lovelace"]);
    assert!(!row.was_quoted(0));
    assert!(row.was_quoted(1));
}

#[test]
fn embedded_newline_in_quotes() {
    let data = "id,notes\n1,\"line1\nline2\"\n";
    let mut rdr = Reader::from_reader(Options::default(), data.as_bytes()).unwrap();
    let row = rdr.read_row().unwrap().unwrap();
    assert_eq!(row.field_span(1), "line1\nline2");
    assert_eq!(row.line_number(), 3);
}

#[test]
fn doubled_quote_escape() {
    let data = "id,text\n1,\"a \"\"quote\"\" b\"\n";
    let mut rdr = Reader::from_reader(Options::default(), data.as_bytes()).unwrap();
    let row = rdr.read_row().unwrap().unwrap();
    assert_eq!(row.field_span(1), "a \"quote\" b");
}

#[test]
fn distinct_escape_character() {
    let options = Options {
        delimiter: ';',
        quote: '\'',
        escape: '\\',
        ..Options::default()
    };
    let data = "id;name;note\n1;'Ada;Lovelace';'It\\'s fine'\n";
    let got = rows(data, options);
    assert_eq!(got, vec![vec!["1", "Ada;Lovelace", "It's fine"]]);
}

#[test]
fn column_count_mismatch_is_fatal_when_strict() {
    let mut rdr = Reader::from_reader(Options::default(), "a,b\n1,2\n3\n".as_bytes()).unwrap();
    assert!(rdr.read_row().unwrap().is_some());

    let err = rdr.read_row().unwrap_err();
    match err.into_kind() {
        ErrorKind::UnequalLengths { pos, expected, got } => {
            assert_eq!(pos.row(), 1);
            assert_eq!(expected, 2);
            assert_eq!(got, 1);
        }
        wrong => panic!("expected UnequalLengths, got {:?}", wrong),
    }
}

#[test]
fn lenient_stray_quote_reports_exactly_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = calls.clone();
    let options = Options {
        read_mode: ReadMode::Lenient,
        bad_data_callback: Some(Arc::new(move |ctx| {
            assert_eq!(ctx.position.field(), 1);
            assert!(ctx.raw.starts_with("te\"st"));
            seen.fetch_add(1, Ordering::SeqCst);
        })),
        ..Options::default()
    };
    let mut rdr = Reader::from_reader(options, "a,b\n1,te\"st\n".as_bytes()).unwrap();
    let row = rdr.read_row().unwrap().unwrap();
    assert!(row.field_span(1).starts_with("te\"st"));
    assert!(rdr.read_row().unwrap().is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn strict_unterminated_quote_is_fatal() {
    let mut rdr = Reader::from_reader(Options::default(), "a\n\"open\n".as_bytes()).unwrap();
    let err = rdr.read_row().unwrap_err();
    match err.into_kind() {
        ErrorKind::Parse { pos, .. } => assert_eq!(pos.row(), 0),
        wrong => panic!("expected Parse error, got {:?}", wrong),
    }
}

#[test]
fn mixed_newlines_keep_first_detection() {
    let data = "a\r\n1\n2\r\n";
    let mut rdr = Reader::from_reader(Options::default(), data.as_bytes()).unwrap();
    let mut got = Vec::new();
    while let Some(row) = rdr.read_row().unwrap() {
        got.push(row.iter().map(str::to_string).collect::<Vec<_>>());
    }
    assert_eq!(got, vec![vec!["1"], vec!["2"]]);
    assert_eq!(rdr.detected_newline(), Some(Newline::CrLf));
    assert_eq!(Newline::CrLf.as_str(), "\r\n");
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
struct Note {
    id: u64,
    name: String,
    notes: String,
}

#[test]
fn round_trip_preserves_values_and_quoting() {
    let original = Note {
        id: 1,
        name: "Ada,Lovelace".to_string(),
        notes: "line1\nline2".to_string(),
    };

    let options = Options { newline: Some("\n".to_string()), ..Options::default() };
    let mut wtr = Writer::from_options(options.clone(), String::new()).unwrap();
    wtr.serialize(original.clone()).unwrap();
    let encoded = wtr.into_inner().unwrap();

    let mut rdr = Reader::from_reader(options.clone(), encoded.as_bytes()).unwrap();
    let row = rdr.read_row().unwrap().unwrap();
    assert!(row.was_quoted(1), "delimiter-bearing field came back quoted");
    assert!(row.was_quoted(2), "newline-bearing field came back quoted");

    let mut rdr = Reader::from_reader(options, encoded.as_bytes()).unwrap();
    let decoded: Note = rdr.read_record().unwrap().unwrap();
    assert_eq!(decoded, original);
}

#[test]
fn blank_only_input_yields_nothing() {
    let options = Options { has_header: false, ..Options::default() };
    assert!(rows("\n\n\r\n\r\r\n", options).is_empty());
}

#[test]
fn blank_lines_between_rows_are_skipped() {
    let got = rows("a\n1\n\n\n2\n", Options::default());
    assert_eq!(got, vec![vec!["1"], vec!["2"]]);
}

#[test]
fn trimming_adjusts_fields() {
    let options = Options { trim: Trim::Both, ..Options::default() };
    let got = rows("a,b\n  1  ,  2  \n", options);
    assert_eq!(got, vec![vec!["1", "2"]]);
}

#[test]
fn headers_match_case_insensitively_by_default() {
    let mut rdr = Reader::from_reader(Options::default(), "ID,Name\n1,ada\n".as_bytes()).unwrap();
    assert_eq!(rdr.header_index("id").unwrap(), Some(0));
    assert_eq!(rdr.header_index("NAME").unwrap(), Some(1));

    let options = Options { header_comparer: NameMatch::CaseSensitive, ..Options::default() };
    let mut rdr = Reader::from_reader(options, "ID,Name\n1,ada\n".as_bytes()).unwrap();
    assert_eq!(rdr.header_index("id").unwrap(), None);
}

#[test]
fn dictionary_materialization() {
    let options = Options { detect_column_count: false, ..Options::default() };
    let mut rdr =
        Reader::from_reader(options, "id,name\n1,ada,extra\n2\n".as_bytes()).unwrap();

    let dict = rdr.read_dictionary().unwrap().unwrap();
    assert_eq!(dict["id"], Some("1".to_string()));
    assert_eq!(dict["name"], Some("ada".to_string()));
    assert_eq!(dict["Column2"], Some("extra".to_string()));

    let dict = rdr.read_dictionary().unwrap().unwrap();
    assert_eq!(dict["id"], Some("2".to_string()));
    assert_eq!(dict["name"], None);
}

/// An `io::Read` that trickles bytes out one at a time, forcing every
/// chunk-boundary path in the decoder and parser.
struct Drip<'a>(&'a [u8]);

impl<'a> Read for Drip<'a> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.0.split_first() {
            Some((&byte, rest)) => {
                self.0 = rest;
                if buf.is_empty() {
                    return Ok(0);
                }
                buf[0] = byte;
                Ok(1)
            }
            None => Ok(0),
        }
    }
}

#[test]
fn byte_at_a_time_input_parses_identically() {
    let data = "id,nöte\r\n1,\"line1\nline2\"\r\n2,\"a \"\"q\"\" b\"\r\n";

    let whole = rows(data, Options::default());

    let mut rdr = Reader::from_reader(Options::default(), Drip(data.as_bytes())).unwrap();
    let mut dripped = Vec::new();
    while let Some(row) = rdr.read_row().unwrap() {
        dripped.push(row.iter().map(str::to_string).collect::<Vec<_>>());
    }

    assert_eq!(whole, dripped);
    assert_eq!(rdr.detected_newline(), Some(Newline::CrLf));
}

#[test]
fn small_char_buffer_parses_identically() {
    let options = Options { char_buffer_size: 2, byte_buffer_size: 3, ..Options::default() };
    let data = "a,b\n\"x,y\",z\n1,2\n";
    assert_eq!(rows(data, options), rows(data, Options::default()));
}

#[test]
fn write_read_many_rows_with_custom_dialect() {
    let options = Options {
        delimiter: '|',
        newline: Some("\r\n".to_string()),
        has_header: false,
        ..Options::default()
    };

    let mut wtr = Writer::from_options(options.clone(), String::new()).unwrap();
    for i in 0..50 {
        wtr.write_record([format!("row{}", i), "a|b".to_string(), String::new()])
            .unwrap();
    }
    let encoded = wtr.into_inner().unwrap();

    let got = rows(&encoded, options);
    assert_eq!(got.len(), 50);
    assert_eq!(got[49], vec!["row49", "a|b", ""]);
}
