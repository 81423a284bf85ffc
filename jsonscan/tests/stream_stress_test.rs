// SPDX-License-Identifier: Apache-2.0

//! Runs the same documents through every combination of small buffer sizes
//! and read chunk sizes, and checks that the token stream never changes.

use jsonscan::{ChunkReader, Config, Kind, ParseError, Reader, Scanner};

use test_log::test;

const DOCUMENT: &[u8] = br#"{
    "hello": "world",
    "count": 42,
    "pi": -3.14159e+0,
    "escaped": "tab\there \"quoted\" \u00e9\ud83d\ude00 done",
    "flags": [true, false, null],
    "nested": {"a": [[], {}, [1, [2, [3]]]], "b": "\\\/"},
    "long key that will not fit in a tiny buffer at all": "and a value that is longer still, spanning many refills"
}"#;

#[derive(Debug, PartialEq)]
struct Token {
    kind: Kind,
    level: usize,
    name: Option<String>,
    value: Option<String>,
}

fn collect<R: Reader>(mut scanner: Scanner<R>) -> Result<Vec<Token>, String>
where
    R::Error: core::fmt::Debug,
{
    let mut tokens = Vec::new();
    while let Ok(Some(kind)) = scanner.next_token() {
        let level = scanner.nesting_level();
        let name = scanner.name_str().map(str::to_string);
        let value = scanner.value_str().map(str::to_string);
        tokens.push(Token {
            kind,
            level,
            name,
            value,
        });
    }
    match scanner.into_error() {
        None => Ok(tokens),
        Some(e) => Err(format!("{:?}", e)),
    }
}

fn reference() -> Vec<Token> {
    collect(Scanner::new(DOCUMENT)).expect("reference scan failed")
}

fn scan_with(capacity: usize, min_read: usize, chunk_size: usize) -> Result<Vec<Token>, String> {
    let config = Config {
        initial_capacity: capacity,
        min_read,
        multiple_documents: false,
    };
    collect(Scanner::with_config(
        ChunkReader::new(DOCUMENT, chunk_size),
        config,
    ))
}

#[test]
fn test_reference_tokens() {
    let tokens = reference();
    assert_eq!(tokens.first().map(|t| t.kind), Some(Kind::ObjectStart));
    assert_eq!(tokens.last().map(|t| t.kind), Some(Kind::End));

    let escaped = tokens
        .iter()
        .find(|t| t.name.as_deref() == Some("escaped"))
        .and_then(|t| t.value.as_deref());
    assert_eq!(escaped, Some("tab\there \"quoted\" \u{e9}\u{1f600} done"));

    let slashes = tokens
        .iter()
        .find(|t| t.name.as_deref() == Some("b"))
        .and_then(|t| t.value.as_deref());
    assert_eq!(slashes, Some("\\/"));

    let numbers: Vec<&str> = tokens
        .iter()
        .filter(|t| t.kind == Kind::Number)
        .filter_map(|t| t.value.as_deref())
        .collect();
    assert_eq!(numbers, ["42", "-3.14159e+0", "1", "2", "3"]);
}

macro_rules! stress_matrix {
    (@row $capacity:literal [$($chunk:literal),*]) => {
        $(
            paste::paste! {
                #[test]
                fn [<test_capacity_ $capacity _chunk_ $chunk>]() {
                    let got = scan_with($capacity, 1, $chunk);
                    assert_eq!(got, Ok(reference()));
                }
            }
        )*
    };
    ($($capacity:literal),* ; $chunks:tt) => {
        $( stress_matrix!(@row $capacity $chunks); )*
    };
}

stress_matrix!(1, 2, 3, 7, 16, 64, 4096; [1, 2, 3, 5, 8, 13, 64, 1000]);

#[test]
fn test_min_read_larger_than_capacity() {
    for chunk in [1, 4, 100] {
        assert_eq!(scan_with(2, 64, chunk), Ok(reference()), "chunk {}", chunk);
    }
}

#[test]
fn test_error_offset_is_independent_of_chunking() {
    let json = br#"{"ok": [1, 2, 3], "also ok": "yes", "bad": tru}"#;
    let want = json.iter().position(|&b| b == b'}').unwrap();
    for capacity in [1, 4, 16, 1024] {
        for chunk in [1, 2, 7, 1000] {
            let mut scanner = Scanner::with_config(
                ChunkReader::new(json, chunk),
                Config {
                    initial_capacity: capacity,
                    min_read: 1,
                    multiple_documents: false,
                },
            );
            while scanner.scan() {}
            let err = scanner.into_error();
            let got = err.as_ref().and_then(ParseError::as_syntax).map(|e| e.offset());
            assert_eq!(got, Some(want), "capacity {}, chunk {}", capacity, chunk);
        }
    }
}

#[test]
fn test_many_documents_through_small_buffer() {
    let mut input = Vec::new();
    for i in 0..200 {
        input.extend_from_slice(format!("{{\"n\": {}, \"s\": \"v\\u0041{}\"}}\n", i, i).as_bytes());
    }
    let mut scanner = Scanner::with_config(
        ChunkReader::new(&input, 9),
        Config {
            initial_capacity: 16,
            min_read: 8,
            multiple_documents: true,
        },
    );
    let mut seen = 0;
    while scanner.scan() {
        if scanner.name() == Some(&b"s"[..]) {
            let want = format!("vA{}", seen);
            assert_eq!(scanner.value_str(), Some(want.as_str()));
            seen += 1;
        }
    }
    assert!(scanner.err().is_none());
    assert_eq!(seen, 200);
}
