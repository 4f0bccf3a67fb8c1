// crates/toolwire-core/tests/stream_reader.rs
// ============================================================================
// Module: Streaming Reader Tests
// Description: Body reading across framing, noise, cancellation, and failure.
// Purpose: Ensure fragments survive noise in order and aborted reads report it.
// ============================================================================

//! Streaming response reader tests.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::io;
use std::io::BufReader;
use std::io::Read;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use toolwire_core::EnvelopeNormalizer;
use toolwire_core::StreamError;
use toolwire_core::StreamReader;

fn reader() -> StreamReader {
    StreamReader::new(EnvelopeNormalizer::default())
}

fn line(text: &str) -> String {
    format!("{{\"result\":{{\"content\":[{{\"type\":\"text\",\"text\":\"{text}\"}}]}}}}\n")
}

/// Yields its chunks one read at a time, then fails or ends.
struct ScriptedBody {
    chunks: Vec<Vec<u8>>,
    fail_at_end: bool,
    cancel_after_first: Option<Arc<AtomicBool>>,
    reads: usize,
}

impl Read for ScriptedBody {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.chunks.is_empty() {
            if self.fail_at_end {
                return Err(io::Error::new(io::ErrorKind::ConnectionReset, "connection reset"));
            }
            return Ok(0);
        }
        let chunk = self.chunks.remove(0);
        buf[.. chunk.len()].copy_from_slice(&chunk);
        self.reads += 1;
        if self.reads == 1
            && let Some(flag) = &self.cancel_after_first
        {
            flag.store(true, Ordering::Release);
        }
        Ok(chunk.len())
    }
}

#[test]
fn empty_body_yields_no_fragments() {
    assert!(reader().read(&b""[..]).unwrap().is_empty());
}

#[test]
fn body_without_valid_json_yields_no_fragments() {
    let body = b"garbage\n: keep-alive\n{broken\n\n";
    assert!(reader().read(&body[..]).unwrap().is_empty());
}

#[test]
fn single_document_without_trailing_newline() {
    let body = br#"{"output":{"message":{"role":"assistant","content":[{"text":"done"}]}}}"#;
    assert_eq!(reader().read(&body[..]).unwrap(), vec!["done".to_string()]);
}

#[test]
fn valid_lines_survive_interleaved_noise_in_order() {
    let mut body = String::new();
    for index in 0 .. 5 {
        body.push_str(&line(&format!("part-{index}")));
        body.push_str("not json at all\n\n");
    }
    let fragments = reader().read(body.as_bytes()).unwrap();
    let expected: Vec<String> = (0 .. 5).map(|index| format!("part-{index}")).collect();
    assert_eq!(fragments, expected);
}

#[test]
fn sse_framed_body_is_unwrapped() {
    let body = "event: message\ndata: {\"response\":\"hello\"}\n\n";
    assert_eq!(reader().read(body.as_bytes()).unwrap(), vec!["hello".to_string()]);
}

#[test]
fn decoded_lines_without_text_are_ignored() {
    let body = format!("{{\"status\":\"working\"}}\n{}", line("answer"));
    assert_eq!(reader().read(body.as_bytes()).unwrap(), vec!["answer".to_string()]);
}

#[test]
fn lines_split_across_reads_are_reassembled() {
    let full = line("joined");
    let (head, tail) = full.as_bytes().split_at(10);
    let body = ScriptedBody {
        chunks: vec![head.to_vec(), tail.to_vec()],
        fail_at_end: false,
        cancel_after_first: None,
        reads: 0,
    };
    let fragments = reader().read(BufReader::with_capacity(64, body)).unwrap();
    assert_eq!(fragments, vec!["joined".to_string()]);
}

#[test]
fn mid_stream_failure_discards_fragments() {
    let body = ScriptedBody {
        chunks: vec![line("one").into_bytes(), line("two").into_bytes()],
        fail_at_end: true,
        cancel_after_first: None,
        reads: 0,
    };
    let err = reader().read(BufReader::with_capacity(256, body)).unwrap_err();
    match err {
        StreamError::PartialRead {
            fragments_discarded,
            reason,
        } => {
            assert_eq!(fragments_discarded, 2);
            assert!(reason.contains("connection reset"));
        }
        StreamError::Decode(_) => panic!("expected partial read"),
    }
}

#[test]
fn cancellation_before_read_reports_partial() {
    let flag = Arc::new(AtomicBool::new(true));
    let err = reader().with_cancel(flag).read(line("x").as_bytes()).unwrap_err();
    assert_eq!(
        err,
        StreamError::PartialRead {
            fragments_discarded: 0,
            reason: "read cancelled".to_string(),
        }
    );
}

#[test]
fn cancellation_mid_stream_discards_accumulated_text() {
    let flag = Arc::new(AtomicBool::new(false));
    let body = ScriptedBody {
        chunks: vec![line("first").into_bytes(), line("second").into_bytes()],
        fail_at_end: false,
        cancel_after_first: Some(Arc::clone(&flag)),
        reads: 0,
    };
    let err =
        reader().with_cancel(flag).read(BufReader::with_capacity(256, body)).unwrap_err();
    assert!(matches!(
        err,
        StreamError::PartialRead {
            fragments_discarded: 1,
            ..
        }
    ));
}
