use std::io::{self, BufRead};

use tracing::debug;

use crate::error::{DecodeError, DecodeFailure};
use crate::models::{Anomaly, DocumentModel, SessionMeta};

use super::builder::TranscriptBuilder;
use super::coalesce::Coalescer;
use super::decoder::{DecodeOptions, decode_line};

/// Everything read out of one session log
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    pub document: DocumentModel,
    pub anomalies: Vec<Anomaly>,
    pub meta: SessionMeta,
    /// Physical lines consumed, blank ones included
    pub lines_read: usize,
    /// True when the caller stopped reading before end of input
    pub stopped_early: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadControl {
    Continue,
    Stop,
}

/// Reads a whole session log. Bad lines become anomalies, only I/O errors fail.
pub fn read_transcript<R: BufRead>(reader: R, options: &DecodeOptions) -> io::Result<Transcript> {
    read_transcript_until(reader, options, |_, _| ReadControl::Continue)
}

/// Like [`read_transcript`], but asks `control` before each line whether to go on.
///
/// `control` sees the builder as it stands and the number of lines read so far.
/// Stopping closes the document normally, so a partial transcript is still well formed.
pub fn read_transcript_until<R, F>(
    mut reader: R,
    options: &DecodeOptions,
    mut control: F,
) -> io::Result<Transcript>
where
    R: BufRead,
    F: FnMut(&TranscriptBuilder, usize) -> ReadControl,
{
    let mut builder = TranscriptBuilder::new();
    let mut coalescer = Coalescer::new();
    let mut meta = SessionMeta::default();
    let mut buf = Vec::new();
    let mut lines_read = 0;
    let mut stopped_early = false;

    loop {
        if control(&builder, lines_read) == ReadControl::Stop {
            stopped_early = true;
            break;
        }

        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        lines_read += 1;

        let raw = trim_line_ending(&buf);
        if raw.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        match std::str::from_utf8(raw) {
            Ok(text) => match decode_line(lines_read, text, options) {
                Ok(decoded) => {
                    meta.merge(decoded.meta);
                    for record in decoded.records {
                        coalescer.push(Ok(record));
                    }
                }
                Err(err) => coalescer.push(Err(err)),
            },
            Err(_) => coalescer.push(Err(DecodeError {
                line: lines_read,
                reason: DecodeFailure::Malformed("invalid UTF-8".to_string()),
            })),
        }

        for result in coalescer.drain() {
            builder.push(result);
        }
    }

    coalescer.flush();
    for result in coalescer.drain() {
        builder.push(result);
    }

    let output = builder.finish();
    debug!(
        lines = lines_read,
        nodes = output.document.len(),
        anomalies = output.anomalies.len(),
        stopped_early,
        "read session log"
    );

    Ok(Transcript {
        document: output.document,
        anomalies: output.anomalies,
        meta,
        lines_read,
        stopped_early,
    })
}

fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
