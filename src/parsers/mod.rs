//! Session log parsing: raw JSONL lines to a [`crate::models::DocumentModel`]
//!
//! # Error Handling Strategy
//!
//! This module follows a **graceful degradation** approach:
//!
//! - **Individual line failures**: A line that is not valid JSON, has an unknown `kind`, or
//!   lacks a required field becomes a [`crate::error::DecodeError`]. The error is carried
//!   forward as an anomaly and decoding continues with the next line.
//!
//! - **Pairing problems**: Tool results with no matching call in their turn, and logs that end
//!   while tool calls are still waiting, are anomalies too. They never stop a build.
//!
//! - **I/O errors**: Only a failing reader aborts [`read_transcript`]; callers map the
//!   `std::io::Error` to a source error naming the file.
//!
//! Pipeline: [`decode_line`] → [`Coalescer`] → [`TranscriptBuilder`].

pub mod builder;
pub mod coalesce;
pub mod conversation;
pub mod decoder;
pub mod deserializers;

use crate::error::DecodeError;
use crate::models::EventRecord;

/// What the decoder hands downstream for each record
pub type DecodeResult = Result<EventRecord, DecodeError>;

pub use builder::{BuildOutput, TranscriptBuilder, build_transcript};
pub use coalesce::{Coalescer, coalesce};
pub use conversation::{ReadControl, Transcript, read_transcript, read_transcript_until};
pub use decoder::{DecodeOptions, DecodedLine, decode_line};
