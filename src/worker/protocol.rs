//! The parent<->child wire protocol (§4.5, "External Interfaces: Worker message
//! protocol"). Framing is length-prefixed + `ciborium`, the same combination the
//! teacher uses for its own runner<->benchmark protocol in `src/connection.rs`
//! (there over a `TcpStream` to cargo-criterion; here over a child process's piped
//! stdio, per §4.5's "an ipc channel (or framed stdin/stdout)").
//!
//! Channel layout (a concretization of the spec's channel-agnostic description,
//! recorded in `DESIGN.md`): the parent writes one `RunMessage` to the child's stdin;
//! the child's stdout carries the GC-trace-or-passthrough text stream described in
//! §4.5 point 2 (always, whether or not `gc_stats` is set -- it's simply all
//! non-matching lines when it's not); the child's stderr carries exactly one framed
//! `ChildReply`, or, if the child dies before sending one, raw diagnostic text that
//! becomes the `WorkerCrashed` stderr tail.

use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::io::{self, Read, Write};

use crate::error::{Error, Result};
use crate::result::{HeapProfile, MeasuredResults};
use crate::spec::{BenchmarkSpec, Callable, RunnerOptions};

/// Wire shape of a [`BenchmarkSpec`], matching §6's `spec` object: exactly one of the
/// callable-identifying fields is populated (`module_path`+`export_name` -- in-process
/// closures can never cross the process boundary, which [`WireSpec::try_from_spec`]
/// enforces).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WireSpec {
    pub name: String,
    pub module_path: Option<String>,
    pub export_name: Option<String>,
    pub setup_export_name: Option<String>,
    pub variant_dir: Option<String>,
    pub variant_id: Option<String>,
    pub case_id: Option<String>,
    pub case_data: Option<String>,
    pub cases_module: Option<String>,
}

impl WireSpec {
    pub fn try_from_spec(spec: &BenchmarkSpec) -> Result<WireSpec> {
        match &spec.callable {
            Callable::Exported {
                module_path,
                export_name,
                setup_export_name,
            } => Ok(WireSpec {
                name: spec.name.clone(),
                module_path: Some(module_path.clone()),
                export_name: Some(export_name.clone()),
                setup_export_name: setup_export_name.clone(),
                variant_dir: None,
                variant_id: None,
                case_id: None,
                case_data: spec.param.clone(),
                cases_module: None,
            }),
            Callable::InProcess(_) => Err(Error::ConfigInvalid {
                message: format!(
                    "benchmark '{}' has an in-process callable and cannot be sent to a worker",
                    spec.name
                ),
            }),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RunMessage {
    Run {
        spec: WireSpec,
        runner_name: String,
        options: RunnerOptions,
        params: Option<String>,
    },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ChildReply {
    Result {
        results: Vec<MeasuredResults>,
        heap_profile: Option<HeapProfile>,
    },
    Error {
        error: String,
        stack: Option<String>,
    },
}

fn io_err(message: impl std::fmt::Display) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message.to_string())
}

/// Writes one length-prefixed (`u32`, big-endian) ciborium-encoded message.
pub fn write_framed<W: Write, T: Serialize>(writer: &mut W, message: &T) -> Result<()> {
    let mut buf = Vec::new();
    ciborium::ser::into_writer(message, &mut buf).map_err(|e| io_err(e))?;
    let len = u32::try_from(buf.len()).map_err(|e| io_err(e))?;
    writer.write_all(&len.to_be_bytes())?;
    writer.write_all(&buf)?;
    writer.flush()?;
    Ok(())
}

/// Reads exactly one length-prefixed ciborium-encoded message.
pub fn read_framed<R: Read, T: for<'de> Deserialize<'de>>(reader: &mut R) -> Result<T> {
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf)?;
    let len = u32::from_be_bytes(len_buf) as usize;
    let mut body = vec![0u8; len];
    reader.read_exact(&mut body)?;
    ciborium::de::from_reader(&body[..]).map_err(|e| io_err(e).into())
}
