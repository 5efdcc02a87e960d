//! Parsing of the single-line `/proc/<pid>/stat` record.
//!
//! Field positions follow proc(5), 1-indexed. The command field (2) is wrapped
//! in parentheses and may itself contain spaces, so it is split out by its
//! outermost parentheses before the rest of the line is tokenized.

use std::fs;
use std::path::Path;

/// Minimum number of fields a usable stat line must carry.
pub const MIN_STAT_FIELDS: usize = 29;

// 1-indexed field positions from proc(5).
const FIELD_STATE: usize = 3;
const FIELD_MINFLT: usize = 10;
const FIELD_MAJFLT: usize = 12;
const FIELD_UTIME: usize = 14;
const FIELD_STIME: usize = 15;
const FIELD_VSIZE: usize = 23;
const FIELD_RSS: usize = 24;
const FIELD_STARTSTACK: usize = 28;
const FIELD_KSTKESP: usize = 29;

/// Why a stat line was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StatParseError {
    #[error("expected at least {} fields, got {}", MIN_STAT_FIELDS, .0)]
    TooFewFields(usize),
    #[error("invalid state field '{0}'")]
    BadState(String),
    #[error("field {field} is not an unsigned integer: '{value}'")]
    BadNumber { field: usize, value: String },
}

/// Failure reading `<proc_path>/stat`.
#[derive(Debug, thiserror::Error)]
pub enum StatReadError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Malformed(#[from] StatParseError),
}

/// A parsed stat line: the verbatim fields plus the typed values in use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatLine {
    pub fields: Vec<String>,
    pub state: char,
    pub minflt: u64,
    pub majflt: u64,
    pub utime: u64,
    pub stime: u64,
    pub vsize: u64,
    /// Resident set size in pages.
    pub rss: u64,
    pub stack_start: u64,
    pub stack_pointer: u64,
}

impl StatLine {
    /// Parses the content of a stat file.
    pub fn parse(content: &str) -> Result<Self, StatParseError> {
        let fields = split_fields(content);
        if fields.len() < MIN_STAT_FIELDS {
            return Err(StatParseError::TooFewFields(fields.len()));
        }

        let raw_state = &fields[FIELD_STATE - 1];
        let mut chars = raw_state.chars();
        let state = match (chars.next(), chars.next()) {
            (Some(c), None) => c,
            _ => return Err(StatParseError::BadState(raw_state.clone())),
        };

        Ok(Self {
            state,
            minflt: field_u64(&fields, FIELD_MINFLT)?,
            majflt: field_u64(&fields, FIELD_MAJFLT)?,
            utime: field_u64(&fields, FIELD_UTIME)?,
            stime: field_u64(&fields, FIELD_STIME)?,
            vsize: field_u64(&fields, FIELD_VSIZE)?,
            rss: field_u64(&fields, FIELD_RSS)?,
            stack_start: field_u64(&fields, FIELD_STARTSTACK)?,
            stack_pointer: field_u64(&fields, FIELD_KSTKESP)?,
            fields,
        })
    }

    /// Reads and parses `<proc_path>/stat`. The command field is not
    /// required to be UTF-8; invalid bytes become U+FFFD.
    pub fn read(proc_path: &Path) -> Result<Self, StatReadError> {
        let content = fs::read(proc_path.join("stat"))?;
        Ok(Self::parse(&String::from_utf8_lossy(&content))?)
    }

    /// Distance between the two stack bounds. Either bound may be the larger.
    pub fn stack_size(&self) -> u64 {
        self.stack_start.abs_diff(self.stack_pointer)
    }

    /// The command field (2) as written by the kernel, parentheses included.
    pub fn comm(&self) -> &str {
        &self.fields[1]
    }
}

/// Splits a stat line into fields, keeping `(comm with spaces)` as one token.
fn split_fields(content: &str) -> Vec<String> {
    let open = content.find('(');
    let close = content.rfind(')');

    match (open, close) {
        (Some(o), Some(c)) if o < c => {
            let mut fields: Vec<String> = content[..o]
                .split_whitespace()
                .map(str::to_string)
                .collect();
            fields.push(content[o..=c].to_string());
            fields.extend(content[c + 1..].split_whitespace().map(str::to_string));
            fields
        }
        _ => content.split_whitespace().map(str::to_string).collect(),
    }
}

fn field_u64(fields: &[String], field: usize) -> Result<u64, StatParseError> {
    let value = &fields[field - 1];
    value.parse().map_err(|_| StatParseError::BadNumber {
        field,
        value: value.clone(),
    })
}
