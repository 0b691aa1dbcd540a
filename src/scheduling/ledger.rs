//! Flat-file ledger of locally brokered bookings
//!
//! A plain tabular record (doctor, patient, time) loaded at startup and
//! rewritten wholesale after each new booking. This is an audit trail only;
//! the upstream calendar remains the source of truth for slot state.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use crate::Result;

const HEADER: &str = "Doctor,Patient,Time";

/// One brokered booking
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeetingRecord {
    pub doctor: String,
    pub patient: String,
    pub time: String,
}

/// Append-only meeting ledger backed by a CSV file
#[derive(Debug)]
pub struct MeetingLedger {
    path: PathBuf,
    meetings: Vec<MeetingRecord>,
}

impl MeetingLedger {
    /// Load the ledger from `path`; a missing file yields an empty ledger.
    ///
    /// # Errors
    ///
    /// Returns an error when the file exists but cannot be read.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let meetings = match fs::read_to_string(&path) {
            Ok(contents) => parse(&contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, meetings })
    }

    /// Append a booking and rewrite the backing file.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be written.
    pub fn record(&mut self, meeting: MeetingRecord) -> Result<()> {
        self.meetings.push(meeting);
        self.rewrite()
    }

    /// All bookings brokered so far, oldest first
    #[must_use]
    pub fn meetings(&self) -> &[MeetingRecord] {
        &self.meetings
    }

    fn rewrite(&self) -> Result<()> {
        let mut file = fs::File::create(&self.path)?;
        writeln!(file, "{HEADER}")?;
        for m in &self.meetings {
            // no quoting in this format; commas inside fields become spaces
            writeln!(
                file,
                "{},{},{}",
                sanitize(&m.doctor),
                sanitize(&m.patient),
                sanitize(&m.time)
            )?;
        }
        Ok(())
    }
}

fn sanitize(field: &str) -> String {
    field.replace(',', " ")
}

fn parse(contents: &str) -> Vec<MeetingRecord> {
    contents
        .lines()
        .skip(1)
        .filter_map(|line| {
            let mut fields = line.splitn(3, ',');
            Some(MeetingRecord {
                doctor: fields.next()?.to_string(),
                patient: fields.next()?.to_string(),
                time: fields.next()?.to_string(),
            })
        })
        .collect()
}
