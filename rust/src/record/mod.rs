use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Three-way comparison over records.
pub type CompareFn<R> = fn(&R, &R) -> Ordering;

/// The two orders a tree needs: full identity and key only.
pub struct RecordOrder<R> {
    pub items: CompareFn<R>,
    pub keys: CompareFn<R>,
}

// derive would put a bound on R, fn pointers are always Copy.
impl<R> Clone for RecordOrder<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for RecordOrder<R> {}

impl<R> std::fmt::Debug for RecordOrder<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("RecordOrder")
    }
}

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("unable to read records from {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed record on line {line}: {reason}")]
    Malformed { line: usize, reason: String },
}

// A Cd is the record type the harness ships with.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Cd {
    pub artist: String,
    pub title: String,
    pub year: u16,
    pub rating: u8,
}

impl Cd {
    pub fn new(artist: &str, title: &str, year: u16, rating: u8) -> Self {
        Cd {
            artist: artist.to_string(),
            title: title.to_string(),
            year,
            rating,
        }
    }

    // Identity order: title, then artist, then year.
    pub fn compare_items(a: &Cd, b: &Cd) -> Ordering {
        a.title
            .cmp(&b.title)
            .then_with(|| a.artist.cmp(&b.artist))
            .then_with(|| a.year.cmp(&b.year))
    }

    // Key order: title only.
    pub fn compare_keys(a: &Cd, b: &Cd) -> Ordering {
        a.title.cmp(&b.title)
    }

    pub fn order() -> RecordOrder<Cd> {
        RecordOrder {
            items: Cd::compare_items,
            keys: Cd::compare_keys,
        }
    }

    fn parse_line(line_no: usize, line: &str) -> Result<Cd, RecordError> {
        let malformed = |reason: String| RecordError::Malformed {
            line: line_no,
            reason,
        };
        let fields: Vec<&str> = line.split('|').map(str::trim).collect();
        if fields.len() != 4 {
            return Err(malformed(format!("expected 4 fields, found {}", fields.len())));
        }
        if fields[1].is_empty() {
            return Err(malformed("empty title".to_string()));
        }
        let year = fields[2]
            .parse::<u16>()
            .map_err(|e| malformed(format!("bad year '{}': {}", fields[2], e)))?;
        let rating = fields[3]
            .parse::<u8>()
            .map_err(|e| malformed(format!("bad rating '{}': {}", fields[3], e)))?;
        Ok(Cd::new(fields[0], fields[1], year, rating))
    }
}

// RecordStore owns every record for the lifetime of a run. Trees and
// serialized arrays only ever borrow from it.
#[derive(Debug, Default)]
pub struct RecordStore<R> {
    records: Vec<R>,
}

impl<R> RecordStore<R> {
    pub fn from_records(records: Vec<R>) -> Self {
        RecordStore { records }
    }

    pub fn size(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&R> {
        self.records.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.records.iter()
    }
}

impl RecordStore<Cd> {
    /// Reads a `artist|title|year|rating` file, one record per line.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, RecordError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| RecordError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, RecordError> {
        let mut records = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            records.push(Cd::parse_line(idx + 1, line)?);
        }
        Ok(RecordStore { records })
    }
}
