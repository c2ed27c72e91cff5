//! Checkpoint store.
//!
//! Checkpoints are text files of named sections, each holding `name=value`
//! entries. This module provides:
//! 1. **Writing:** [`CheckpointOut`] collects sections in insertion order and renders them.
//! 2. **Reading:** [`Checkpoint`] parses the text and hands out [`SectionIn`] views
//!    with typed, length-checked accessors.
//! 3. **Contract:** [`Serializable`], implemented by every object whose state survives
//!    a save/restore cycle.
//!
//! Values go through `serde`: any `Serialize` scalar is written as one token and
//! read back with `Deserialize`. Sequences are stored as one entry of
//! space-separated tokens. Objects nest by using dotted section names
//! (`cpu0.tlb.entry3`).

mod codec;

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use crate::common::error::CheckpointError;

/// State that can be written to and restored from a checkpoint.
pub trait Serializable {
    /// Writes this object's state under `section`.
    fn serialize(&self, out: &mut CheckpointOut, section: &str);

    /// Restores this object's state from `section`.
    ///
    /// Implementations must leave `self` untouched when they return an error.
    fn unserialize(&mut self, cp: &Checkpoint, section: &str) -> Result<(), CheckpointError>;
}

/// Checkpoint being written.
#[derive(Clone, Debug, Default)]
pub struct CheckpointOut {
    sections: Vec<(String, Vec<(String, String)>)>,
}

impl CheckpointOut {
    /// Creates an empty checkpoint.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a writer for `name`, creating the section on first use.
    pub fn section(&mut self, name: &str) -> SectionOut<'_> {
        let idx = match self.sections.iter().position(|(n, _)| n == name) {
            Some(idx) => idx,
            None => {
                self.sections.push((name.to_owned(), Vec::new()));
                self.sections.len() - 1
            }
        };
        SectionOut {
            entries: &mut self.sections[idx].1,
        }
    }

    /// Returns `true` if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Converts the written sections into a readable checkpoint.
    pub fn to_checkpoint(&self) -> Checkpoint {
        let mut cp = Checkpoint::default();
        for (name, entries) in &self.sections {
            let section = cp.sections.entry(name.clone()).or_default();
            for (key, value) in entries {
                let _ = section.insert(key.clone(), value.clone());
            }
        }
        cp
    }

    /// Writes the checkpoint to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`CheckpointError::Io`] if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), CheckpointError> {
        fs::write(path, self.to_string()).map_err(|source| CheckpointError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), sections = self.sections.len(), "checkpoint saved");
        Ok(())
    }
}

impl fmt::Display for CheckpointOut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, entries) in &self.sections {
            writeln!(f, "[{name}]")?;
            for (key, value) in entries {
                writeln!(f, "{key}={value}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Writer for one checkpoint section.
#[derive(Debug)]
pub struct SectionOut<'a> {
    entries: &'a mut Vec<(String, String)>,
}

impl SectionOut<'_> {
    /// Records a scalar entry, replacing any earlier value of the same name.
    pub fn param<T: Serialize + ?Sized>(&mut self, name: &str, value: &T) {
        match codec::encode(value) {
            Ok(text) => self.set(name, text),
            Err(e) => error!(name, error = %e, "checkpoint value not encodable; entry skipped"),
        }
    }

    /// Records a sequence entry.
    pub fn param_array<T: Serialize>(&mut self, name: &str, values: &[T]) {
        match codec::encode_seq(values) {
            Ok(text) => self.set(name, text),
            Err(e) => error!(name, error = %e, "checkpoint sequence not encodable; entry skipped"),
        }
    }

    fn set(&mut self, name: &str, text: String) {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = text,
            None => self.entries.push((name.to_owned(), text)),
        }
    }
}

/// Checkpoint being read.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Checkpoint {
    sections: BTreeMap<String, BTreeMap<String, String>>,
}

impl Checkpoint {
    /// Parses checkpoint text.
    ///
    /// Blank lines and lines starting with `#` or `;` are ignored. A section
    /// that appears twice has its entries merged.
    ///
    /// # Errors
    ///
    /// Returns [`CheckpointError::Syntax`] for entries outside any section,
    /// lines that are neither headers nor `name=value` pairs, and empty names.
    pub fn parse(text: &str) -> Result<Self, CheckpointError> {
        let mut sections: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
        let mut current: Option<String> = None;

        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }
            let syntax = |reason: &str| CheckpointError::Syntax {
                line: idx + 1,
                reason: reason.to_owned(),
            };

            if let Some(header) = line.strip_prefix('[') {
                let name = header
                    .strip_suffix(']')
                    .ok_or_else(|| syntax("unterminated section header"))?
                    .trim();
                if name.is_empty() {
                    return Err(syntax("empty section name"));
                }
                let _ = sections.entry(name.to_owned()).or_default();
                current = Some(name.to_owned());
                continue;
            }

            let (key, value) = line
                .split_once('=')
                .ok_or_else(|| syntax("expected `name=value`"))?;
            let key = key.trim();
            if key.is_empty() {
                return Err(syntax("empty entry name"));
            }
            let section = current
                .as_ref()
                .ok_or_else(|| syntax("entry appears before any section header"))?;
            let _ = sections
                .entry(section.clone())
                .or_default()
                .insert(key.to_owned(), value.trim().to_owned());
        }

        Ok(Self { sections })
    }

    /// Reads and parses a checkpoint file.
    ///
    /// # Errors
    ///
    /// Returns [`CheckpointError::Io`] if the file cannot be read, or a syntax
    /// error from [`Checkpoint::parse`].
    pub fn load(path: &Path) -> Result<Self, CheckpointError> {
        let text = fs::read_to_string(path).map_err(|source| CheckpointError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let cp = Self::parse(&text)?;
        debug!(path = %path.display(), sections = cp.sections.len(), "checkpoint loaded");
        Ok(cp)
    }

    /// Returns a reader for `name`.
    ///
    /// # Errors
    ///
    /// Returns [`CheckpointError::MissingSection`] if the section is absent.
    pub fn section(&self, name: &str) -> Result<SectionIn<'_>, CheckpointError> {
        self.sections
            .get_key_value(name)
            .map(|(name, entries)| SectionIn { name, entries })
            .ok_or_else(|| CheckpointError::MissingSection {
                section: name.to_owned(),
            })
    }

    /// Returns `true` if the section exists.
    pub fn has_section(&self, name: &str) -> bool {
        self.sections.contains_key(name)
    }

    /// Iterates over section names in sorted order.
    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    /// Overwrites (or creates) one raw entry.
    pub fn set(&mut self, section: &str, name: &str, value: &str) {
        let _ = self
            .sections
            .entry(section.to_owned())
            .or_default()
            .insert(name.to_owned(), value.to_owned());
    }

    /// Removes one raw entry, returning its text.
    pub fn remove(&mut self, section: &str, name: &str) -> Option<String> {
        self.sections.get_mut(section)?.remove(name)
    }
}

/// Reader for one checkpoint section.
#[derive(Clone, Copy, Debug)]
pub struct SectionIn<'a> {
    name: &'a str,
    entries: &'a BTreeMap<String, String>,
}

impl<'a> SectionIn<'a> {
    /// Returns the section name.
    pub const fn name(&self) -> &'a str {
        self.name
    }

    /// Returns `true` if the section holds `name`.
    pub fn has(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Reads a required scalar entry.
    ///
    /// # Errors
    ///
    /// Returns [`CheckpointError::MissingField`] or [`CheckpointError::Malformed`].
    pub fn param<T: DeserializeOwned>(&self, name: &str) -> Result<T, CheckpointError> {
        self.param_opt(name)?
            .ok_or_else(|| CheckpointError::MissingField {
                section: self.name.to_owned(),
                name: name.to_owned(),
            })
    }

    /// Reads an optional scalar entry.
    ///
    /// # Errors
    ///
    /// Returns [`CheckpointError::Malformed`] if the entry exists but does not parse.
    pub fn param_opt<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, CheckpointError> {
        self.entries
            .get(name)
            .map(|text| codec::decode(text).map_err(|_| self.malformed(name, text)))
            .transpose()
    }

    /// Reads a sequence entry that must hold exactly `expected` elements.
    ///
    /// # Errors
    ///
    /// Returns [`CheckpointError::MissingField`], [`CheckpointError::Malformed`]
    /// or [`CheckpointError::LengthMismatch`].
    pub fn param_array<T: DeserializeOwned>(
        &self,
        name: &str,
        expected: usize,
    ) -> Result<Vec<T>, CheckpointError> {
        let values = self.param_vec(name)?;
        if values.len() != expected {
            return Err(CheckpointError::LengthMismatch {
                section: self.name.to_owned(),
                name: name.to_owned(),
                expected,
                found: values.len(),
            });
        }
        Ok(values)
    }

    /// Reads a sequence entry of any length.
    ///
    /// # Errors
    ///
    /// Returns [`CheckpointError::MissingField`] or [`CheckpointError::Malformed`].
    pub fn param_vec<T: DeserializeOwned>(&self, name: &str) -> Result<Vec<T>, CheckpointError> {
        let text = self
            .entries
            .get(name)
            .ok_or_else(|| CheckpointError::MissingField {
                section: self.name.to_owned(),
                name: name.to_owned(),
            })?;
        text.split_whitespace()
            .map(|token| codec::decode(token).map_err(|_| self.malformed(name, token)))
            .collect()
    }

    fn malformed(&self, name: &str, text: &str) -> CheckpointError {
        CheckpointError::Malformed {
            section: self.name.to_owned(),
            name: name.to_owned(),
            value: text.to_owned(),
        }
    }
}
