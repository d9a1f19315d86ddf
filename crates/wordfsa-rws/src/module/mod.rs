//! Binary module format for compiled rewriting systems.
//!
//! A module is a 64-byte [`Header`] followed by 64-byte aligned sections,
//! all little-endian:
//!
//! | Section     | Contents                                           |
//! |-------------|----------------------------------------------------|
//! | Names       | generator names, each NUL-terminated               |
//! | Inverses    | `u16` per generator, `0xFFFF` = not invertible     |
//! | Weights     | `u32` per generator, only for weighted orderings   |
//! | Transitions | `i32` per (state, generator) slot                  |
//! | Rules       | `(offset, lhs_len, rhs_len)` as `u32` triples      |
//! | Letters     | `u16` per letter of every packed rule              |
//!
//! Loading validates magic, version, size and the CRC32 checksum before
//! decoding, then checks every slot and rule span against the counts.

mod header;


pub use header::{FLAG_CONFLUENT, FLAG_WEIGHTED, Header, RULE_SIZE, SectionOffsets};

use std::path::Path;

use wordfsa_core::{Alphabet, AlphabetError, Gen, WordOrder};

use crate::system::{PackedRule, RewritingSystem};

/// Magic bytes at the start of every module.
pub const MAGIC: [u8; 4] = *b"WFSA";
/// Current format version.
pub const VERSION: u32 = 1;
/// Every section starts on a multiple of this.
pub const SECTION_ALIGN: usize = 64;

const NO_INVERSE: u16 = u16::MAX;

/// Error while loading a module.
#[derive(Debug, thiserror::Error)]
pub enum ModuleError {
    #[error("invalid magic: expected WFSA")]
    InvalidMagic,
    #[error("unsupported version: {0} (expected {VERSION})")]
    UnsupportedVersion(u32),
    #[error("file too small: {0} bytes (minimum 64)")]
    FileTooSmall(usize),
    #[error("size mismatch: header says {header} bytes, got {actual}")]
    SizeMismatch { header: u32, actual: usize },
    #[error("checksum mismatch: header says {expected:08x}, computed {actual:08x}")]
    ChecksumMismatch { expected: u32, actual: u32 },
    #[error("malformed {section} section: {detail}")]
    Malformed {
        section: &'static str,
        detail: String,
    },
    #[error("invalid alphabet: {0}")]
    Alphabet(#[from] AlphabetError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

fn malformed(section: &'static str, detail: impl Into<String>) -> ModuleError {
    ModuleError::Malformed {
        section,
        detail: detail.into(),
    }
}

impl RewritingSystem {
    /// Encode as a binary module.
    pub fn to_bytes(&self) -> Vec<u8> {
        let alphabet = &self.alphabet;

        let mut names = Vec::new();
        for g in alphabet.generators() {
            names.extend_from_slice(alphabet.name(g).as_bytes());
            names.push(0);
        }
        let inverses: Vec<u8> = alphabet
            .inverses()
            .iter()
            .flat_map(|inverse| inverse.unwrap_or(NO_INVERSE).to_le_bytes())
            .collect();
        let (weights, weighted): (Vec<u8>, bool) = match alphabet.order() {
            WordOrder::ShortLex => (Vec::new(), false),
            WordOrder::WeightedLex { weights } => {
                (weights.iter().flat_map(|w| w.to_le_bytes()).collect(), true)
            }
        };
        let transitions: Vec<u8> = self.slots.iter().flat_map(|s| s.to_le_bytes()).collect();
        let rules: Vec<u8> = self
            .rules
            .iter()
            .flat_map(|r| [r.offset, r.lhs_len, r.rhs_len])
            .flat_map(u32::to_le_bytes)
            .collect();
        let letters: Vec<u8> = self.letters.iter().flat_map(|g| g.to_le_bytes()).collect();

        let mut output = vec![0u8; 64];
        for section in [&names, &inverses, &weights, &transitions, &rules, &letters] {
            emit_section(&mut output, section);
        }

        let mut flags = 0;
        if self.is_confluent {
            flags |= FLAG_CONFLUENT;
        }
        if weighted {
            flags |= FLAG_WEIGHTED;
        }

        let mut header = Header {
            total_size: output.len() as u32,
            name_blob_size: names.len() as u32,
            generator_count: alphabet.len() as u32,
            state_count: self.state_count() as u32,
            rule_count: self.rules.len() as u32,
            letter_count: self.letters.len() as u32,
            flags,
            max_word_length: u32::try_from(self.max_word_length).unwrap_or(u32::MAX),
            ..Default::default()
        };
        header.checksum = crc32fast::hash(&output[64..]);
        output[..64].copy_from_slice(&header.to_bytes());
        output
    }

    /// Decode and validate a binary module.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ModuleError> {
        if bytes.len() < 64 {
            return Err(ModuleError::FileTooSmall(bytes.len()));
        }
        let header = Header::from_bytes(bytes);
        if !header.validate_magic() {
            return Err(ModuleError::InvalidMagic);
        }
        if !header.validate_version() {
            return Err(ModuleError::UnsupportedVersion(header.version));
        }
        if header.total_size as usize != bytes.len() {
            return Err(ModuleError::SizeMismatch {
                header: header.total_size,
                actual: bytes.len(),
            });
        }
        let actual = crc32fast::hash(&bytes[64..]);
        if actual != header.checksum {
            return Err(ModuleError::ChecksumMismatch {
                expected: header.checksum,
                actual,
            });
        }

        let offsets = header
            .compute_offsets()
            .filter(|o| o.end as usize <= bytes.len())
            .ok_or_else(|| malformed("header", "sections extend past the end of the file"))?;

        let k = header.generator_count as usize;
        let alphabet = decode_alphabet(bytes, &header, &offsets)?;

        let state_count = header.state_count as usize;
        let rule_count = header.rule_count as usize;
        let letter_count = header.letter_count as usize;
        if state_count == 0 {
            return Err(malformed("transitions", "no initial state"));
        }

        let slots: Vec<i32> = read_u32s(bytes, offsets.transitions, state_count * k)
            .map(|v| v as i32)
            .collect();
        for (i, &slot) in slots.iter().enumerate() {
            let valid = if slot >= 0 {
                (slot as usize) < state_count
            } else {
                ((-(slot as i64) - 1) as usize) < rule_count
            };
            if !valid {
                return Err(malformed("transitions", format!("slot {i} holds {slot}")));
            }
        }

        let raw: Vec<u32> = read_u32s(bytes, offsets.rules, rule_count * 3).collect();
        let mut rules = Vec::with_capacity(rule_count);
        for (i, triple) in raw.chunks_exact(3).enumerate() {
            let rule = PackedRule {
                offset: triple[0],
                lhs_len: triple[1],
                rhs_len: triple[2],
            };
            let end = rule.offset as u64 + rule.lhs_len as u64 + rule.rhs_len as u64;
            if rule.lhs_len == 0 || end > letter_count as u64 {
                return Err(malformed("rules", format!("rule {i} has an invalid span")));
            }
            rules.push(rule);
        }

        let letters: Vec<Gen> = read_u16s(bytes, offsets.letters, letter_count).collect();
        if let Some(&g) = letters.iter().find(|&&g| g as usize >= k) {
            return Err(malformed("letters", format!("generator index {g} out of range")));
        }

        Ok(Self {
            alphabet,
            slots,
            rules,
            letters,
            is_confluent: header.has_flag(FLAG_CONFLUENT),
            max_word_length: header.max_word_length as usize,
        })
    }

    /// Read and decode a binary module file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ModuleError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }
}

fn decode_alphabet(
    bytes: &[u8],
    header: &Header,
    offsets: &SectionOffsets,
) -> Result<Alphabet, ModuleError> {
    let k = header.generator_count as usize;
    let start = offsets.names as usize;
    let blob = &bytes[start..start + header.name_blob_size as usize];

    let Some(blob) = blob.strip_suffix(&[0]) else {
        return Err(malformed("names", "missing terminator"));
    };
    let names = blob
        .split(|&b| b == 0)
        .map(|name| std::str::from_utf8(name).map(str::to_owned))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| malformed("names", e.to_string()))?;
    if names.len() != k {
        return Err(malformed(
            "names",
            format!("{} names for {k} generators", names.len()),
        ));
    }

    let mut inverse_names = Vec::with_capacity(k);
    for raw in read_u16s(bytes, offsets.inverses, k) {
        match raw {
            NO_INVERSE => inverse_names.push(None),
            g if (g as usize) < k => inverse_names.push(Some(names[g as usize].as_str())),
            g => return Err(malformed("inverses", format!("generator index {g} out of range"))),
        }
    }
    let alphabet = Alphabet::with_inverses(names.iter().cloned(), &inverse_names)?;

    if header.has_flag(FLAG_WEIGHTED) {
        let weights = read_u32s(bytes, offsets.weights, k).collect();
        return Ok(alphabet.with_order(WordOrder::WeightedLex { weights })?);
    }
    Ok(alphabet)
}

fn read_u32s(bytes: &[u8], at: u32, count: usize) -> impl Iterator<Item = u32> + '_ {
    let start = at as usize;
    bytes[start..start + count * 4]
        .chunks_exact(4)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
}

fn read_u16s(bytes: &[u8], at: u32, count: usize) -> impl Iterator<Item = u16> + '_ {
    let start = at as usize;
    bytes[start..start + count * 2]
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
}

/// Append a section and pad to the section alignment boundary.
fn emit_section(buf: &mut Vec<u8>, bytes: &[u8]) {
    buf.extend_from_slice(bytes);
    let rem = buf.len() % SECTION_ALIGN;
    if rem != 0 {
        buf.resize(buf.len() + SECTION_ALIGN - rem, 0);
    }
}
