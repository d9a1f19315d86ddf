//! Module file header (64 bytes).
//!
//! Offsets are not stored: they are computed from counts + SECTION_ALIGN.
//! Section order: Header → Names → Inverses → Weights → Transitions →
//! Rules → Letters

use super::{MAGIC, SECTION_ALIGN, VERSION};

/// Header flag: the rule set is confluent.
pub const FLAG_CONFLUENT: u32 = 0x01;
/// Header flag: the alphabet uses a weighted ordering (Weights section present).
pub const FLAG_WEIGHTED: u32 = 0x02;

/// File header - first 64 bytes of a compiled module.
///
/// Layout:
/// - 0-15: identity (magic, version, checksum, total_size)
/// - 16-43: counts and settings (7 × u32), order matches section order
/// - 44-63: reserved
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(C, align(64))]
pub struct Header {
    /// Magic bytes: b"WFSA"
    pub magic: [u8; 4],
    pub version: u32,
    /// CRC32 checksum of everything after the header
    pub checksum: u32,
    /// Total file size in bytes
    pub total_size: u32,

    /// Size of the generator-name blob in bytes (names are NUL-terminated).
    pub name_blob_size: u32,
    pub generator_count: u32,
    pub state_count: u32,
    pub rule_count: u32,
    pub letter_count: u32,
    pub flags: u32,
    pub max_word_length: u32,

    pub _reserved: [u8; 20],
}

const _: () = assert!(std::mem::size_of::<Header>() == 64);

impl Default for Header {
    fn default() -> Self {
        Self {
            magic: MAGIC,
            version: VERSION,
            checksum: 0,
            total_size: 0,
            name_blob_size: 0,
            generator_count: 0,
            state_count: 0,
            rule_count: 0,
            letter_count: 0,
            flags: 0,
            max_word_length: 0,
            _reserved: [0; 20],
        }
    }
}

/// Section offsets derived from header counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SectionOffsets {
    pub names: u32,
    pub inverses: u32,
    pub weights: u32,
    pub transitions: u32,
    pub rules: u32,
    pub letters: u32,
    /// End of the letter section, before trailing padding.
    pub end: u32,
}

/// Bytes per packed rule record: offset, lhs length, rhs length.
pub const RULE_SIZE: u32 = 12;

impl Header {
    /// Decode header from 64 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        assert!(bytes.len() >= 64, "header too short");

        let word = |at: usize| {
            u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
        };
        let mut reserved = [0u8; 20];
        reserved.copy_from_slice(&bytes[44..64]);

        Self {
            magic: [bytes[0], bytes[1], bytes[2], bytes[3]],
            version: word(4),
            checksum: word(8),
            total_size: word(12),
            name_blob_size: word(16),
            generator_count: word(20),
            state_count: word(24),
            rule_count: word(28),
            letter_count: word(32),
            flags: word(36),
            max_word_length: word(40),
            _reserved: reserved,
        }
    }

    /// Encode header to 64 bytes.
    pub fn to_bytes(&self) -> [u8; 64] {
        let mut bytes = [0u8; 64];
        bytes[0..4].copy_from_slice(&self.magic);
        let fields = [
            self.version,
            self.checksum,
            self.total_size,
            self.name_blob_size,
            self.generator_count,
            self.state_count,
            self.rule_count,
            self.letter_count,
            self.flags,
            self.max_word_length,
        ];
        for (i, value) in fields.iter().enumerate() {
            let at = 4 + i * 4;
            bytes[at..at + 4].copy_from_slice(&value.to_le_bytes());
        }
        bytes[44..64].copy_from_slice(&self._reserved);
        bytes
    }

    pub fn validate_magic(&self) -> bool {
        self.magic == MAGIC
    }

    pub fn validate_version(&self) -> bool {
        self.version == VERSION
    }

    #[inline]
    pub fn has_flag(&self, flag: u32) -> bool {
        self.flags & flag != 0
    }

    /// Compute section offsets from counts and blob sizes.
    ///
    /// Returns `None` when the counts overflow the 32-bit address space,
    /// which only happens for corrupt headers.
    pub fn compute_offsets(&self) -> Option<SectionOffsets> {
        let align = SECTION_ALIGN as u64;
        let k = self.generator_count as u64;

        let names = align;
        let inverses = align_up(names + self.name_blob_size as u64, align);
        let weights = align_up(inverses + k * 2, align);
        let weights_size = if self.has_flag(FLAG_WEIGHTED) { k * 4 } else { 0 };
        let transitions = align_up(weights + weights_size, align);
        let table_size = (self.state_count as u64).saturating_mul(k * 4);
        let rules = align_up(transitions.saturating_add(table_size), align);
        let rules_size = self.rule_count as u64 * RULE_SIZE as u64;
        let letters = align_up(rules.saturating_add(rules_size), align);
        let end = letters.saturating_add(self.letter_count as u64 * 2);

        let narrow = |v: u64| u32::try_from(v).ok();
        Some(SectionOffsets {
            names: narrow(names)?,
            inverses: narrow(inverses)?,
            weights: narrow(weights)?,
            transitions: narrow(transitions)?,
            rules: narrow(rules)?,
            letters: narrow(letters)?,
            end: narrow(end)?,
        })
    }
}

/// Round up to the next multiple of `align`.
fn align_up(value: u64, align: u64) -> u64 {
    value.saturating_add(align - 1) & !(align - 1)
}
