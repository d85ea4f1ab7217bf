//! Dense symbol codes for the reference alphabet.
//!
//! Codes are assigned in ascending byte order to the bytes that occur in the
//! reference, so suffix tree nodes need one child slot per distinct symbol
//! rather than one per byte value.

use thiserror::Error;

const UNMAPPED: u16 = u16::MAX;

/// Errors raised while mapping bytes onto dense symbol codes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AlphabetError {
    /// A byte does not occur anywhere in the reference.
    #[error("symbol 0x{symbol:02x} at position {position} does not occur in the reference")]
    UnmappedSymbol {
        /// Offending byte.
        symbol: u8,
        /// Position of the byte in the encoded text.
        position: usize,
    },
}

/// Dense code assigned to a byte of the reference alphabet.
pub type SymbolCode = u8;

/// Mapping from raw bytes to dense codes `0..len()`.
///
/// Codes are assigned in ascending byte order so that the mapping only
/// depends on the set of bytes observed, not on where they occur.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlphabetMap {
    codes: [u16; 256],
    symbols: Vec<u8>,
}

impl AlphabetMap {
    /// Build the map from every byte that occurs in `text`.
    pub fn from_text(text: &[u8]) -> Self {
        let mut seen = [false; 256];
        for &byte in text {
            seen[byte as usize] = true;
        }

        let mut codes = [UNMAPPED; 256];
        let mut symbols = Vec::new();
        for byte in 0..256usize {
            if seen[byte] {
                codes[byte] = symbols.len() as u16;
                symbols.push(byte as u8);
            }
        }

        Self { codes, symbols }
    }

    /// Number of distinct symbols (branching factor of tree nodes).
    #[inline]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Returns `true` when no symbol has been mapped.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Code for `byte`, if it belongs to the alphabet.
    #[inline]
    pub fn code(&self, byte: u8) -> Option<SymbolCode> {
        match self.codes[byte as usize] {
            UNMAPPED => None,
            code => Some(code as SymbolCode),
        }
    }

    /// Byte represented by `code`.
    pub fn symbol(&self, code: SymbolCode) -> Option<u8> {
        self.symbols.get(code as usize).copied()
    }

    /// Whether `byte` belongs to the alphabet.
    pub fn contains(&self, byte: u8) -> bool {
        self.code(byte).is_some()
    }

    /// Distinct bytes in code order.
    pub fn symbols(&self) -> &[u8] {
        &self.symbols
    }

    /// Encode `text` into symbol codes, failing on the first unmapped byte.
    pub fn encode(&self, text: &[u8]) -> Result<Vec<SymbolCode>, AlphabetError> {
        text.iter()
            .enumerate()
            .map(|(position, &symbol)| {
                self.code(symbol)
                    .ok_or(AlphabetError::UnmappedSymbol { symbol, position })
            })
            .collect()
    }
}
