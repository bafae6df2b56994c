//! Base call assembly
//!
//! Base calls come from three parallel tags: the called bases (`PBAS`), their
//! peak positions in the trace (`PLOC`) and their confidence values (`PCON`).
//! Instrument-edited copies (number 2) are preferred over the original calls
//! (number 1).

use crate::entry::TagKey;
use crate::tag::TagResolver;

/// Quality assigned to every call when the quality tag is missing or too short
pub const DEFAULT_QUALITY: i32 = 30;

/// Base-call string candidates in priority order
pub const BASE_KEYS: [TagKey; 2] = [TagKey::new(b"PBAS", 2), TagKey::new(b"PBAS", 1)];

/// Peak position candidates in priority order
pub const POSITION_KEYS: [TagKey; 2] = [TagKey::new(b"PLOC", 2), TagKey::new(b"PLOC", 1)];

/// Quality value candidates in priority order
pub const QUALITY_KEYS: [TagKey; 2] = [TagKey::new(b"PCON", 2), TagKey::new(b"PCON", 1)];

/// Uppercases `bases` and drops every character outside `A-Z`
///
/// Uppercasing is the full Unicode mapping, so `ß` becomes `SS`.
#[must_use]
pub fn normalize_bases(bases: &str) -> Vec<u8> {
    bases
        .to_uppercase()
        .bytes()
        .filter(u8::is_ascii_uppercase)
        .collect()
}

/// One called base
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaseCall {
    /// Uppercase base symbol (`A-Z`)
    pub symbol: u8,
    /// Peak position in the trace
    pub position: i32,
    /// Confidence value
    pub quality: i32,
}

/// The ordered base call table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BaseCalls {
    calls: Vec<BaseCall>,
}
impl BaseCalls {
    /// Aligns normalized bases, positions and qualities into a table
    ///
    /// The table has `min(bases, positions)` rows. Qualities are used only when
    /// there is at least one per row; otherwise every row gets `default_quality`.
    #[must_use]
    pub fn from_parts(bases: &[u8], positions: &[i32], quality: &[i32], default_quality: i32) -> Self {
        let n_calls = bases.len().min(positions.len());
        let quality = (quality.len() >= n_calls).then_some(quality);
        let calls = bases
            .iter()
            .zip(positions)
            .enumerate()
            .map(|(idx, (&symbol, &position))| BaseCall {
                symbol,
                position,
                quality: quality.map_or(default_quality, |q| q[idx]),
            })
            .collect();
        Self { calls }
    }

    /// Reads the base call tags through their fallback chains
    #[must_use]
    pub fn assemble(resolver: &TagResolver, default_quality: i32) -> Self {
        // an empty call string carries no calls, so it falls through as well
        let bases = resolver
            .first_present(&BASE_KEYS, |r, key| r.text(key).filter(|s| !s.is_empty()))
            .unwrap_or_default();
        let positions = resolver
            .first_present(&POSITION_KEYS, TagResolver::integers)
            .unwrap_or_default();
        let quality = resolver
            .first_present(&QUALITY_KEYS, TagResolver::integers)
            .unwrap_or_default();
        Self::from_parts(&normalize_bases(&bases), &positions, &quality, default_quality)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.calls.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BaseCall> {
        self.calls.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[BaseCall] {
        &self.calls
    }

    /// The called sequence as a string
    #[must_use]
    pub fn sequence(&self) -> String {
        self.calls.iter().map(|call| call.symbol as char).collect()
    }
}
impl<'a> IntoIterator for &'a BaseCalls {
    type Item = &'a BaseCall;
    type IntoIter = std::slice::Iter<'a, BaseCall>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
