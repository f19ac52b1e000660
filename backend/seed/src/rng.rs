//! Mulberry32, a 32-bit generator small enough to reproduce anywhere.
//!
//! Not suitable for anything security related: every value, including the
//! UUIDs, is a pure function of the seed.
use uuid::{Builder, Uuid};

use crate::error::GenerateError;

const GOLDEN_GAMMA: u32 = 0x6D2B_79F5;
const TWO_POW_32: f64 = 4_294_967_296.0;

#[derive(Clone, Debug)]
pub struct SeededRng {
    state: u32,
}

impl SeededRng {
    /// Seeds are reduced modulo 2^32, so `-1` and `u32::MAX` give the same stream.
    pub fn new(seed: i64) -> Self {
        Self { state: seed as u32 }
    }

    /// Float in [0, 1).
    pub fn next(&mut self) -> f64 {
        self.state = self.state.wrapping_add(GOLDEN_GAMMA);
        let t = self.state;

        let mut r = (t ^ (t >> 15)).wrapping_mul(1 | t);
        r ^= r.wrapping_add((r ^ (r >> 7)).wrapping_mul(61 | r));

        (r ^ (r >> 14)) as f64 / TWO_POW_32
    }

    /// Integer in [0, bound).
    pub fn next_int(&mut self, bound: usize) -> Result<usize, GenerateError> {
        if bound == 0 {
            return Err(GenerateError::InvalidBound);
        }

        Ok(self.below(bound))
    }

    pub fn choice<'a, T>(&mut self, items: &'a [T]) -> Result<&'a T, GenerateError> {
        if items.is_empty() {
            return Err(GenerateError::EmptyInput);
        }

        let index = self.below(items.len());
        Ok(&items[index])
    }

    /// Fisher-Yates over a copy, walking down from the last index.
    pub fn shuffle<T: Clone>(&mut self, items: &[T]) -> Vec<T> {
        let mut out = items.to_vec();
        for i in (1..out.len()).rev() {
            let j = self.below(i + 1);
            out.swap(i, j);
        }
        out
    }

    // bound > 0
    pub(crate) fn below(&mut self, bound: usize) -> usize {
        (self.next() * bound as f64).floor() as usize
    }

    /// Version 4 layout with bytes drawn from this generator.
    pub fn uuid(&mut self) -> Uuid {
        let mut bytes = [0u8; 16];
        for byte in bytes.iter_mut() {
            *byte = (self.next() * 256.0).floor() as u8;
        }

        Builder::from_random_bytes(bytes).into_uuid()
    }
}

/// Parses a seed given as text. Anything but a plain integer is refused.
pub fn parse_seed(raw: &str) -> Result<i64, GenerateError> {
    raw.trim()
        .parse()
        .map_err(|_| GenerateError::InvalidSeed(raw.to_string()))
}
