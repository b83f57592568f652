//! Lookup tables for single colour fitting.
//!
//! For every 8-bit target and channel depth the table holds two candidate
//! encodings: one that reproduces the target through an endpoint (index 0)
//! and one that reproduces it through the 2/3 interpolant (index 2).

use std::sync::LazyLock;

use crate::dxt::colour_block::{expand_5, expand_6};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SourceBlock {
    pub start: u8,
    pub end: u8,
    pub error: u8,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SingleColourLookup {
    /// Candidates for palette index 0 and palette index 2.
    pub sources: [SourceBlock; 2],
}

/// Palette index each candidate slot decodes through.
pub const CANDIDATE_INDICES: [u8; 2] = [0, 2];

pub static LOOKUP_5_3: LazyLock<[SingleColourLookup; 256]> = LazyLock::new(|| build(31, expand_5));
pub static LOOKUP_6_3: LazyLock<[SingleColourLookup; 256]> = LazyLock::new(|| build(63, expand_6));

fn build(limit: u8, expand: fn(u8) -> u8) -> [SingleColourLookup; 256] {
    std::array::from_fn(|target| {
        let target = target as i32;

        let mut endpoint = SourceBlock {
            error: u8::MAX,
            ..Default::default()
        };
        let mut interpolant = endpoint;

        for start in 0..=limit {
            let s = expand(start) as i32;

            let error = (s - target).unsigned_abs();
            if error < endpoint.error as u32 {
                endpoint = SourceBlock {
                    start,
                    end: start,
                    error: error as u8,
                };
            }

            for end in 0..=limit {
                let value = (2 * s + expand(end) as i32) / 3;
                let error = (value - target).unsigned_abs();
                if error < interpolant.error as u32 {
                    interpolant = SourceBlock {
                        start,
                        end,
                        error: error as u8,
                    };
                }
            }
        }

        SingleColourLookup {
            sources: [endpoint, interpolant],
        }
    })
}
