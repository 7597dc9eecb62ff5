//! Benchmark workloads for vasa arrays.
//!
//! Provides deterministic inputs shared by the criterion benches:
//!
//! - [`index_stream`]: pseudo-random positions for insert/remove workloads
//! - [`filled`]: an array pre-loaded to a given length

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use vasa::{ArrayConfig, ArrayError, DynamicArray};

/// Generate `n` deterministic positions, each valid for an array whose
/// length starts at `start_len` and changes by `step` (+1 for inserts,
/// -1 for removes) after every operation.
///
/// Uses the same 64-bit LCG constants as Knuth's MMIX so runs are
/// reproducible across platforms without a random-number crate.
pub fn index_stream(n: usize, start_len: usize, step: isize, seed: u64) -> Vec<usize> {
    let mut state = seed;
    let mut len = start_len;
    let mut out = Vec::with_capacity(n);
    for _ in 0..n {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        // Inserts may target `len`; removes need a live slot.
        let bound = if step > 0 { len + 1 } else { len };
        if bound == 0 {
            break;
        }
        out.push(((state >> 33) % bound as u64) as usize);
        len = len.wrapping_add_signed(step);
    }
    out
}

/// Build an unbounded array holding `0..len`.
pub fn filled(len: usize) -> Result<DynamicArray<u64>, ArrayError> {
    let mut arr = DynamicArray::with_config(ArrayConfig::unbounded())?;
    for v in 0..len as u64 {
        arr.append(v)?;
    }
    Ok(arr)
}
