//! Test utilities and allocation fixtures for vasa development.
//!
//! Provides allocation strategies that count or refuse requests (see
//! [`fixtures`]) plus small helpers for reading arrays back into `Vec`s
//! for assertions.

#![deny(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::{CountingAlloc, FailingAlloc};

use vasa::{AllocStrategy, ByteArray, DynamicArray};

/// Read every live element of a typed array into a `Vec`.
pub fn contents<T: Copy, A: AllocStrategy>(arr: &DynamicArray<T, A>) -> Vec<T> {
    (0..arr.len())
        .map(|i| arr.get_copied(i).expect("index below len is live"))
        .collect()
}

/// Read every live element of a byte array into owned byte vectors.
pub fn byte_contents<A: AllocStrategy>(arr: &ByteArray<A>) -> Vec<Vec<u8>> {
    (0..arr.len())
        .map(|i| arr.get(i).expect("index below len is live").to_vec())
        .collect()
}

/// `0, 1, ..., n - 1` as `u32`s.
pub fn sequence(n: usize) -> Vec<u32> {
    (0..n as u32).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_is_ascending() {
        assert_eq!(sequence(4), vec![0, 1, 2, 3]);
        assert!(sequence(0).is_empty());
    }

    #[test]
    fn contents_reads_in_order() {
        let mut arr = DynamicArray::<u32>::new().unwrap();
        for v in sequence(5) {
            arr.append(v).unwrap();
        }
        assert_eq!(contents(&arr), sequence(5));
    }

    #[test]
    fn byte_contents_reads_in_order() {
        let mut arr = ByteArray::new(2).unwrap();
        arr.append(&[1, 2]).unwrap();
        arr.append(&[3, 4]).unwrap();
        assert_eq!(byte_contents(&arr), vec![vec![1, 2], vec![3, 4]]);
    }
}
