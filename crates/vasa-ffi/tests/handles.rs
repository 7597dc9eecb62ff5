//! End-to-end tests driving the C ABI from Rust.

use std::thread;

use proptest::prelude::*;
use vasa_ffi::array::{
    vasa_array_append, vasa_array_deinit, vasa_array_get, vasa_array_init, vasa_array_insert,
    vasa_array_len, vasa_array_remove,
};
use vasa_ffi::VasaStatus;
use vasa_test_utils::sequence;

const OK: i32 = VasaStatus::Ok as i32;

fn init_u32() -> u64 {
    let mut h = 0;
    assert_eq!(vasa_array_init(4, &mut h), OK);
    h
}

fn read_all(h: u64) -> Vec<u32> {
    let mut n = 0;
    assert_eq!(vasa_array_len(h, &mut n), OK);
    (0..n)
        .map(|i| {
            let mut buf = [0u8; 4];
            assert_eq!(vasa_array_get(h, i, buf.as_mut_ptr().cast(), 4), OK);
            u32::from_ne_bytes(buf)
        })
        .collect()
}

#[test]
fn arrays_on_separate_threads_do_not_interfere() {
    let workers: Vec<_> = (0..4u32)
        .map(|t| {
            thread::spawn(move || {
                let h = init_u32();
                for v in sequence(200) {
                    assert_eq!(vasa_array_append(h, (v + t * 1000).to_ne_bytes().as_ptr().cast()), OK);
                }
                let got = read_all(h);
                assert_eq!(vasa_array_deinit(h), OK);
                got
            })
        })
        .collect();
    for (t, w) in workers.into_iter().enumerate() {
        let got = w.join().unwrap();
        let want: Vec<u32> = sequence(200).into_iter().map(|v| v + t as u32 * 1000).collect();
        assert_eq!(got, want);
    }
}

#[test]
fn shared_handle_serialises_appends() {
    let h = init_u32();
    let workers: Vec<_> = (0..4)
        .map(|_| {
            thread::spawn(move || {
                for v in 0..100u32 {
                    assert_eq!(vasa_array_append(h, v.to_ne_bytes().as_ptr().cast()), OK);
                }
            })
        })
        .collect();
    for w in workers {
        w.join().unwrap();
    }
    let mut got = read_all(h);
    assert_eq!(got.len(), 400);
    got.sort_unstable();
    assert_eq!(got[0], 0);
    assert_eq!(got[399], 99);
    assert_eq!(vasa_array_deinit(h), OK);
}

#[derive(Clone, Debug)]
enum Op {
    Append(u32),
    Insert(usize, u32),
    Remove(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        any::<u32>().prop_map(Op::Append),
        (0..40usize, any::<u32>()).prop_map(|(i, v)| Op::Insert(i, v)),
        (0..40usize).prop_map(Op::Remove),
    ]
}

proptest! {
    #[test]
    fn c_abi_matches_vec_model(ops in prop::collection::vec(op(), 0..60)) {
        let h = init_u32();
        let mut model: Vec<u32> = Vec::new();
        for op in ops {
            match op {
                Op::Append(v) => {
                    prop_assert_eq!(vasa_array_append(h, v.to_ne_bytes().as_ptr().cast()), OK);
                    model.push(v);
                }
                Op::Insert(i, v) => {
                    let code = vasa_array_insert(h, v.to_ne_bytes().as_ptr().cast(), i);
                    if i <= model.len() {
                        prop_assert_eq!(code, OK);
                        model.insert(i, v);
                    } else {
                        prop_assert_eq!(code, VasaStatus::InvalidIndex as i32);
                    }
                }
                Op::Remove(i) => {
                    let code = vasa_array_remove(h, i);
                    if i < model.len() {
                        prop_assert_eq!(code, OK);
                        model.remove(i);
                    } else {
                        prop_assert_eq!(code, VasaStatus::InvalidIndex as i32);
                    }
                }
            }
        }
        prop_assert_eq!(read_all(h), model);
        prop_assert_eq!(vasa_array_deinit(h), OK);
    }
}
