//! Ownership and threading behaviour: arrays move between threads and are
//! shared only behind an external lock.

use std::sync::{Arc, Mutex};
use std::thread;

use vasa::{ArrayConfig, DynamicArray};
use vasa_test_utils::{contents, sequence};

#[test]
fn array_moves_to_another_thread() {
    let mut arr = DynamicArray::<u32>::new().unwrap();
    for v in sequence(10) {
        arr.append(v).unwrap();
    }
    let arr = thread::spawn(move || {
        let mut arr = arr;
        arr.remove(0).unwrap();
        arr
    })
    .join()
    .unwrap();
    assert_eq!(contents(&arr), (1..10).collect::<Vec<u32>>());
}

#[test]
fn mutex_wrapper_serialises_writers() {
    let config = ArrayConfig::new().with_max_capacity(1024);
    let shared = Arc::new(Mutex::new(DynamicArray::<u32>::with_config(config).unwrap()));
    let handles: Vec<_> = (0..4u32)
        .map(|t| {
            let shared = Arc::clone(&shared);
            thread::spawn(move || {
                for i in 0..100 {
                    shared.lock().unwrap().append(t * 1000 + i).unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    let arr = shared.lock().unwrap();
    assert_eq!(arr.len(), 400);
    assert_eq!(arr.capacity(), 512);
    let mut seen = contents(&arr);
    seen.sort_unstable();
    let mut expected: Vec<u32> = (0..4u32)
        .flat_map(|t| (0..100).map(move |i| t * 1000 + i))
        .collect();
    expected.sort_unstable();
    assert_eq!(seen, expected);
}

#[test]
fn deinit_consumes_the_array() {
    let mut arr = DynamicArray::<u8>::new().unwrap();
    arr.append(1).unwrap();
    let released = arr.deinit();
    assert_eq!(released.len, 1);
    assert_eq!(released.capacity, 1);
}
