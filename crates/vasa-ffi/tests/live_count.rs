//! Exact live-array accounting. Kept in its own test binary (one test, one
//! process) so no other test touches the global handle table.

use vasa_ffi::array::{vasa_array_clone, vasa_array_deinit, vasa_array_init, vasa_array_live_count};
use vasa_ffi::VasaStatus;

const OK: i32 = VasaStatus::Ok as i32;

fn live() -> usize {
    let mut n = usize::MAX;
    assert_eq!(vasa_array_live_count(&mut n), OK);
    n
}

#[test]
fn deinit_and_clone_move_the_live_count() {
    assert_eq!(live(), 0);

    let mut a = 0;
    let mut b = 0;
    assert_eq!(vasa_array_init(4, &mut a), OK);
    assert_eq!(vasa_array_init(8, &mut b), OK);
    assert_eq!(live(), 2);

    let mut c = 0;
    assert_eq!(vasa_array_clone(a, &mut c), OK);
    assert_eq!(live(), 3);

    assert_eq!(vasa_array_deinit(a), OK);
    assert_eq!(live(), 2);
    // A stale handle changes nothing.
    assert_eq!(vasa_array_deinit(a), VasaStatus::InvalidHandle as i32);
    assert_eq!(live(), 2);

    assert_eq!(vasa_array_deinit(b), OK);
    assert_eq!(vasa_array_deinit(c), OK);
    assert_eq!(live(), 0);

    // A failed init registers nothing.
    let mut z = 0;
    assert_eq!(vasa_array_init(0, &mut z), VasaStatus::ConfigError as i32);
    assert_eq!(live(), 0);
}
