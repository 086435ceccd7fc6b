//! Contended stress over the global-mutex façade.
//!
//! Kept as the only test in this binary so the process heap is virgin: with
//! every allocation freed by the end, the absolute counters must agree.

mod common;

use heap_malloc::{
    get_data_segment_free_space_size, get_data_segment_size, ts_free_lock, ts_malloc_lock,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Arc, Barrier};
use std::thread;

const THREADS: usize = 8;
const PAIRS: usize = 400;

#[test]
fn interleaved_malloc_free_pairs_leave_one_well_formed_list() {
    let _guard = common::heap_guard();
    let start = Arc::new(Barrier::new(THREADS));

    let workers: Vec<_> = (0..THREADS)
        .map(|id| {
            let start = Arc::clone(&start);
            thread::spawn(move || {
                let mut rng = StdRng::seed_from_u64(0xC0FF_EE00 ^ id as u64);
                start.wait();

                let mut live: Vec<(*mut u8, usize, u8)> = Vec::new();
                for round in 0..PAIRS {
                    let size = rng.gen_range(1..=256);
                    let p = ts_malloc_lock(size);
                    assert!(!p.is_null());
                    let tag = ((id as u8) << 4 | (round as u8 & 0x0F)) | 1;
                    unsafe { p.write_bytes(tag, size) };
                    live.push((p, size, tag));

                    // Keep a small live set so mallocs and frees interleave.
                    if live.len() > 8 || rng.gen_bool(0.5) {
                        let idx = rng.gen_range(0..live.len());
                        let (q, sz, tg) = live.swap_remove(idx);
                        unsafe {
                            for off in [0, sz / 2, sz - 1] {
                                assert_eq!(*q.add(off), tg, "payload clobbered");
                            }
                            ts_free_lock(q);
                        }
                    }
                }
                for (q, sz, tg) in live {
                    unsafe {
                        for off in [0, sz / 2, sz - 1] {
                            assert_eq!(*q.add(off), tg, "payload clobbered");
                        }
                        ts_free_lock(q);
                    }
                }
            })
        })
        .collect();

    for worker in workers {
        worker.join().unwrap();
    }

    // Everything was freed: the whole data segment is back in the pool and
    // the shared list survived the contention structurally intact.
    assert_eq!(
        get_data_segment_free_space_size(),
        get_data_segment_size()
    );
    heap_malloc::debug::with_global_free_list(|list| {
        assert!(list.is_well_formed());
        assert!(!list.is_empty());
    });
}
