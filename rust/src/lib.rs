//! # bstpipe - Complete BST Round-Trip Harness
//!
//! Repeatedly builds a binary search tree from a record set in random order,
//! rebuilds it at minimum height, flattens it to an array, then rebuilds a
//! tree from that array and checks it. A configurable share of the arrays is
//! deliberately flattened the wrong way so the checker has something to catch.
//!
//! The workload runs twice: once inline, once as a producer thread and a
//! consumer thread handing arrays through a fixed-size blocking buffer.
//!
//! ## Features
//!
//! - **Tree engine**: key-ordered insertion, height, balance check, and
//!   minimum-height rebuild ([`bst`])
//! - **Lazy traversals**: in-order, level-order and post-order ([`traversal`])
//! - **Fault injection**: per-tree choice of serialization ([`pipeline::FaultPolicy`])
//! - **Bounded buffer**: single-producer/single-consumer handoff with
//!   blocking `put`/`get` ([`bounded_buffer`])
//! - **Driver**: timed sequential and parallel phases ([`harness`])
//!
//! ## Basic Usage
//!
//! ```rust
//! use bstpipe::pipeline::{FaultPolicy, consume, produce};
//! use bstpipe::random::RandomSource;
//! use bstpipe::record::{Cd, RecordStore};
//!
//! let store = RecordStore::parse(
//!     "Miles Davis|Kind of Blue|1959|5\n\
//!      Nirvana|Nevermind|1991|4\n\
//!      Radiohead|OK Computer|1997|5\n",
//! )
//! .unwrap();
//! let mut rand = RandomSource::seeded(7);
//!
//! let tree = produce(&store, Cd::order(), FaultPolicy::never(), &mut rand).unwrap();
//! let validation = consume(tree, Cd::order());
//! assert!(validation.is_valid());
//! assert_eq!(validation.height, 1);
//! ```
//!
//! ## Bounded Buffer
//!
//! ```rust
//! use std::thread;
//! use bstpipe::bounded_buffer::BoundedBuffer;
//!
//! let buffer = BoundedBuffer::new(1);
//! let taken: Vec<u32> = thread::scope(|s| {
//!     s.spawn(|| (0..10).for_each(|i| buffer.put(i)));
//!     let consumer = s.spawn(|| (0..10).map(|_| buffer.get()).collect::<Vec<u32>>());
//!     buffer.wait_until_drained(10);
//!     consumer.join().unwrap()
//! });
//! assert_eq!(taken, (0..10).collect::<Vec<_>>());
//! ```
//!
//! ## Running the Harness
//!
//! ```bash
//! cargo run --release --bin bst_harness -- --records cds.txt --buffer-size 4
//! cargo bench
//! ```

pub mod bounded_buffer;
pub mod bst;
pub mod config;
pub mod harness;
pub mod permutation;
pub mod pipeline;
pub mod random;
pub mod record;
pub mod traversal;
