//! # `bytekiln` Byte-Level BPE Training
//!
//! Trains byte-level Byte Pair Encoding vocabularies: a contiguous
//! ``{ id -> bytes }`` vocabulary and the ordered merge list that built it.
//!
//! See:
//! * [`train_bpe`] for one-shot training on a corpus.
//! * [`training`] for streaming input, options, and step-wise training.
//! * [`segmentation`] for pretokenization and the parallel driver.
//! * [`vocab`] for the vocabulary and token types.
//!
//! ## Example
//!
//! ```rust
//! let corpus = "low low low low low lower lower widest widest widest newest newest";
//! let results = bytekiln::train_bpe(corpus, 262, &["<|endoftext|>"], 1)?;
//!
//! assert_eq!(results.vocab.len(), 262);
//! assert_eq!(results.merges.len(), 5);
//! # Ok::<(), bytekiln::BpeError>(())
//! ```
//!
//! ## Crate Features
//!
//! #### feature: ``default``
//!
//! * ``ahash``
//! * ``rayon``
//!
//! #### feature: ``ahash``
//!
//! This swaps all HashMap/HashSet implementations for ``ahash``; which is a performance
//! win on many/(most?) modern CPUs.
//!
//! This is done by the ``types::CommonHash{*}`` type alias machinery.
//!
//! #### feature: ``rayon``
//!
//! Runs the parallel segmentation driver on a ``rayon`` thread pool.
//! Without it, sharded input is segmented on the calling thread.
//!
//! #### feature: ``tracing``
//!
//! This enables a number of ``tracing`` instrumentation points.
//! This is only useful for timing tracing of the library itself.
#![warn(missing_docs, unused)]

pub mod errors;
pub mod regex;
pub mod segmentation;
pub mod training;
pub mod types;
pub mod vocab;

#[doc(inline)]
pub use errors::{BpeError, BpeResult};
#[doc(inline)]
pub use training::{TrainResults, train_bpe, train_bpe_bytes};
#[doc(inline)]
pub use vocab::{ByteToken, Merge, Vocabulary};
