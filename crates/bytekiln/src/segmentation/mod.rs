//! # Text Segmentation
//!
//! Splits raw text into pretokens, optionally across parallel workers.

pub mod chunking;
pub mod parallel;

mod text_segmentor;
#[doc(inline)]
pub use text_segmentor::TextSegmentor;
