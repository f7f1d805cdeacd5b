//! # Trainer Implementation Utilities

mod frequency_table;
#[doc(inline)]
pub use frequency_table::FrequencyTable;

mod pair_span_index;
#[doc(inline)]
pub use pair_span_index::{PairCountMap, PairIndexMap, PairSpanIndex};

mod pretoken_counter;
#[doc(inline)]
pub use pretoken_counter::PretokenCounter;

mod token_span_buffer;
#[doc(inline)]
pub use token_span_buffer::TokenSpanBuf;
