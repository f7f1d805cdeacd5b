//! # Vocabulary Types
//!
//! * [`ByteToken`] - content-addressed byte strings, the unit of segmentation.
//! * [`TokenTable`] - interns token content as dense training symbols.
//! * [`Vocabulary`] - the contiguous ``{ id -> ByteToken }`` training output.

mod byte_token;
#[doc(inline)]
pub use byte_token::{ByteToken, Merge};

pub mod token_table;
#[doc(inline)]
pub use token_table::{TokenTable, U8_SIZE};

mod vocabulary;
#[doc(inline)]
pub use vocabulary::{Vocabulary, validate_special_tokens};
