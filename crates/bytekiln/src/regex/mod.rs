//! # Regex Utilities
//!
//! The default pretokenization pattern needs look-ahead, which requires the
//! extended machinery of the [`fancy_regex`] crate; user supplied patterns
//! that do not need it should run on the standard [`regex`] crate.
//!
//! * Labeling Patterns - [`RegexWrapperPattern`]
//!   * [`RegexWrapperPattern::Basic`] - a pattern which was written for [`regex`].
//!   * [`RegexWrapperPattern::Fancy`] - a pattern which was written for [`fancy_regex`].
//!   * [`RegexWrapperPattern::Adaptive`] - unknown target, try basic; then fall-up to fancy.
//! * Wrapping Compiled Regex - [`RegexWrapper`]
//!
//! The [`RegexWrapper`] type supports only one operation, ``find_ranges()``.

pub mod patterns;
pub mod regex_wrapper;

#[doc(inline)]
pub use patterns::GPT2_PRETOKEN_PATTERN;
#[doc(inline)]
pub use regex_wrapper::{ConstRegexWrapperPattern, ErrorWrapper, RegexWrapper, RegexWrapperPattern};
