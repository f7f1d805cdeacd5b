//! # Pretokenization Patterns

use crate::regex::ConstRegexWrapperPattern;

/// Join string literals with a separator at compile time.
#[macro_export]
macro_rules! join_strs {
    ($sep:literal, ($first:expr $(, $rest:expr)* $(,)?)) => {
        concat!($first $(, $sep, $rest)*)
    };
}

/// Join regex alternatives with `|` at compile time.
#[macro_export]
macro_rules! join_patterns {
    ($($e:expr),* $(,)?) => { $crate::join_strs!("|", ($($e),*)) };
}

/// The GPT-2 style byte-level pretokenization pattern.
///
/// Alternatives, first match wins:
/// * a contraction suffix,
/// * a letter run, a digit run, or a run of other non-space symbols;
///   each with an optional single leading space,
/// * a whitespace run not followed by non-space,
/// * any other whitespace run.
///
/// The look-ahead requires `fancy_regex`.
pub const GPT2_PRETOKEN_PATTERN: ConstRegexWrapperPattern =
    ConstRegexWrapperPattern::Fancy(join_patterns!(
        r"'(?:[sdmt]|ll|ve|re)",
        r" ?\p{L}+",
        r" ?\p{N}+",
        r" ?[^\s\p{L}\p{N}]+",
        r"\s+(?!\S)",
        r"\s+",
    ));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_patterns() {
        assert_eq!(join_patterns!("a", "b", "c"), "a|b|c");
    }

    #[test]
    fn test_join_strs() {
        assert_eq!(join_strs!("+", ("a", "b", "c")), "a+b+c");
    }

    #[test]
    fn test_gpt2_pattern() {
        assert_eq!(
            GPT2_PRETOKEN_PATTERN.as_str(),
            r"'(?:[sdmt]|ll|ve|re)| ?\p{L}+| ?\p{N}+| ?[^\s\p{L}\p{N}]+|\s+(?!\S)|\s+"
        );

        let re = GPT2_PRETOKEN_PATTERN.compile().unwrap();
        assert!(re.is_fancy());

        let text = "it's  42 apples!\n";
        let pieces = re
            .find_ranges(text)
            .map(|r| &text[r.unwrap()])
            .collect::<Vec<_>>();
        assert_eq!(pieces, vec!["it", "'s", " ", " 42", " apples", "!", "\n"]);
    }
}
