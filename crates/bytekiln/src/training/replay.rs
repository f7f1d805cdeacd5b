//! # Merge Replay
//!
//! Re-applies learned merges to raw bytes. Replaying the merges of a
//! training run over a pretoken reproduces the segmentation the trainer
//! ended with for that pretoken.
//!
//! This is a checking tool, not an encoder: it is quadratic in the number
//! of merges.

use crate::vocab::{ByteToken, Merge};

/// Segment `bytes` by applying `merges` in order.
///
/// Each merge rewrites all non-overlapping occurrences of its
/// ``(left, right)`` pair, greedily left to right.
pub fn replay_merges(
    bytes: &[u8],
    merges: &[Merge],
) -> Vec<ByteToken> {
    let mut tokens: Vec<ByteToken> = bytes.iter().map(|&b| ByteToken::from_byte(b)).collect();

    for (left, right) in merges {
        if tokens.len() < 2 {
            break;
        }
        if !tokens.windows(2).any(|w| &w[0] == left && &w[1] == right) {
            continue;
        }

        let merged = left.concat(right);
        let mut rewritten = Vec::with_capacity(tokens.len());
        let mut i = 0;
        while i < tokens.len() {
            if i + 1 < tokens.len() && &tokens[i] == left && &tokens[i + 1] == right {
                rewritten.push(merged.clone());
                i += 2;
            } else {
                rewritten.push(tokens[i].clone());
                i += 1;
            }
        }
        tokens = rewritten;
    }

    tokens
}
