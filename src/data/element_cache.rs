//! Encoding of the per-element cache fields.
//!
//! Each element carries a top-layer scalar (`-1` for none) and a short byte
//! string holding its stack as comma-separated decimal ids, bottom first:
//! `b"1,4,9"`. The byte string is capped at [`CACHE_STACK_CAPACITY`]. When a
//! stack does not fit, ids are dropped from the bottom so the top survives,
//! and the encoding is prefixed with [`TRUNCATED_MARKER`]. A truncated cache
//! is never allowed to overwrite the persisted mapping; it is only unioned
//! into it (see [`AssignmentMap::merge_cache`]).
//!
//! [`AssignmentMap::merge_cache`]: crate::data::assignment::AssignmentMap::merge_cache

use bytes::{BufMut, Bytes, BytesMut};

use crate::layers::layer::LayerId;

/// Maximum encoded length of one element's cached stack, in bytes.
pub const CACHE_STACK_CAPACITY: usize = 64;
/// Leading byte marking a stack that lost ids to the capacity cap.
pub const TRUNCATED_MARKER: u8 = b'~';
/// Cache top value meaning "no layer".
pub const NO_TOP: i32 = -1;

/// A stack read back from the cache.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CachedStack {
    pub ids: Vec<LayerId>,
    /// `true` if the writer had to drop ids to fit the capacity.
    pub truncated: bool,
}

impl CachedStack {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Encode `stack` (bottom first) into at most [`CACHE_STACK_CAPACITY`] bytes.
pub fn encode_stack(stack: &[LayerId]) -> Bytes {
    let full = join(stack);
    if full.len() <= CACHE_STACK_CAPACITY {
        return full.freeze();
    }
    // keep the longest suffix that fits alongside the marker
    let mut kept = stack.len();
    let mut len = 1usize;
    for (i, id) in stack.iter().enumerate().rev() {
        let add = digits(id.get()) + usize::from(i + 1 != stack.len());
        if len + add > CACHE_STACK_CAPACITY {
            break;
        }
        len += add;
        kept = i;
    }
    log::warn!(
        "element cache stack truncated: kept {} of {} layer ids",
        stack.len() - kept,
        stack.len()
    );
    let mut out = BytesMut::with_capacity(len);
    out.put_u8(TRUNCATED_MARKER);
    out.extend_from_slice(&join(&stack[kept..]));
    out.freeze()
}

/// Decode a cache field. Tokens that are not positive integers are skipped.
pub fn decode_stack(raw: &[u8]) -> CachedStack {
    let (truncated, body) = match raw.split_first() {
        Some((&TRUNCATED_MARKER, rest)) => (true, rest),
        _ => (false, raw),
    };
    let ids = body
        .split(|&b| b == b',')
        .filter_map(|tok| std::str::from_utf8(tok).ok())
        .filter_map(|tok| tok.trim().parse::<i64>().ok())
        .filter_map(LayerId::from_i64)
        .collect();
    CachedStack { ids, truncated }
}

/// Cache top value for a stack (its last id, or [`NO_TOP`]).
#[inline]
pub fn top_of(stack: &[LayerId]) -> i32 {
    stack.last().map_or(NO_TOP, |id| id.as_cache_top())
}

fn join(stack: &[LayerId]) -> BytesMut {
    let mut out = BytesMut::new();
    for (i, id) in stack.iter().enumerate() {
        if i > 0 {
            out.put_u8(b',');
        }
        out.extend_from_slice(id.get().to_string().as_bytes());
    }
    out
}

fn digits(mut n: u32) -> usize {
    let mut d = 1;
    while n >= 10 {
        n /= 10;
        d += 1;
    }
    d
}
