//! Utility modules

pub mod fuzzy;
pub mod text;

pub use fuzzy::{fuzzy_match_score, rank_by};
pub use text::{
    byte_offset, char_at, char_head, char_len, char_slice, char_tail, is_word_boundary, is_word_char,
};
