//! Content-stream text recovery.
//!
//! - [`tokenizer`]: literal and hex string tokens per page
//! - [`decoder`]: escape resolution and Turkish code-page decoding
//! - [`normalize`]: line-ending cleanup and Turkish folding

pub mod decoder;
pub mod normalize;
pub mod tokenizer;

pub use decoder::{decode_hex, decode_literal};
pub use normalize::{contains_any, fold, normalize};
pub use tokenizer::{page_text, tokenize, PageTokens};
