//! Lexical layer: scanning, tokenization, entity codec.

pub mod entities;
pub mod scanner;
pub mod tokenizer;
