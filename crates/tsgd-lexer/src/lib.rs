//! Tokenizer for the TypeScript subset accepted by tsgd.

mod lexer;
mod token;

pub use lexer::{cook, Lexer};
pub use token::{Token, TokenKind};
