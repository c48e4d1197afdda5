pub mod token;

pub use token::{MemoryTokenRepository, TokenRepository};
