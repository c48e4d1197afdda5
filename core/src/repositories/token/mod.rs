pub mod r#trait {
    pub use super::trait_::*;
}
#[path = "trait.rs"]
mod trait_;

pub mod conformance;
pub mod memory;

pub use memory::MemoryTokenRepository;
pub use r#trait::TokenRepository;

#[cfg(test)]
mod tests;
