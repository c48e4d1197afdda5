//! Business services built on the domain entities and repositories.

pub mod token;

pub use token::*;
