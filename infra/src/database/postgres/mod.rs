pub mod token_repository_impl;

pub use token_repository_impl::PostgresTokenRepository;
