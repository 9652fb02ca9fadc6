//! Environment variable access behind a trait, so configuration loading can
//! be tested without touching the process environment.

use std::env;

pub trait ReadEnv {
    fn var(&self, key: &str) -> Result<String, env::VarError>;
}

/// Zero-sized; delegates to `std::env`.
pub struct SystemEnv;

impl ReadEnv for SystemEnv {
    #[inline]
    fn var(&self, key: &str) -> Result<String, env::VarError> {
        env::var(key)
    }
}

#[cfg(test)]
pub use in_memory::InMemoryEnv;
