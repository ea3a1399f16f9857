pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
pub mod usecase;

#[cfg(test)]
mod test_support;
