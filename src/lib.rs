pub mod annotate;
pub mod cli;
pub mod config;
pub mod equivalence;
pub mod error;
pub mod extract;
pub mod finding;
pub mod host;
pub mod identity;
pub mod links;
pub mod markup;
pub mod reconcile;
pub mod scanner;
pub mod status;
pub mod templates;

#[cfg(test)]
pub mod test_helpers;
