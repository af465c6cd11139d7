//! Cross-crate tests of the validation pipeline, wired with stub collaborators.

#[cfg(test)]
mod utils;

mod pipeline;
