pub mod candidate;
pub mod parser;
