//! Unit tests for parsing, manifest validation and the loader.

mod parse;
