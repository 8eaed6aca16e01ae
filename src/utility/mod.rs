//! Helpers shared by the operator dialogues.
pub mod string_utils;
