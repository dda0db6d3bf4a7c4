#![cfg(test)]

pub mod common;
pub mod lifecycle_tests;
pub mod loading_tests;
pub mod override_tests;
