// Crate-level scenario tests
#[cfg(test)]
mod integration;
