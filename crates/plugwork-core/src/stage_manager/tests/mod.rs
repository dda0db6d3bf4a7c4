// Stage Manager test module
#[cfg(test)]
mod tracker_tests;
