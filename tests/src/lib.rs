//! End-to-end runs against a mock backend.

#[cfg(test)]
mod assessment;
