pub mod error;
pub mod execution;
pub mod orchestrator;

#[cfg(test)]
mod tests;
