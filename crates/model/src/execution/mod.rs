pub mod run;
pub mod target;
