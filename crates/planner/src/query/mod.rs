pub mod dialect;
pub mod generator;
pub mod ident;
pub mod renderer;
