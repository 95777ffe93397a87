pub mod batch;
pub mod pair;
pub mod row;
