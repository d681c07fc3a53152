pub mod deps;
pub mod eval;
pub mod train;
