pub mod dataset;
pub mod probe;
pub mod process;
