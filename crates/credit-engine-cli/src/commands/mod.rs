pub mod bonds;
pub mod cds;
pub mod credit;
pub mod curves;
pub mod exposure;
