pub mod columns;
pub mod dataset;
pub mod instrument;
pub mod warning;
