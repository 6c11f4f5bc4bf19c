//! Loader/cleaner for instrument metadata CSV exports.
//!
//! The entry points are [`io::reader::load_instruments`] (from a path) and
//! [`io::reader::load_from_reader`] (from any `Read`). Both return a
//! [`models::dataset::Dataset`]: the cleaned [`models::instrument::Instrument`]
//! rows plus the warnings collected while cleaning them.

pub mod errors;
pub mod io;
pub mod models;

pub use errors::Error;
pub use io::reader::{Delimiter, LoadOptions, load_from_reader, load_instruments};
pub use models::{dataset::Dataset, instrument::Instrument, warning::LoadWarning};
