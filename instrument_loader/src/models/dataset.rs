use crate::models::{instrument::Instrument, warning::LoadWarning};

/// A cleaned export: instruments in file order plus loader warnings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub instruments: Vec<Instrument>,
    pub warnings: Vec<LoadWarning>,
}

impl Dataset {
    /// Close-only instruments, in file order.
    pub fn close_only(&self) -> impl Iterator<Item = &Instrument> {
        self.instruments.iter().filter(|i| i.is_close_only())
    }

    /// Instruments that can be traded, in file order.
    pub fn tradable(&self) -> impl Iterator<Item = &Instrument> {
        self.instruments.iter().filter(|i| !i.is_close_only())
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }
}
