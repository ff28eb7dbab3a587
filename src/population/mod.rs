//! Population Store: fixed-size, slot-addressed agents and genomes.

pub mod store;

pub use store::Population;
