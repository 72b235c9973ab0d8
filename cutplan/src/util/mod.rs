mod fpa;

pub mod assertions;

pub use fpa::FPA;
