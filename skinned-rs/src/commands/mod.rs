//! Command implementations for each file format

pub mod m3d;
