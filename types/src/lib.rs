pub mod beacon_state;
pub mod bitfield;
pub mod config;
pub mod containers;
pub mod primitives;
