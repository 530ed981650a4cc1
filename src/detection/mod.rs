pub mod behavior;
pub mod cluster;
