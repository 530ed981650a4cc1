pub mod activity;
pub mod risk;
