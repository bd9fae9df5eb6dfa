pub mod activity;
pub mod views;
