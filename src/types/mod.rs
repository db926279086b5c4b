pub mod activity;
pub mod series;
pub mod streams;
pub mod trim;
