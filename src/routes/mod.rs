pub mod health;
pub mod trim;
