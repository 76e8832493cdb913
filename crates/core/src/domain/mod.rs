pub mod news;
pub mod stock;
