pub mod demo;
pub mod recipes;
pub mod work_orders;
