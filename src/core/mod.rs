pub mod lifecycle;
pub mod reflect;
pub mod task;
pub mod temporal;
pub mod views;
