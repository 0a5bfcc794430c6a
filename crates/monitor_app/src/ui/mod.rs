pub mod input;
pub mod notice;
pub mod render;
