pub mod body;

pub use body::{Body, G0};
