//! Input plumbing between a host window and the frame driver.

pub mod input;

pub use input::{InputEvent, InputMapping, OrbitDelta};
