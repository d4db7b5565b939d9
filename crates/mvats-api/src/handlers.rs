//! Request handlers.

pub mod classes;
pub mod health;
pub mod predict;

pub use classes::*;
pub use health::*;
pub use predict::*;
