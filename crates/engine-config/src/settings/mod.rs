pub mod defaults;
pub mod endpoint;
pub mod error;
pub mod validated;
pub mod window;
