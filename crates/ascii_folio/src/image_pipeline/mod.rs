pub mod frame;
pub mod loader;
pub mod resize;
pub mod sampler;
