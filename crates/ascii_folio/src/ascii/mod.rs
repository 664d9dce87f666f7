pub mod grid;
pub mod planet;
pub mod quantize;
pub mod ramp;
pub mod series;
