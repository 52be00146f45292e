//! A set of built-in tools that models can use.

mod arithmetic;
mod weather;

pub use arithmetic::{AddTool, DivideTool, MultiplyTool};
pub use weather::WeatherTool;
