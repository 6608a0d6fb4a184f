pub mod canvas;
pub mod chart;
pub mod scale;

pub use canvas::{Canvas, Rgb};
pub use chart::{ChartLayout, Error, Result, render, save_chart};
pub use scale::{AxisScale, nice_step};
