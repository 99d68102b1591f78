//! Color reconstruction: demosaicing the RGB sensor and white balance.

pub mod cpu_debayer;
mod reconstructor;
pub mod types;
mod white_balance;

pub use cpu_debayer::{CpuDebayer, SENSOR_CFA};
pub use reconstructor::ColorReconstructor;
pub use types::{ColorImage, WhiteBalance};
pub use white_balance::{apply_white_balance, measure_white_balance};
