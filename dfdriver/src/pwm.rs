pub mod pca9685;
pub mod servo;

pub use pca9685::Pca9685;
pub use servo::{Servo, ServoPwmOut};
