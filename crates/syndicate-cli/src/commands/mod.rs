pub mod distribution;
pub mod sensitivity;
pub mod waterfall;
