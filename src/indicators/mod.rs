// Technical indicators used by the entry rule

pub mod moving_average;

pub use moving_average::calculate_sma;
