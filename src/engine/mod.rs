// Engine subsystems

pub mod input;
