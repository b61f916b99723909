// Rusted Input - configuration-driven input action mapping

pub mod core;
pub mod engine;
