#[macro_use]
pub mod macros;

pub mod current;
pub mod energy;
pub mod percent;
pub mod power;
pub mod voltage;
