pub mod assembler;
pub mod chart;
pub mod command_log;
pub mod history;
pub mod interval;
pub mod power_cut;
pub mod reading;
pub mod window;
