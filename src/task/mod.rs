pub mod command_input;
pub mod commutate;
pub mod control_loop;
pub mod mine;
pub mod serial_read;
pub mod status_report;
