mod common;

mod config_file;
mod motion;
mod scan_faults;
mod scan_timing;
