//! API request handlers

pub mod clients;
pub mod follow_ups;
pub mod leads;
pub mod users;
pub mod work_time;
