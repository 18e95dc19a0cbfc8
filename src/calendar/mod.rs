pub mod business_day;
pub mod time_window;
