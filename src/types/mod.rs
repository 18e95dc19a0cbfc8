pub mod rain_status;
pub mod record;
pub mod station_window;
