//! # Config
//!
//! Define and implement config options for the simulator

use anyhow::Result;
use config::{ConfigError, Environment};
use dotenv::dotenv;
use serde::Deserialize;

/// struct holding configuration options
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// departure policy: capacity, capacity_station, wait or station_wait
    pub mode: String,

    /// simulation step in seconds
    pub time_step: i64,

    /// start of the simulation and of the demand window (epoch seconds)
    pub start_time: i64,

    /// end of the demand window (epoch seconds); the simulation itself runs
    /// one hour longer so late departures can complete
    pub end_time: i64,

    /// seconds an aircraft blocks a pad while landing
    pub landing_occupation_time: i64,

    /// seconds an aircraft blocks a pad while taking off
    pub takeoff_occupation_time: i64,

    /// seconds to swap an aircraft battery after landing
    pub battery_swap_time: i64,

    /// boarding seconds added per passenger
    pub board_time_per_passenger: i64,

    /// deboarding seconds charged per passenger at turnaround
    pub deboard_time_per_passenger: i64,

    /// length of one holding slot in seconds
    pub holding_duration: i64,

    /// max seconds a passenger waits before the wait policies react
    pub maximum_wait_time: i64,

    /// number of random demands to generate
    pub demand_count: u32,

    /// seed for the demand generator
    pub demand_seed: u64,

    /// path to the vertiport inventory CSV
    pub vertiport_file: String,

    /// path to the aircraft info JSON table
    pub aircraft_info_file: String,

    /// path to the max-station-time JSON table
    pub station_time_file: String,

    /// path to log configuration YAML file
    pub log_config: String,
}

impl Default for Config {
    fn default() -> Self {
        log::warn!("(default) Creating Config object with default values.");
        Self::new()
    }
}

impl Config {
    /// Default values for Config
    pub fn new() -> Self {
        Config {
            mode: String::from("capacity"),
            time_step: 30,
            start_time: 1_668_832_200,
            end_time: 1_668_886_200,
            landing_occupation_time: 180,
            takeoff_occupation_time: 120,
            battery_swap_time: 300,
            board_time_per_passenger: 60,
            deboard_time_per_passenger: 60,
            holding_duration: 600,
            maximum_wait_time: 1200,
            demand_count: 100,
            demand_seed: 42,
            vertiport_file: String::from("vertiports.csv"),
            aircraft_info_file: String::from("aircraft_info.json"),
            station_time_file: String::from("max_station_time.json"),
            log_config: String::from("log4rs.yaml"),
        }
    }

    /// Create a new `Config` object using environment variables
    pub fn try_from_env() -> Result<Self, ConfigError> {
        // read .env file if present
        dotenv().ok();
        let default_config = Config::default();

        config::Config::builder()
            .set_default("mode", default_config.mode)?
            .set_default("time_step", default_config.time_step)?
            .set_default("start_time", default_config.start_time)?
            .set_default("end_time", default_config.end_time)?
            .set_default(
                "landing_occupation_time",
                default_config.landing_occupation_time,
            )?
            .set_default(
                "takeoff_occupation_time",
                default_config.takeoff_occupation_time,
            )?
            .set_default("battery_swap_time", default_config.battery_swap_time)?
            .set_default(
                "board_time_per_passenger",
                default_config.board_time_per_passenger,
            )?
            .set_default(
                "deboard_time_per_passenger",
                default_config.deboard_time_per_passenger,
            )?
            .set_default("holding_duration", default_config.holding_duration)?
            .set_default("maximum_wait_time", default_config.maximum_wait_time)?
            .set_default("demand_count", default_config.demand_count)?
            .set_default("demand_seed", default_config.demand_seed)?
            .set_default("vertiport_file", default_config.vertiport_file)?
            .set_default("aircraft_info_file", default_config.aircraft_info_file)?
            .set_default("station_time_file", default_config.station_time_file)?
            .set_default("log_config", default_config.log_config)?
            .add_source(Environment::default().separator("__"))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use crate::Config;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_config_from_default() {
        let config = Config::default();

        assert_eq!(config.mode, String::from("capacity"));
        assert_eq!(config.time_step, 30);
        assert_eq!(config.start_time, 1_668_832_200);
        assert_eq!(config.end_time, 1_668_886_200);
        assert_eq!(config.landing_occupation_time, 180);
        assert_eq!(config.takeoff_occupation_time, 120);
        assert_eq!(config.battery_swap_time, 300);
        assert_eq!(config.board_time_per_passenger, 60);
        assert_eq!(config.deboard_time_per_passenger, 60);
        assert_eq!(config.holding_duration, 600);
        assert_eq!(config.maximum_wait_time, 1200);
        assert_eq!(config.demand_count, 100);
        assert_eq!(config.demand_seed, 42);
        assert_eq!(config.vertiport_file, String::from("vertiports.csv"));
        assert_eq!(
            config.aircraft_info_file,
            String::from("aircraft_info.json")
        );
        assert_eq!(
            config.station_time_file,
            String::from("max_station_time.json")
        );
        assert_eq!(config.log_config, String::from("log4rs.yaml"));
    }

    #[test]
    #[serial]
    fn test_config_from_env() {
        std::env::set_var("MODE", "station_wait");
        std::env::set_var("TIME_STEP", "15");
        std::env::set_var("MAXIMUM_WAIT_TIME", "900");
        std::env::set_var("DEMAND_COUNT", "250");
        std::env::set_var("VERTIPORT_FILE", "test_vertiports.csv");
        std::env::set_var("LOG_CONFIG", "config_file.yaml");

        let config = Config::try_from_env();
        assert!(config.is_ok());
        let config = config.unwrap();

        assert_eq!(config.mode, String::from("station_wait"));
        assert_eq!(config.time_step, 15);
        assert_eq!(config.maximum_wait_time, 900);
        assert_eq!(config.demand_count, 250);
        assert_eq!(config.vertiport_file, String::from("test_vertiports.csv"));
        assert_eq!(config.log_config, String::from("config_file.yaml"));
        // untouched fields keep their defaults
        assert_eq!(config.holding_duration, 600);

        std::env::remove_var("MODE");
        std::env::remove_var("TIME_STEP");
        std::env::remove_var("MAXIMUM_WAIT_TIME");
        std::env::remove_var("DEMAND_COUNT");
        std::env::remove_var("VERTIPORT_FILE");
        std::env::remove_var("LOG_CONFIG");
    }
}
