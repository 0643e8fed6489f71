//! Departure policies: when may a parked aircraft leave.

use std::str::FromStr;

use super::aircraft::Aircraft;

/// Error type for policy parsing errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    /// Not one of the four departure modes
    UnknownMode(String),
}

impl std::fmt::Display for PolicyError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            PolicyError::UnknownMode(mode) => write!(f, "Unknown departure mode '{}'", mode),
        }
    }
}

impl std::error::Error for PolicyError {}

/// The rule set deciding when a non-full aircraft leaves
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DepartureMode {
    /// Leave only when every seat is taken
    Capacity,
    /// Full seats, or overstayed the congestion-adaptive station time
    CapacityStation,
    /// Full seats, or a passenger has waited long enough
    Wait,
    /// Any of the three triggers
    StationWait,
}

impl DepartureMode {
    /// Whether demands under this mode give up after `maximum_wait_time`
    pub fn uses_wait_timeout(&self) -> bool {
        matches!(self, DepartureMode::Wait | DepartureMode::StationWait)
    }
}

impl FromStr for DepartureMode {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "capacity" => Ok(DepartureMode::Capacity),
            "capacity_station" => Ok(DepartureMode::CapacityStation),
            "wait" => Ok(DepartureMode::Wait),
            "station_wait" => Ok(DepartureMode::StationWait),
            other => Err(PolicyError::UnknownMode(other.to_string())),
        }
    }
}

impl std::fmt::Display for DepartureMode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            DepartureMode::Capacity => write!(f, "capacity"),
            DepartureMode::CapacityStation => write!(f, "capacity_station"),
            DepartureMode::Wait => write!(f, "wait"),
            DepartureMode::StationWait => write!(f, "station_wait"),
        }
    }
}

/// Decides whether an aircraft should leave its vertiport now.
///
/// Boarding must have finished and the aircraft must be parked; beyond that
/// each mode combines the seats-full, passenger-wait and station-time
/// triggers.
pub fn should_depart(
    mode: DepartureMode,
    aircraft: &Aircraft,
    max_flight_delay: i64,
    maximum_wait_time: i64,
    max_station_time: f64,
) -> bool {
    if aircraft.boarding_time != 0 {
        return false;
    }
    if !aircraft.status.boardable() {
        return false;
    }

    let capacity_flag = aircraft.demands.len() as u32 == aircraft.capacity;
    let wait_flag = max_flight_delay >= maximum_wait_time;
    let station_time_flag = aircraft.time_on_vertiport as f64 > max_station_time;

    match mode {
        DepartureMode::Capacity => capacity_flag,
        DepartureMode::CapacityStation => capacity_flag || station_time_flag,
        DepartureMode::Wait => capacity_flag || wait_flag,
        DepartureMode::StationWait => capacity_flag || station_time_flag || wait_flag,
    }
}
