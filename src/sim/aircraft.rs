//! Aircraft state and per-flight schedule bookkeeping.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::demand::DemandId;
use super::vertiport::{PadId, VertiportId};
use super::Epoch;

/// Unique id of an aircraft within the world.
pub type AircraftId = u32;

/// Key into the aircraft-info table describing a vehicle type.
pub type AircraftTypeId = u32;

/// Performance parameters of one vehicle type.
#[derive(Debug, Copy, Clone, PartialEq, Deserialize, Serialize)]
pub struct AircraftInfo {
    /// Total speed during the climb phase (knots)
    pub climb_speed_kt: f64,
    /// Rate of altitude gain during climb (ft/min)
    pub climb_rate_fpm: f64,
    /// Cruise altitude above ground (ft)
    pub cruise_altitude_ft: f64,
    /// Cruise speed (knots)
    pub cruise_speed_kt: f64,
    /// Total speed during the descent phase (knots)
    pub descent_speed_kt: f64,
    /// Rate of altitude loss during descent (ft/min)
    pub descent_rate_fpm: f64,
    /// Passenger seats
    pub capacity: u32,
}

/// Vehicle type lookup table, keyed by [`AircraftTypeId`]
pub type AircraftInfoTable = HashMap<AircraftTypeId, AircraftInfo>;

/// Phases an aircraft moves through during one flight cycle
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PhaseKind {
    Takeoff,
    Climb,
    Cruise,
    Holding,
    Landing,
    Turnaround,
}

impl std::fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            PhaseKind::Takeoff => write!(f, "takeoff"),
            PhaseKind::Climb => write!(f, "climb"),
            PhaseKind::Cruise => write!(f, "cruise"),
            PhaseKind::Holding => write!(f, "holding"),
            PhaseKind::Landing => write!(f, "landing"),
            PhaseKind::Turnaround => write!(f, "turnaround"),
        }
    }
}

/// One phase of a flight cycle.
///
/// `t0`/`tf` are absolute epochs; they carry fractional seconds because climb
/// and cruise durations come out of the kinematic formulas as reals.
/// `distance_nm` is 0 for the non-flying phases.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ScheduleEntry {
    pub t0: f64,
    pub tf: f64,
    pub kind: PhaseKind,
    pub distance_nm: f64,
}

/// Aircraft operating state
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AircraftStatus {
    /// Parked with no commitment
    Ready,
    /// Parked, committed to a destination with at least one demand aboard
    Occupied,
    Takeoff,
    Climb,
    Cruise,
    /// Circling near the destination awaiting a pad
    Holding,
    Landing,
    /// Post-landing deboard and battery swap
    Turnaround,
}

impl AircraftStatus {
    /// Whether this state consumes a stand at its vertiport
    pub fn occupies_stand(&self) -> bool {
        matches!(
            self,
            AircraftStatus::Ready
                | AircraftStatus::Occupied
                | AircraftStatus::Turnaround
                | AircraftStatus::Landing
        )
    }

    /// Whether this state accrues time on the vertiport
    pub fn on_station(&self) -> bool {
        matches!(
            self,
            AircraftStatus::Ready | AircraftStatus::Occupied | AircraftStatus::Turnaround
        )
    }

    /// Whether passengers may board in this state
    pub fn boardable(&self) -> bool {
        matches!(self, AircraftStatus::Ready | AircraftStatus::Occupied)
    }
}

impl std::fmt::Display for AircraftStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            AircraftStatus::Ready => write!(f, "ready"),
            AircraftStatus::Occupied => write!(f, "occupied"),
            AircraftStatus::Takeoff => write!(f, "takeoff"),
            AircraftStatus::Climb => write!(f, "climb"),
            AircraftStatus::Cruise => write!(f, "cruise"),
            AircraftStatus::Holding => write!(f, "holding"),
            AircraftStatus::Landing => write!(f, "landing"),
            AircraftStatus::Turnaround => write!(f, "turnaround"),
        }
    }
}

/// One vehicle of the fleet.
///
/// An aircraft always resides in exactly one vertiport's aircraft list; while
/// airborne or holding it stays listed at its origin and is moved to the
/// destination list when the landing is committed.
#[derive(Debug, Clone, PartialEq)]
pub struct Aircraft {
    pub id: AircraftId,
    pub db_id: AircraftTypeId,
    /// Seats, cached from the info table at load time
    pub capacity: u32,
    pub origin_id: Option<VertiportId>,
    pub destination_id: Option<VertiportId>,
    pub status: AircraftStatus,
    /// Phase entries of the current flight cycle, append-only, monotone in t0
    pub schedule: Vec<ScheduleEntry>,
    /// Ids of the demands on board
    pub demands: Vec<DemandId>,
    pub pad_id: Option<PadId>,
    /// Cumulative flight hours over the whole run
    pub flight_hours: f64,
    /// Sticky flag, set once the aircraft overstays its holding slot
    pub holding_violation: bool,
    /// Seconds since becoming ready/occupied at the current vertiport
    pub time_on_vertiport: i64,
    /// Seconds of boarding still outstanding
    pub boarding_time: i64,
}

impl Aircraft {
    pub fn new(id: AircraftId, db_id: AircraftTypeId, capacity: u32) -> Self {
        Aircraft {
            id,
            db_id,
            capacity,
            origin_id: None,
            destination_id: None,
            status: AircraftStatus::Ready,
            schedule: Vec::new(),
            demands: Vec::new(),
            pad_id: None,
            flight_hours: 0.0,
            holding_violation: false,
            time_on_vertiport: 0,
            boarding_time: 0,
        }
    }

    /// First schedule entry of the given phase in the current cycle
    pub fn schedule_entry(&self, kind: PhaseKind) -> Option<&ScheduleEntry> {
        self.schedule.iter().find(|entry| entry.kind == kind)
    }

    /// Mutable variant of [`Aircraft::schedule_entry`]
    pub fn schedule_entry_mut(&mut self, kind: PhaseKind) -> Option<&mut ScheduleEntry> {
        self.schedule.iter_mut().find(|entry| entry.kind == kind)
    }

    /// Whether the phase of the given kind has run its course
    pub fn phase_elapsed(&self, kind: PhaseKind, current_epoch: Epoch) -> bool {
        match self.schedule_entry(kind) {
            Some(entry) => current_epoch as f64 >= entry.tf,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule_fixture() -> Vec<ScheduleEntry> {
        vec![
            ScheduleEntry {
                t0: 0.0,
                tf: 120.0,
                kind: PhaseKind::Takeoff,
                distance_nm: 0.0,
            },
            ScheduleEntry {
                t0: 120.0,
                tf: 210.0,
                kind: PhaseKind::Climb,
                distance_nm: 2.8,
            },
            ScheduleEntry {
                t0: 210.0,
                tf: 341.2,
                kind: PhaseKind::Cruise,
                distance_nm: 4.4,
            },
        ]
    }

    #[test]
    fn ut_schedule_entry_lookup() {
        let mut aircraft = Aircraft::new(1, 1, 4);
        aircraft.schedule = schedule_fixture();

        assert_eq!(
            aircraft.schedule_entry(PhaseKind::Climb).map(|e| e.tf),
            Some(210.0)
        );
        assert!(aircraft.schedule_entry(PhaseKind::Landing).is_none());

        if let Some(entry) = aircraft.schedule_entry_mut(PhaseKind::Cruise) {
            entry.tf = 400.0;
        }
        assert_eq!(
            aircraft.schedule_entry(PhaseKind::Cruise).map(|e| e.tf),
            Some(400.0)
        );
    }

    #[test]
    fn ut_phase_elapsed_uses_tf() {
        let mut aircraft = Aircraft::new(1, 1, 4);
        aircraft.schedule = schedule_fixture();

        assert!(!aircraft.phase_elapsed(PhaseKind::Cruise, 330));
        assert!(aircraft.phase_elapsed(PhaseKind::Cruise, 360));
        // no entry, never elapsed
        assert!(!aircraft.phase_elapsed(PhaseKind::Holding, 10_000));
    }

    #[test]
    fn ut_status_stand_accounting() {
        assert!(AircraftStatus::Ready.occupies_stand());
        assert!(AircraftStatus::Landing.occupies_stand());
        assert!(AircraftStatus::Turnaround.occupies_stand());
        assert!(!AircraftStatus::Holding.occupies_stand());
        assert!(!AircraftStatus::Cruise.occupies_stand());

        assert!(AircraftStatus::Turnaround.on_station());
        assert!(!AircraftStatus::Landing.on_station());

        assert!(AircraftStatus::Occupied.boardable());
        assert!(!AircraftStatus::Takeoff.boardable());
    }
}
