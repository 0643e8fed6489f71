//! Core of the vertiport-network simulator: the world state, the tick
//! driver and the outer simulation loop.
//!
//! The clock advances in uniform steps; within a tick every entity is evolved
//! sequentially, so a run is fully determined by its inputs and the input
//! ordering.

#[macro_use]
pub mod macros;
pub mod aircraft;
pub mod demand;
pub mod engine;
pub mod geometry;
pub mod policy;
pub mod vertiport;

use std::collections::HashMap;

use self::aircraft::AircraftInfoTable;
use self::demand::{Demand, DemandId};
pub use self::engine::EngineError;
use self::policy::DepartureMode;
use self::vertiport::{StationTimeTable, Vertiport, VertiportId};

/// Absolute simulation time in integer seconds
pub type Epoch = i64;

/// Scalar parameters and lookup tables of one run. All times are seconds.
#[derive(Debug, Clone)]
pub struct SimParams {
    pub mode: DepartureMode,
    pub time_step: i64,
    pub landing_occupation_time: i64,
    pub takeoff_occupation_time: i64,
    pub battery_swap_time: i64,
    pub board_time_per_passenger: i64,
    pub deboard_time_per_passenger: i64,
    pub holding_duration: i64,
    pub maximum_wait_time: i64,
    pub start_time: Epoch,
    pub end_time: Epoch,
    pub aircraft_info: AircraftInfoTable,
    pub station_time: StationTimeTable,
}

/// Fatal conditions that end a run early
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SimulationMessage {
    /// At least 10% of the aircraft observed in one tick overstayed their
    /// holding slot
    TooManyHoldingViolations,
    /// An aircraft stayed in holding more than twice its allotted duration
    /// beyond the slot's end
    SuperHoldingViolation,
}

impl std::fmt::Display for SimulationMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            SimulationMessage::TooManyHoldingViolations => {
                write!(f, "too much holding violations")
            }
            SimulationMessage::SuperHoldingViolation => write!(f, "Too long holding violation"),
        }
    }
}

/// Error type for malformed world inputs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorldError {
    DuplicateVertiport(VertiportId),
    DuplicateDemand(DemandId),
    /// A demand endpoint resolves to no vertiport
    UnresolvedEndpoint {
        demand: DemandId,
        vertiport: VertiportId,
    },
    /// A demand goes from a vertiport to itself
    DegenerateDemand(DemandId),
}

impl std::fmt::Display for WorldError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            WorldError::DuplicateVertiport(id) => write!(f, "Duplicate vertiport id {}", id),
            WorldError::DuplicateDemand(id) => write!(f, "Duplicate demand id {}", id),
            WorldError::UnresolvedEndpoint { demand, vertiport } => write!(
                f,
                "Demand {} references unknown vertiport {}",
                demand, vertiport
            ),
            WorldError::DegenerateDemand(id) => {
                write!(f, "Demand {} has equal origin and destination", id)
            }
        }
    }
}

impl std::error::Error for WorldError {}

/// The complete mutable state of a run: vertiports (with their pads and
/// aircraft) and the demand list, plus id-to-offset indices so the hot path
/// never scans for entities by id.
#[derive(Debug, Clone, PartialEq)]
pub struct World {
    pub vertiports: Vec<Vertiport>,
    pub demands: Vec<Demand>,
    vertiport_index: HashMap<VertiportId, usize>,
    demand_index: HashMap<DemandId, usize>,
}

impl World {
    /// Builds a world and its indices, validating ids and demand endpoints.
    pub fn new(vertiports: Vec<Vertiport>, demands: Vec<Demand>) -> Result<Self, WorldError> {
        let mut vertiport_index = HashMap::with_capacity(vertiports.len());
        for (offset, vertiport) in vertiports.iter().enumerate() {
            if vertiport_index.insert(vertiport.id, offset).is_some() {
                return Err(WorldError::DuplicateVertiport(vertiport.id));
            }
        }
        let mut demand_index = HashMap::with_capacity(demands.len());
        for (offset, demand) in demands.iter().enumerate() {
            if demand_index.insert(demand.id, offset).is_some() {
                return Err(WorldError::DuplicateDemand(demand.id));
            }
            if demand.origin_id == demand.destination_id {
                return Err(WorldError::DegenerateDemand(demand.id));
            }
            for vertiport_id in [demand.origin_id, demand.destination_id] {
                if !vertiport_index.contains_key(&vertiport_id) {
                    return Err(WorldError::UnresolvedEndpoint {
                        demand: demand.id,
                        vertiport: vertiport_id,
                    });
                }
            }
        }
        Ok(World {
            vertiports,
            demands,
            vertiport_index,
            demand_index,
        })
    }

    /// Offset of a vertiport in `vertiports`
    pub fn vertiport_offset(&self, id: VertiportId) -> Option<usize> {
        self.vertiport_index.get(&id).copied()
    }

    /// Offset of a demand in `demands`
    pub fn demand_offset(&self, id: DemandId) -> Option<usize> {
        self.demand_index.get(&id).copied()
    }

    /// The vertiport with the most free stands, excluding the given one.
    /// Ties keep the first-encountered; vertiports with no free stands never
    /// qualify.
    pub fn most_available_vertiport(&self, exclude: VertiportId) -> Option<VertiportId> {
        let mut best: Option<VertiportId> = None;
        let mut best_empty: i64 = 0;
        for vertiport in &self.vertiports {
            if vertiport.id == exclude {
                continue;
            }
            let empty = vertiport.capacity as i64 - vertiport.occupied_capacity() as i64;
            if empty > best_empty {
                best = Some(vertiport.id);
                best_empty = empty;
            }
        }
        best
    }

    /// Total number of aircraft across all vertiports
    pub fn aircraft_count(&self) -> usize {
        self.vertiports.iter().map(|v| v.aircraft.len()).sum()
    }
}

/// What a finished (or aborted) run hands back to the caller
#[derive(Debug, Clone)]
pub struct SimulationOutput {
    pub world: World,
    /// Non-empty iff the run aborted
    pub messages: Vec<SimulationMessage>,
    /// Clock value at loop exit
    pub last_epoch: Epoch,
}

/// Runs the simulation from `start_time` to `end_time`, aborting after the
/// first tick that raises a fatal message.
pub fn run_simulation(
    mut world: World,
    params: &SimParams,
) -> Result<SimulationOutput, EngineError> {
    sim_info!(
        "(run_simulation) mode {} from {} to {}, {} vertiports, {} aircraft, {} demands.",
        params.mode,
        params.start_time,
        params.end_time,
        world.vertiports.len(),
        world.aircraft_count(),
        world.demands.len()
    );

    let mut current_epoch = params.start_time;
    let mut messages = Vec::new();
    while current_epoch <= params.end_time {
        messages = engine::tick(&mut world, params, current_epoch)?;
        if !messages.is_empty() {
            break;
        }
        current_epoch += params.time_step;
    }

    Ok(SimulationOutput {
        world,
        messages,
        last_epoch: current_epoch,
    })
}

#[cfg(test)]
mod tests {
    use super::vertiport::Position;
    use super::*;
    use crate::sim::aircraft::{Aircraft, AircraftStatus};

    fn vertiport(id: VertiportId, capacity: u32) -> Vertiport {
        Vertiport::new(id, format!("V{id}"), Position::new(id as f64, 0.0), capacity)
    }

    #[test]
    fn ut_world_rejects_duplicate_ids() {
        let result = World::new(vec![vertiport(1, 2), vertiport(1, 2)], vec![]);
        assert_eq!(result.unwrap_err(), WorldError::DuplicateVertiport(1));

        let result = World::new(
            vec![vertiport(1, 2), vertiport(2, 2)],
            vec![Demand::new(5, 1, 2, 0), Demand::new(5, 2, 1, 0)],
        );
        assert_eq!(result.unwrap_err(), WorldError::DuplicateDemand(5));
    }

    #[test]
    fn ut_world_rejects_bad_demand_endpoints() {
        let result = World::new(vec![vertiport(1, 2)], vec![Demand::new(5, 1, 9, 0)]);
        assert_eq!(
            result.unwrap_err(),
            WorldError::UnresolvedEndpoint {
                demand: 5,
                vertiport: 9
            }
        );

        let result = World::new(vec![vertiport(1, 2)], vec![Demand::new(5, 1, 1, 0)]);
        assert_eq!(result.unwrap_err(), WorldError::DegenerateDemand(5));
    }

    #[test]
    fn ut_most_available_vertiport_prefers_empty_stands() {
        let mut a = vertiport(1, 4);
        let mut b = vertiport(2, 4);
        let c = vertiport(3, 6);
        // a is the origin; b has one stand taken
        let mut parked = Aircraft::new(100, 1, 4);
        parked.status = AircraftStatus::Ready;
        b.aircraft.push(parked);
        let mut airborne = Aircraft::new(101, 1, 4);
        airborne.status = AircraftStatus::Cruise;
        a.aircraft.push(airborne);

        let world = World::new(vec![a, b, c], vec![]).unwrap();
        assert_eq!(world.most_available_vertiport(1), Some(3));
        // ties keep the first-encountered
        let world2 = World::new(vec![vertiport(1, 4), vertiport(2, 6), vertiport(3, 6)], vec![])
            .unwrap();
        assert_eq!(world2.most_available_vertiport(1), Some(2));
        // a lone vertiport has no redirect target
        let world3 = World::new(vec![vertiport(1, 4)], vec![]).unwrap();
        assert_eq!(world3.most_available_vertiport(1), None);
    }

    #[test]
    fn ut_messages_render_verbatim() {
        assert_eq!(
            SimulationMessage::TooManyHoldingViolations.to_string(),
            "too much holding violations"
        );
        assert_eq!(
            SimulationMessage::SuperHoldingViolation.to_string(),
            "Too long holding violation"
        );
    }
}
