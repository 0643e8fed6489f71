//! One step of simulated time: demand dispatch, then every vertiport's
//! aircraft through its state machine.
//!
//! Mutations are strictly sequential and observe the iteration order demands,
//! then vertiports in input order, then aircraft in insertion order. A pad
//! released earlier in a tick is visible as ready to aircraft stepped later
//! in the same tick.

use super::aircraft::{AircraftId, AircraftStatus, AircraftTypeId, PhaseKind, ScheduleEntry};
use super::demand::{DemandId, DemandStatus};
use super::geometry;
use super::policy;
use super::vertiport::{self, PadId, PadStatus, VertiportId, ARRIVAL_RATE_PERIOD_SECONDS};
use super::{Epoch, SimParams, SimulationMessage, World};

/// Fraction of the tick's aircraft census that may carry the holding
/// violation flag before the run is declared infeasible
const HOLDING_VIOLATION_RATIO: f64 = 0.1;

/// Error type for structural failures inside a tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// An id points at no vertiport
    UnknownVertiport(VertiportId),
    /// An id points at no demand
    UnknownDemand(DemandId),
    /// An aircraft's db_id resolves to no vehicle type
    UnknownAircraftType(AircraftTypeId),
    /// A pad id points at no pad of the vertiport
    UnknownPad(VertiportId, PadId),
    /// The aircraft should hold a pad in its current state but doesn't
    MissingPad(AircraftId),
    /// The aircraft lacks the schedule entry its state requires
    MissingPhase(AircraftId, PhaseKind),
    /// An airborne aircraft has no destination
    MissingDestination(AircraftId),
    /// The station-time table has no curve for the vertiport's residual
    /// capacity
    StationTimeCurve(VertiportId),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            EngineError::UnknownVertiport(id) => write!(f, "Unknown vertiport {}", id),
            EngineError::UnknownDemand(id) => write!(f, "Unknown demand {}", id),
            EngineError::UnknownAircraftType(id) => write!(f, "Unknown aircraft type {}", id),
            EngineError::UnknownPad(vertiport, pad) => {
                write!(f, "Unknown pad {} at vertiport {}", pad, vertiport)
            }
            EngineError::MissingPad(aircraft) => {
                write!(f, "Aircraft {} holds no pad", aircraft)
            }
            EngineError::MissingPhase(aircraft, kind) => {
                write!(f, "Aircraft {} has no {} entry", aircraft, kind)
            }
            EngineError::MissingDestination(aircraft) => {
                write!(f, "Aircraft {} is airborne with no destination", aircraft)
            }
            EngineError::StationTimeCurve(vertiport) => write!(
                f,
                "No max-station-time curve fits vertiport {}",
                vertiport
            ),
        }
    }
}

impl std::error::Error for EngineError {}

/// Runs one tick. Returns the fatal messages raised during it; a non-empty
/// list makes the caller abort after this tick.
pub(crate) fn tick(
    world: &mut World,
    params: &SimParams,
    current_epoch: Epoch,
) -> Result<Vec<SimulationMessage>, EngineError> {
    dispatch_demands(world, params, current_epoch)?;

    let mut aircraft_census: usize = 0;
    let mut holding_violations: usize = 0;
    let mut super_holding_violation = false;

    for vi in 0..world.vertiports.len() {
        let vertiport = &world.vertiports[vi];
        let occupied = vertiport.occupied_capacity();
        let residual = vertiport.capacity as f64 - occupied as f64;
        let arrival_rate =
            vertiport.arrival_rate(params.start_time, current_epoch, ARRIVAL_RATE_PERIOD_SECONDS);
        let max_station_time = if arrival_rate > residual {
            vertiport::max_station_time(&params.station_time, vertiport, arrival_rate)
                .ok_or(EngineError::StationTimeCurve(vertiport.id))?
        } else {
            f64::INFINITY
        };
        aircraft_census += vertiport.aircraft.len();

        let mut ai = 0;
        while ai < world.vertiports[vi].aircraft.len() {
            {
                let aircraft = &mut world.vertiports[vi].aircraft[ai];
                if aircraft.boarding_time != 0 {
                    aircraft.boarding_time -= params.time_step;
                }
                if aircraft.holding_violation {
                    holding_violations += 1;
                }
                if aircraft.status.on_station() {
                    aircraft.time_on_vertiport += 1;
                }
            }
            let moved = step_aircraft(
                world,
                vi,
                ai,
                params,
                current_epoch,
                max_station_time,
                &mut super_holding_violation,
            )?;
            if !moved {
                ai += 1;
            }
        }
    }

    let mut messages = Vec::new();
    if holding_violations as f64 >= HOLDING_VIOLATION_RATIO * aircraft_census as f64 {
        sim_error!(
            "(tick) {} of {} aircraft are in holding violation at epoch {}.",
            holding_violations,
            aircraft_census,
            current_epoch
        );
        messages.push(SimulationMessage::TooManyHoldingViolations);
    }
    if super_holding_violation {
        sim_error!("(tick) super-holding violation at epoch {}.", current_epoch);
        messages.push(SimulationMessage::SuperHoldingViolation);
    }
    Ok(messages)
}

/// Matches scheduled demands to aircraft at their origin vertiport.
fn dispatch_demands(
    world: &mut World,
    params: &SimParams,
    current_epoch: Epoch,
) -> Result<(), EngineError> {
    for di in 0..world.demands.len() {
        if world.demands[di].status == DemandStatus::Scheduled {
            let timed_out = params.mode.uses_wait_timeout()
                && world.demands[di].delayed_at.flight_delay > params.maximum_wait_time;
            if timed_out {
                let demand = &mut world.demands[di];
                demand.status = DemandStatus::Unsuccessful;
                sim_info!(
                    "(dispatch_demands) demand {} gave up after {} s.",
                    demand.id,
                    demand.delayed_at.flight_delay
                );
            } else if current_epoch > world.demands[di].start_time {
                let (demand_id, origin_id, destination_id) = {
                    let demand = &world.demands[di];
                    (demand.id, demand.origin_id, demand.destination_id)
                };
                let vi = world
                    .vertiport_offset(origin_id)
                    .ok_or(EngineError::UnknownVertiport(origin_id))?;

                let vertiport = &mut world.vertiports[vi];
                let mut carrier = None;

                // Pass A: pool into an aircraft already committed to the same
                // destination.
                for aircraft in vertiport.aircraft.iter_mut() {
                    if aircraft.destination_id == Some(destination_id)
                        && (aircraft.demands.len() as u32) < aircraft.capacity
                        && aircraft.status.boardable()
                    {
                        aircraft.demands.push(demand_id);
                        aircraft.boarding_time += params.board_time_per_passenger;
                        carrier = Some(aircraft.id);
                        break;
                    }
                }

                // Pass B: claim the first idle aircraft and commit it to this
                // city pair.
                if carrier.is_none() {
                    for aircraft in vertiport.aircraft.iter_mut() {
                        if aircraft.status == AircraftStatus::Ready {
                            aircraft.origin_id = Some(origin_id);
                            aircraft.destination_id = Some(destination_id);
                            aircraft.demands.push(demand_id);
                            aircraft.status = AircraftStatus::Occupied;
                            aircraft.boarding_time += params.board_time_per_passenger;
                            carrier = Some(aircraft.id);
                            break;
                        }
                    }
                }

                let demand = &mut world.demands[di];
                match carrier {
                    Some(aircraft_id) => {
                        demand.status = DemandStatus::InAircraft;
                        demand.carrier_id = Some(aircraft_id);
                    }
                    None => demand.delayed_at.finding_aircraft += 1,
                }
            }
        }

        let demand = &mut world.demands[di];
        if matches!(
            demand.status,
            DemandStatus::Scheduled | DemandStatus::InAircraft
        ) {
            demand.delayed_at.flight_delay = (current_epoch - demand.start_time).max(0);
        }
    }
    Ok(())
}

/// Advances one aircraft through its state machine. Returns true when the
/// aircraft was moved out of `vertiports[vi].aircraft` (landing committed at
/// its destination), so the caller must not advance its index.
fn step_aircraft(
    world: &mut World,
    vi: usize,
    ai: usize,
    params: &SimParams,
    current_epoch: Epoch,
    max_station_time: f64,
    super_holding_violation: &mut bool,
) -> Result<bool, EngineError> {
    let status = world.vertiports[vi].aircraft[ai].status;
    match status {
        AircraftStatus::Ready | AircraftStatus::Occupied => {
            let max_flight_delay = max_flight_delay_aboard(world, vi, ai)?;
            let leave = policy::should_depart(
                params.mode,
                &world.vertiports[vi].aircraft[ai],
                max_flight_delay,
                params.maximum_wait_time,
                max_station_time,
            );
            if leave {
                match world.vertiports[vi].find_ready_pad() {
                    Some(pad_id) => depart(world, vi, ai, pad_id, params, current_epoch)?,
                    None => {
                        // stuck on the ramp; the wait lands on every passenger
                        for demand_id in world.vertiports[vi].aircraft[ai].demands.clone() {
                            let offset = world
                                .demand_offset(demand_id)
                                .ok_or(EngineError::UnknownDemand(demand_id))?;
                            world.demands[offset].delayed_at.before_takeoff += 1;
                        }
                    }
                }
            }
            Ok(false)
        }

        AircraftStatus::Takeoff => {
            world.vertiports[vi].aircraft[ai].time_on_vertiport = 0;
            let takeoff = phase_entry(world, vi, ai, PhaseKind::Takeoff)?;
            if current_epoch as f64 >= takeoff.tf {
                let aircraft_id = world.vertiports[vi].aircraft[ai].id;
                let pad_id = world.vertiports[vi].aircraft[ai]
                    .pad_id
                    .ok_or(EngineError::MissingPad(aircraft_id))?;
                release_pad(world, vi, pad_id)?;
                let aircraft = &mut world.vertiports[vi].aircraft[ai];
                aircraft.pad_id = None;
                aircraft.status = AircraftStatus::Climb;
                sim_debug!(
                    "(step_aircraft) aircraft {} off pad {} and climbing at {}.",
                    aircraft_id,
                    pad_id,
                    current_epoch
                );
            }
            Ok(false)
        }

        AircraftStatus::Climb => {
            let climb = phase_entry(world, vi, ai, PhaseKind::Climb)?;
            if current_epoch as f64 >= climb.tf {
                world.vertiports[vi].aircraft[ai].status = AircraftStatus::Cruise;
            }
            Ok(false)
        }

        AircraftStatus::Cruise => {
            let cruise = phase_entry(world, vi, ai, PhaseKind::Cruise)?;
            if (current_epoch as f64) < cruise.tf {
                return Ok(false);
            }
            let aircraft_id = world.vertiports[vi].aircraft[ai].id;
            let destination_id = world.vertiports[vi].aircraft[ai]
                .destination_id
                .ok_or(EngineError::MissingDestination(aircraft_id))?;
            let di = world
                .vertiport_offset(destination_id)
                .ok_or(EngineError::UnknownVertiport(destination_id))?;

            world.vertiports[di].record_arrival(current_epoch, aircraft_id);

            let pad = world.vertiports[di].find_ready_pad();
            let admitted = world.vertiports[di].may_admit(aircraft_id);
            match pad {
                Some(pad_id) if admitted => {
                    commit_landing(world, vi, ai, di, pad_id, params, current_epoch)?;
                    Ok(true)
                }
                _ => {
                    world.vertiports[di].holding_aircraft.push_back(aircraft_id);
                    let aircraft = &mut world.vertiports[vi].aircraft[ai];
                    aircraft.schedule.push(ScheduleEntry {
                        t0: current_epoch as f64,
                        tf: (current_epoch + params.holding_duration) as f64,
                        kind: PhaseKind::Holding,
                        distance_nm: 0.0,
                    });
                    aircraft.status = AircraftStatus::Holding;
                    sim_info!(
                        "(step_aircraft) aircraft {} holding for vertiport {} at {}.",
                        aircraft_id,
                        destination_id,
                        current_epoch
                    );
                    Ok(false)
                }
            }
        }

        AircraftStatus::Holding => {
            let holding = phase_entry(world, vi, ai, PhaseKind::Holding)?;
            if current_epoch as f64 >= holding.tf {
                world.vertiports[vi].aircraft[ai].holding_violation = true;
                if current_epoch as f64 - holding.tf > 2.0 * (holding.tf - holding.t0) {
                    *super_holding_violation = true;
                }
            }
            // passengers keep paying for the hold
            for demand_id in world.vertiports[vi].aircraft[ai].demands.clone() {
                let offset = world
                    .demand_offset(demand_id)
                    .ok_or(EngineError::UnknownDemand(demand_id))?;
                world.demands[offset].delayed_at.before_landing += 1;
            }

            let aircraft_id = world.vertiports[vi].aircraft[ai].id;
            let destination_id = world.vertiports[vi].aircraft[ai]
                .destination_id
                .ok_or(EngineError::MissingDestination(aircraft_id))?;
            let di = world
                .vertiport_offset(destination_id)
                .ok_or(EngineError::UnknownVertiport(destination_id))?;

            let admitted = world.vertiports[di].may_admit(aircraft_id);
            let pad = world.vertiports[di].find_ready_pad();
            if let (Some(pad_id), true) = (pad, admitted) {
                world.vertiports[di]
                    .holding_aircraft
                    .retain(|id| *id != aircraft_id);
                // truncate the hold at the admission epoch
                if let Some(entry) =
                    world.vertiports[vi].aircraft[ai].schedule_entry_mut(PhaseKind::Holding)
                {
                    entry.tf = current_epoch as f64;
                }
                commit_landing(world, vi, ai, di, pad_id, params, current_epoch)?;
                return Ok(true);
            }
            Ok(false)
        }

        AircraftStatus::Landing => {
            let landing = phase_entry(world, vi, ai, PhaseKind::Landing)?;
            if (current_epoch as f64) < landing.tf {
                return Ok(false);
            }
            let aircraft_id = world.vertiports[vi].aircraft[ai].id;
            let destination_id = world.vertiports[vi].aircraft[ai]
                .destination_id
                .ok_or(EngineError::MissingDestination(aircraft_id))?;
            let di = world
                .vertiport_offset(destination_id)
                .ok_or(EngineError::UnknownVertiport(destination_id))?;
            let pad_id = world.vertiports[vi].aircraft[ai]
                .pad_id
                .ok_or(EngineError::MissingPad(aircraft_id))?;
            release_pad(world, di, pad_id)?;

            let passengers = world.vertiports[vi].aircraft[ai].demands.len() as i64;
            let turnaround_time = params
                .battery_swap_time
                .max(params.deboard_time_per_passenger * passengers);
            let aircraft = &mut world.vertiports[vi].aircraft[ai];
            aircraft.pad_id = None;
            aircraft.status = AircraftStatus::Turnaround;
            aircraft.schedule.push(ScheduleEntry {
                t0: current_epoch as f64,
                tf: (current_epoch + turnaround_time) as f64,
                kind: PhaseKind::Turnaround,
                distance_nm: 0.0,
            });
            set_onboard_demand_status(world, vi, ai, DemandStatus::Satisfied)?;
            sim_info!(
                "(step_aircraft) aircraft {} landed at vertiport {} with {} passengers.",
                aircraft_id,
                destination_id,
                passengers
            );
            Ok(false)
        }

        AircraftStatus::Turnaround => {
            let turnaround = phase_entry(world, vi, ai, PhaseKind::Turnaround)?;
            if current_epoch as f64 >= turnaround.tf {
                let takeoff = phase_entry(world, vi, ai, PhaseKind::Takeoff)?;
                let aircraft = &mut world.vertiports[vi].aircraft[ai];
                aircraft.flight_hours += (turnaround.t0 - takeoff.t0) / 3600.0;
                aircraft.status = AircraftStatus::Ready;
                aircraft.schedule.clear();
                aircraft.demands.clear();
                aircraft.origin_id = None;
                aircraft.destination_id = None;
            }
            Ok(false)
        }
    }
}

/// Sends an aircraft off: resolves an empty destination, builds the flight
/// schedule, seizes the pad and marks the passengers airborne.
fn depart(
    world: &mut World,
    vi: usize,
    ai: usize,
    pad_id: PadId,
    params: &SimParams,
    current_epoch: Epoch,
) -> Result<(), EngineError> {
    let aircraft_id = world.vertiports[vi].aircraft[ai].id;

    // empty-leg redirect: an aircraft released with no destination heads for
    // the vertiport with the most free stands
    if world.vertiports[vi].aircraft[ai].destination_id.is_none() {
        let origin_id = world.vertiports[vi].id;
        match world.most_available_vertiport(origin_id) {
            Some(destination_id) => {
                let aircraft = &mut world.vertiports[vi].aircraft[ai];
                aircraft.origin_id = Some(origin_id);
                aircraft.destination_id = Some(destination_id);
                sim_info!(
                    "(depart) redirecting empty aircraft {} to vertiport {}.",
                    aircraft_id,
                    destination_id
                );
            }
            None => {
                sim_warn!(
                    "(depart) no vertiport has free stands for empty aircraft {}, staying put.",
                    aircraft_id
                );
                return Ok(());
            }
        }
    }

    let (db_id, destination_id) = {
        let aircraft = &world.vertiports[vi].aircraft[ai];
        (
            aircraft.db_id,
            aircraft
                .destination_id
                .ok_or(EngineError::MissingDestination(aircraft_id))?,
        )
    };
    let info = params
        .aircraft_info
        .get(&db_id)
        .ok_or(EngineError::UnknownAircraftType(db_id))?;
    let di = world
        .vertiport_offset(destination_id)
        .ok_or(EngineError::UnknownVertiport(destination_id))?;

    let origin_position = world.vertiports[vi].position;
    let destination_position = world.vertiports[di].position;
    let entries = geometry::departure_schedule(
        info,
        &origin_position,
        &destination_position,
        current_epoch as f64,
        params.takeoff_occupation_time,
    );

    {
        let aircraft = &mut world.vertiports[vi].aircraft[ai];
        aircraft.schedule.extend(entries);
        aircraft.pad_id = Some(pad_id);
        aircraft.status = AircraftStatus::Takeoff;
    }
    let vertiport_id = world.vertiports[vi].id;
    let pad = world.vertiports[vi]
        .pad_mut(pad_id)
        .ok_or(EngineError::UnknownPad(vertiport_id, pad_id))?;
    pad.status = PadStatus::Takeoff;
    pad.occupied_aircraft = Some(aircraft_id);

    set_onboard_demand_status(world, vi, ai, DemandStatus::Airborne)?;
    sim_info!(
        "(depart) aircraft {} departing vertiport {} for {} at {}.",
        aircraft_id,
        vertiport_id,
        destination_id,
        current_epoch
    );
    Ok(())
}

/// Commits a landing: builds the landing entry, seizes the destination pad
/// and moves the aircraft from its origin's list to the destination's.
fn commit_landing(
    world: &mut World,
    vi: usize,
    ai: usize,
    di: usize,
    pad_id: PadId,
    params: &SimParams,
    current_epoch: Epoch,
) -> Result<(), EngineError> {
    let aircraft_id = world.vertiports[vi].aircraft[ai].id;
    let landing = geometry::landing_schedule(
        &world.vertiports[vi].aircraft[ai].schedule,
        current_epoch,
        params.landing_occupation_time,
    )
    .map_err(|_| EngineError::MissingPhase(aircraft_id, PhaseKind::Cruise))?;

    {
        let aircraft = &mut world.vertiports[vi].aircraft[ai];
        aircraft.schedule.push(landing);
        aircraft.pad_id = Some(pad_id);
        aircraft.status = AircraftStatus::Landing;
    }
    let destination_id = world.vertiports[di].id;
    let pad = world.vertiports[di]
        .pad_mut(pad_id)
        .ok_or(EngineError::UnknownPad(destination_id, pad_id))?;
    pad.status = PadStatus::Landing;
    pad.occupied_aircraft = Some(aircraft_id);

    let aircraft = world.vertiports[vi].aircraft.remove(ai);
    world.vertiports[di].aircraft.push(aircraft);
    Ok(())
}

/// Largest accumulated flight delay among the demands on board, 0 when empty
fn max_flight_delay_aboard(world: &World, vi: usize, ai: usize) -> Result<i64, EngineError> {
    let mut max_delay = 0;
    for demand_id in &world.vertiports[vi].aircraft[ai].demands {
        let offset = world
            .demand_offset(*demand_id)
            .ok_or(EngineError::UnknownDemand(*demand_id))?;
        max_delay = max_delay.max(world.demands[offset].delayed_at.flight_delay);
    }
    Ok(max_delay)
}

fn set_onboard_demand_status(
    world: &mut World,
    vi: usize,
    ai: usize,
    status: DemandStatus,
) -> Result<(), EngineError> {
    for demand_id in world.vertiports[vi].aircraft[ai].demands.clone() {
        let offset = world
            .demand_offset(demand_id)
            .ok_or(EngineError::UnknownDemand(demand_id))?;
        world.demands[offset].status = status;
    }
    Ok(())
}

fn release_pad(world: &mut World, vi: usize, pad_id: PadId) -> Result<(), EngineError> {
    let vertiport_id = world.vertiports[vi].id;
    let pad = world.vertiports[vi]
        .pad_mut(pad_id)
        .ok_or(EngineError::UnknownPad(vertiport_id, pad_id))?;
    pad.status = PadStatus::Ready;
    pad.occupied_aircraft = None;
    Ok(())
}

fn phase_entry(
    world: &World,
    vi: usize,
    ai: usize,
    kind: PhaseKind,
) -> Result<ScheduleEntry, EngineError> {
    let aircraft = &world.vertiports[vi].aircraft[ai];
    aircraft
        .schedule_entry(kind)
        .copied()
        .ok_or(EngineError::MissingPhase(aircraft.id, kind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::aircraft::{Aircraft, AircraftInfo, AircraftInfoTable};
    use crate::sim::demand::Demand;
    use crate::sim::policy::DepartureMode;
    use crate::sim::vertiport::{Pad, Position, StationTimeTable, Vertiport};

    fn info_table() -> AircraftInfoTable {
        let mut table = AircraftInfoTable::new();
        table.insert(
            1,
            AircraftInfo {
                climb_speed_kt: 113.0,
                climb_rate_fpm: 1000.0,
                cruise_altitude_ft: 1500.0,
                cruise_speed_kt: 120.0,
                descent_speed_kt: 113.0,
                descent_rate_fpm: 1000.0,
                capacity: 4,
            },
        );
        table
    }

    fn params(mode: DepartureMode) -> SimParams {
        SimParams {
            mode,
            time_step: 30,
            landing_occupation_time: 180,
            takeoff_occupation_time: 120,
            battery_swap_time: 300,
            board_time_per_passenger: 60,
            deboard_time_per_passenger: 60,
            holding_duration: 600,
            maximum_wait_time: 1200,
            start_time: 0,
            end_time: 7200,
            aircraft_info: info_table(),
            station_time: StationTimeTable::new(),
        }
    }

    fn two_port_world(aircraft_at_origin: usize) -> World {
        let mut origin = Vertiport::new(1, "Origin", Position::new(0.0, 0.0), 4);
        origin.pads.push(Pad::new(10, "origin pad"));
        for i in 0..aircraft_at_origin {
            origin.aircraft.push(Aircraft::new(100 + i as u32, 1, 4));
        }
        let mut destination = Vertiport::new(2, "Destination", Position::new(10.0, 0.0), 4);
        destination.pads.push(Pad::new(11, "destination pad"));

        let demands = vec![Demand::new(500, 1, 2, 0)];
        World::new(vec![origin, destination], demands).unwrap()
    }

    #[test]
    fn ut_dispatch_waits_for_start_time() {
        let mut world = two_port_world(1);
        let params = params(DepartureMode::Capacity);

        dispatch_demands(&mut world, &params, 0).unwrap();
        assert_eq!(world.demands[0].status, DemandStatus::Scheduled);
        assert_eq!(world.demands[0].delayed_at.finding_aircraft, 0);

        dispatch_demands(&mut world, &params, 30).unwrap();
        assert_eq!(world.demands[0].status, DemandStatus::InAircraft);
        assert_eq!(world.demands[0].carrier_id, Some(100));
    }

    #[test]
    fn ut_dispatch_pass_b_claims_ready_aircraft() {
        let mut world = two_port_world(1);
        let params = params(DepartureMode::Capacity);

        dispatch_demands(&mut world, &params, 30).unwrap();
        let aircraft = &world.vertiports[0].aircraft[0];
        assert_eq!(aircraft.status, AircraftStatus::Occupied);
        assert_eq!(aircraft.origin_id, Some(1));
        assert_eq!(aircraft.destination_id, Some(2));
        assert_eq!(aircraft.demands, vec![500]);
        assert_eq!(aircraft.boarding_time, 60);
    }

    #[test]
    fn ut_dispatch_pass_a_prefers_destination_match() {
        let mut origin = Vertiport::new(1, "Origin", Position::new(0.0, 0.0), 4);
        origin.pads.push(Pad::new(10, "pad"));
        origin.aircraft.push(Aircraft::new(100, 1, 4));
        // the second aircraft is already committed to the demand's destination
        let mut committed = Aircraft::new(101, 1, 4);
        committed.status = AircraftStatus::Occupied;
        committed.origin_id = Some(1);
        committed.destination_id = Some(2);
        committed.demands = vec![900];
        origin.aircraft.push(committed);
        let destination = Vertiport::new(2, "Destination", Position::new(10.0, 0.0), 4);

        let mut boarded = Demand::new(900, 1, 2, 0);
        boarded.status = DemandStatus::InAircraft;
        boarded.carrier_id = Some(101);
        let demands = vec![Demand::new(500, 1, 2, 0), boarded];
        let mut world = World::new(vec![origin, destination], demands).unwrap();

        let params = params(DepartureMode::Capacity);
        dispatch_demands(&mut world, &params, 30).unwrap();

        // pooled with the committed aircraft, not the idle one listed first
        assert_eq!(world.demands[0].carrier_id, Some(101));
        assert_eq!(world.vertiports[0].aircraft[0].status, AircraftStatus::Ready);
        assert_eq!(world.vertiports[0].aircraft[1].demands, vec![900, 500]);
    }

    #[test]
    fn ut_dispatch_counts_unserved_ticks() {
        let mut world = two_port_world(0);
        let params = params(DepartureMode::Capacity);

        dispatch_demands(&mut world, &params, 30).unwrap();
        dispatch_demands(&mut world, &params, 60).unwrap();
        let demand = &world.demands[0];
        assert_eq!(demand.status, DemandStatus::Scheduled);
        assert_eq!(demand.delayed_at.finding_aircraft, 2);
        assert_eq!(demand.delayed_at.flight_delay, 60);
    }

    #[test]
    fn ut_dispatch_wait_timeout_is_terminal() {
        let mut world = two_port_world(1);
        let mut params = params(DepartureMode::Wait);
        params.maximum_wait_time = 100;
        world.demands[0].delayed_at.flight_delay = 101;

        dispatch_demands(&mut world, &params, 200).unwrap();
        assert_eq!(world.demands[0].status, DemandStatus::Unsuccessful);
        // the idle aircraft was not claimed on the way out
        assert_eq!(world.vertiports[0].aircraft[0].status, AircraftStatus::Ready);
        // frozen once unsuccessful
        assert_eq!(world.demands[0].delayed_at.flight_delay, 101);
    }

    #[test]
    fn ut_departure_without_pad_charges_passengers() {
        let mut world = two_port_world(1);
        world.vertiports[0].pads[0].status = PadStatus::Landing;
        let params = params(DepartureMode::Wait);

        // board the demand, then let its delay trip the wait flag
        dispatch_demands(&mut world, &params, 30).unwrap();
        world.vertiports[0].aircraft[0].boarding_time = 0;
        world.demands[0].delayed_at.flight_delay = params.maximum_wait_time;

        let mut super_holding = false;
        let moved =
            step_aircraft(&mut world, 0, 0, &params, 1200, f64::INFINITY, &mut super_holding)
                .unwrap();
        assert!(!moved);
        assert_eq!(world.vertiports[0].aircraft[0].status, AircraftStatus::Occupied);
        assert_eq!(world.demands[0].delayed_at.before_takeoff, 1);
    }

    #[test]
    fn ut_empty_leg_redirect_picks_emptiest_vertiport() {
        let mut origin = Vertiport::new(1, "Origin", Position::new(0.0, 0.0), 4);
        origin.pads.push(Pad::new(10, "pad"));
        let mut aircraft = Aircraft::new(100, 1, 4);
        aircraft.status = AircraftStatus::Occupied;
        aircraft.time_on_vertiport = 10_000;
        origin.aircraft.push(aircraft);

        // two candidates, the second has more free stands
        let mut near = Vertiport::new(2, "Near", Position::new(5.0, 0.0), 2);
        near.pads.push(Pad::new(11, "pad"));
        let mut far = Vertiport::new(3, "Far", Position::new(10.0, 0.0), 6);
        far.pads.push(Pad::new(12, "pad"));

        let mut world = World::new(vec![origin, near, far], vec![]).unwrap();
        let params = params(DepartureMode::CapacityStation);

        let mut super_holding = false;
        step_aircraft(&mut world, 0, 0, &params, 600, 60.0, &mut super_holding).unwrap();

        let aircraft = &world.vertiports[0].aircraft[0];
        assert_eq!(aircraft.status, AircraftStatus::Takeoff);
        assert_eq!(aircraft.origin_id, Some(1));
        assert_eq!(aircraft.destination_id, Some(3));
    }

    #[test]
    fn ut_takeoff_releases_pad_for_later_aircraft_same_tick() {
        let mut world = two_port_world(1);
        let params = params(DepartureMode::Capacity);

        // aircraft mid-takeoff on the only pad
        {
            let vertiport = &mut world.vertiports[0];
            vertiport.pads[0].status = PadStatus::Takeoff;
            vertiport.pads[0].occupied_aircraft = Some(100);
            let aircraft = &mut vertiport.aircraft[0];
            aircraft.status = AircraftStatus::Takeoff;
            aircraft.pad_id = Some(10);
            aircraft.origin_id = Some(1);
            aircraft.destination_id = Some(2);
            aircraft.schedule = vec![ScheduleEntry {
                t0: 0.0,
                tf: 120.0,
                kind: PhaseKind::Takeoff,
                distance_nm: 0.0,
            }];
        }

        let mut super_holding = false;
        step_aircraft(&mut world, 0, 0, &params, 120, f64::INFINITY, &mut super_holding).unwrap();

        let vertiport = &world.vertiports[0];
        assert_eq!(vertiport.aircraft[0].status, AircraftStatus::Climb);
        assert_eq!(vertiport.aircraft[0].pad_id, None);
        assert_eq!(vertiport.pads[0].status, PadStatus::Ready);
        assert_eq!(vertiport.pads[0].occupied_aircraft, None);
        assert_eq!(vertiport.find_ready_pad(), Some(10));
    }
}
