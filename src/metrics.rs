//! End-of-run reducers: satisfied-demand ratio, operating cost, delays,
//! flight hours and flights flown.

use crate::sim::demand::DemandStatus;
use crate::sim::geometry;
use crate::sim::World;

/// Flight-hour sample points of the operating-cost curves
const FLIGHT_HOUR_POINTS: [f64; 27] = [
    0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0,
    10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0, 17.0, 18.0,
];

/// Cost per flight hour for a 4-seat aircraft, by annual utilisation
const COST_PER_HOUR_4_PAX: [f64; 27] = [
    3799.0, 1960.9, 1348.1, 1041.7, 857.9, 735.4, 647.9, 582.2, 531.1, 490.3, 306.4, 245.1,
    214.5, 196.1, 183.9, 175.1, 168.6, 163.5, 159.4, 156.0, 153.2, 150.9, 148.9, 147.15, 145.6,
    144.2, 143.0,
];

/// Cost per flight hour for an 8-seat aircraft
const COST_PER_HOUR_8_PAX: [f64; 27] = [
    7381.0, 3781.0, 2581.0, 1981.0, 1622.0, 1382.0, 1210.0, 1082.0, 982.0, 902.0, 542.0, 422.1,
    362.0, 326.0, 302.0, 285.0, 272.0, 262.0, 254.0, 247.0, 242.0, 237.0, 233.0, 230.0, 227.0,
    224.0, 222.0,
];

/// Cost per flight hour for a 12-seat aircraft
const COST_PER_HOUR_12_PAX: [f64; 27] = [
    10811.0, 5516.0, 3751.0, 2868.0, 2339.0, 1986.0, 1734.0, 1544.0, 1397.0, 1280.0, 750.0,
    574.1, 486.0, 433.0, 397.0, 372.0, 353.0, 339.0, 327.0, 317.0, 309.0, 302.0, 297.0, 291.0,
    287.0, 283.0, 280.0,
];

/// Error type for metrics errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricsError {
    /// Cost curves exist for 4, 8 and 12 seats only
    UnsupportedCapacity(u32),
    /// The fleet mixes seat counts, so no single cost curve applies
    MixedFleet,
    /// No demands were simulated
    NoDemands,
}

impl std::fmt::Display for MetricsError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            MetricsError::UnsupportedCapacity(capacity) => {
                write!(f, "No cost curve for {}-seat aircraft", capacity)
            }
            MetricsError::MixedFleet => write!(f, "Fleet mixes seat counts"),
            MetricsError::NoDemands => write!(f, "No demands to report on"),
        }
    }
}

impl std::error::Error for MetricsError {}

/// Operating cost of the run: in total, per satisfied demand and per aircraft
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CostSummary {
    pub total: f64,
    pub per_satisfied_demand: f64,
    pub per_aircraft: f64,
}

/// The headline numbers of one finished run
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationReport {
    pub total_demands: usize,
    pub satisfied_demands: usize,
    pub satisfied_percent: f64,
    /// Mean delay of satisfied demands, in hours
    pub mean_flight_delay_hours: Option<f64>,
    pub mean_flight_hours: Option<f64>,
    pub flight_count: usize,
    pub passengers_per_flight: Option<f64>,
    pub cost: CostSummary,
}

impl std::fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "satisfied {}/{} ({:.1}%), mean delay {} h, mean flight hours {}, \
             {} flights, {} passengers/flight, cost {:.0} ({:.0}/demand, {:.0}/aircraft)",
            self.satisfied_demands,
            self.total_demands,
            self.satisfied_percent,
            self.mean_flight_delay_hours
                .map_or_else(|| String::from("n/a"), |v| format!("{:.3}", v)),
            self.mean_flight_hours
                .map_or_else(|| String::from("n/a"), |v| format!("{:.3}", v)),
            self.flight_count,
            self.passengers_per_flight
                .map_or_else(|| String::from("n/a"), |v| format!("{:.2}", v)),
            self.cost.total,
            self.cost.per_satisfied_demand,
            self.cost.per_aircraft,
        )
    }
}

/// Number of demands that ended satisfied
pub fn satisfied_demands(world: &World) -> usize {
    world
        .demands
        .iter()
        .filter(|demand| demand.status == DemandStatus::Satisfied)
        .count()
}

/// Share of satisfied demands, in percent
pub fn satisfied_percent(world: &World) -> Result<f64, MetricsError> {
    if world.demands.is_empty() {
        return Err(MetricsError::NoDemands);
    }
    Ok(satisfied_demands(world) as f64 / world.demands.len() as f64 * 100.0)
}

/// Mean flight delay over satisfied demands, in hours; `None` when nothing
/// was satisfied
pub fn mean_flight_delay_hours(world: &World) -> Option<f64> {
    let delays: Vec<i64> = world
        .demands
        .iter()
        .filter(|demand| demand.status == DemandStatus::Satisfied)
        .map(|demand| demand.delayed_at.flight_delay)
        .collect();
    if delays.is_empty() {
        return None;
    }
    Some(delays.iter().sum::<i64>() as f64 / delays.len() as f64 / 3600.0)
}

/// Mean accumulated flight hours per aircraft; `None` for an empty fleet
pub fn mean_flight_hours(world: &World) -> Option<f64> {
    let mut hours = 0.0;
    let mut count = 0usize;
    for vertiport in &world.vertiports {
        for aircraft in &vertiport.aircraft {
            hours += aircraft.flight_hours;
            count += 1;
        }
    }
    if count == 0 {
        return None;
    }
    Some(hours / count as f64)
}

/// Number of completed inbound flights across all vertiports
pub fn flight_count(world: &World) -> usize {
    world
        .vertiports
        .iter()
        .map(|vertiport| vertiport.arriving_aircraft.len())
        .sum()
}

fn cost_curve(capacity: u32) -> Result<&'static [f64; 27], MetricsError> {
    match capacity {
        4 => Ok(&COST_PER_HOUR_4_PAX),
        8 => Ok(&COST_PER_HOUR_8_PAX),
        12 => Ok(&COST_PER_HOUR_12_PAX),
        other => Err(MetricsError::UnsupportedCapacity(other)),
    }
}

/// Total operating cost from the per-seat-count cost curves, interpolated at
/// each aircraft's accumulated flight hours.
pub fn operating_cost(world: &World) -> Result<CostSummary, MetricsError> {
    let mut fleet_capacity: Option<u32> = None;
    let mut aircraft_count = 0usize;
    for vertiport in &world.vertiports {
        for aircraft in &vertiport.aircraft {
            aircraft_count += 1;
            match fleet_capacity {
                None => fleet_capacity = Some(aircraft.capacity),
                Some(capacity) if capacity != aircraft.capacity => {
                    return Err(MetricsError::MixedFleet)
                }
                Some(_) => {}
            }
        }
    }

    let mut total = 0.0;
    if let Some(capacity) = fleet_capacity {
        let curve = cost_curve(capacity)?;
        let points: Vec<(f64, f64)> = FLIGHT_HOUR_POINTS
            .iter()
            .copied()
            .zip(curve.iter().copied())
            .collect();
        for vertiport in &world.vertiports {
            for aircraft in &vertiport.aircraft {
                // the curve starts at 0.1 h; interp clamps below that
                if let Some(rate) = geometry::interp(aircraft.flight_hours, &points) {
                    total += aircraft.flight_hours * rate;
                }
            }
        }
    }

    let satisfied = satisfied_demands(world);
    if satisfied == 0 || aircraft_count == 0 {
        return Ok(CostSummary {
            total,
            per_satisfied_demand: 0.0,
            per_aircraft: 0.0,
        });
    }
    Ok(CostSummary {
        total,
        per_satisfied_demand: total / satisfied as f64,
        per_aircraft: total / aircraft_count as f64,
    })
}

/// Builds the full report for a finished run
pub fn report(world: &World) -> Result<SimulationReport, MetricsError> {
    let satisfied = satisfied_demands(world);
    let flights = flight_count(world);
    Ok(SimulationReport {
        total_demands: world.demands.len(),
        satisfied_demands: satisfied,
        satisfied_percent: satisfied_percent(world)?,
        mean_flight_delay_hours: mean_flight_delay_hours(world),
        mean_flight_hours: mean_flight_hours(world),
        flight_count: flights,
        passengers_per_flight: (flights > 0).then(|| satisfied as f64 / flights as f64),
        cost: operating_cost(world)?,
    })
}
