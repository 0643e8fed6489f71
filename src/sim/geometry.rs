//! Planar flight geometry and the per-phase schedule builder.
//!
//! Positions are two-dimensional, in nautical miles. Descent is assumed to
//! mirror climb, so the cruise segment is the leg distance minus twice the
//! climb distance.

use super::aircraft::{AircraftInfo, PhaseKind, ScheduleEntry};
use super::vertiport::Position;
use super::Epoch;

/// Converts a vertical rate in ft/min to knots. The odd number of digits is
/// load-bearing: changing it breaks bit-identical replay of recorded runs.
pub const FPM_TO_KNOTS: f64 = 0.00987473;

/// Error type for schedule-builder errors
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GeometryError {
    /// The aircraft has no cruise entry to anchor the landing to
    MissingCruiseEntry,
}

impl std::fmt::Display for GeometryError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            GeometryError::MissingCruiseEntry => write!(f, "No cruise entry in schedule"),
        }
    }
}

impl std::error::Error for GeometryError {}

/// Euclidean distance between two positions in nautical miles
pub fn distance_nm(a: &Position, b: &Position) -> f64 {
    let dx = a.x_nm.into_inner() - b.x_nm.into_inner();
    let dy = a.y_nm.into_inner() - b.y_nm.into_inner();
    (dx * dx + dy * dy).sqrt()
}

/// Builds the takeoff, climb and cruise entries for a departure anchored at
/// `start_time`, chaining `t0`/`tf` phase by phase.
pub fn departure_schedule(
    info: &AircraftInfo,
    origin: &Position,
    destination: &Position,
    start_time: f64,
    takeoff_occupation_time: i64,
) -> Vec<ScheduleEntry> {
    let mut entries = Vec::with_capacity(3);
    let mut clock = start_time;

    entries.push(ScheduleEntry {
        t0: clock,
        tf: clock + takeoff_occupation_time as f64,
        kind: PhaseKind::Takeoff,
        distance_nm: 0.0,
    });
    clock += takeoff_occupation_time as f64;

    let climb_duration = (info.cruise_altitude_ft / info.climb_rate_fpm) * 60.0;
    let climb_ground_speed =
        (info.climb_speed_kt.powi(2) - (info.climb_rate_fpm * FPM_TO_KNOTS).powi(2)).sqrt();
    let climb_distance = (climb_duration / 3600.0) * climb_ground_speed;
    entries.push(ScheduleEntry {
        t0: clock,
        tf: clock + climb_duration,
        kind: PhaseKind::Climb,
        distance_nm: climb_distance,
    });
    clock += climb_duration;

    let total_distance = distance_nm(origin, destination);
    let mut cruise_distance = total_distance - 2.0 * climb_distance;
    if cruise_distance < 0.0 {
        // climb and descent overlap on a leg this short; the cruise segment
        // degenerates to nothing
        sim_warn!(
            "(departure_schedule) leg of {:.3} nm is shorter than climb plus descent ({:.3} nm), cruise clamped to zero.",
            total_distance,
            2.0 * climb_distance
        );
        cruise_distance = 0.0;
    }
    let cruise_duration = (cruise_distance / info.cruise_speed_kt) * 3600.0;
    entries.push(ScheduleEntry {
        t0: clock,
        tf: clock + cruise_duration,
        kind: PhaseKind::Cruise,
        distance_nm: cruise_distance,
    });

    entries
}

/// Builds the landing entry for an arriving aircraft. A direct arrival is
/// anchored at the end of its cruise; an aircraft coming out of holding is
/// anchored at the current epoch.
pub fn landing_schedule(
    schedule: &[ScheduleEntry],
    current_epoch: Epoch,
    landing_occupation_time: i64,
) -> Result<ScheduleEntry, GeometryError> {
    let start_time = match schedule.iter().find(|e| e.kind == PhaseKind::Holding) {
        Some(_) => current_epoch as f64,
        None => {
            schedule
                .iter()
                .find(|e| e.kind == PhaseKind::Cruise)
                .ok_or(GeometryError::MissingCruiseEntry)?
                .tf
        }
    };

    Ok(ScheduleEntry {
        t0: start_time,
        tf: start_time + landing_occupation_time as f64,
        kind: PhaseKind::Landing,
        distance_nm: 0.0,
    })
}

/// Piecewise-linear interpolation over `(x, y)` points sorted ascending by
/// `x`, clamping to the first/last `y` outside the domain. `None` on an empty
/// curve.
pub fn interp(x: f64, points: &[(f64, f64)]) -> Option<f64> {
    let (first, rest) = points.split_first()?;
    if x <= first.0 {
        return Some(first.1);
    }
    let mut left = *first;
    for right in rest {
        if x <= right.0 {
            let span = right.0 - left.0;
            if span <= 0.0 {
                return Some(right.1);
            }
            return Some(left.1 + (right.1 - left.1) * (x - left.0) / span);
        }
        left = *right;
    }
    Some(left.1)
}
