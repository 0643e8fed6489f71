//! Vertiport resources: stands, pads, the holding queue and the
//! congestion-adaptive station-time cap.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

use super::aircraft::{Aircraft, AircraftId};
use super::geometry;
use super::Epoch;

/// Unique id of a vertiport within the world.
pub type VertiportId = u32;

/// Unique id of a pad within the world.
pub type PadId = u32;

/// Window over which the per-vertiport arrival rate is measured
pub const ARRIVAL_RATE_PERIOD_SECONDS: i64 = 3600;

/// Planar position in nautical miles
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Position {
    pub x_nm: OrderedFloat<f64>,
    pub y_nm: OrderedFloat<f64>,
}

impl Position {
    pub fn new(x_nm: f64, y_nm: f64) -> Self {
        Position {
            x_nm: OrderedFloat(x_nm),
            y_nm: OrderedFloat(y_nm),
        }
    }
}

/// Pad occupation state; one pad serves both takeoffs and landings
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PadStatus {
    Ready,
    Takeoff,
    Landing,
}

impl std::fmt::Display for PadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            PadStatus::Ready => write!(f, "ready"),
            PadStatus::Takeoff => write!(f, "takeoff"),
            PadStatus::Landing => write!(f, "landing"),
        }
    }
}

/// A shared takeoff/landing surface, exclusive to one aircraft while busy
#[derive(Debug, Clone, PartialEq)]
pub struct Pad {
    pub id: PadId,
    pub name: String,
    pub status: PadStatus,
    pub occupied_aircraft: Option<AircraftId>,
}

impl Pad {
    pub fn new(id: PadId, name: impl Into<String>) -> Self {
        Pad {
            id,
            name: name.into(),
            status: PadStatus::Ready,
            occupied_aircraft: None,
        }
    }
}

/// A completed inbound flight, recorded when the cruise phase ends
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Arrival {
    pub epoch: Epoch,
    pub aircraft_id: AircraftId,
}

/// Max-station-time lookup: `considered_capacity` to an `(arrival_rate,
/// max_seconds)` curve, sorted ascending by rate.
pub type StationTimeTable = HashMap<u32, Vec<(f64, f64)>>;

/// A terminal with bounded stand capacity and a small number of pads.
#[derive(Debug, Clone, PartialEq)]
pub struct Vertiport {
    pub id: VertiportId,
    pub name: String,
    pub position: Position,
    /// Stand capacity
    pub capacity: u32,
    pub pads: Vec<Pad>,
    /// Aircraft residing here (including those airborne towards somewhere else)
    pub aircraft: Vec<Aircraft>,
    /// Aircraft circling to land here, in arrival order; only the head may be
    /// admitted to a free pad
    pub holding_aircraft: VecDeque<AircraftId>,
    /// Every inbound flight that reached this vertiport
    pub arriving_aircraft: Vec<Arrival>,
    /// Arrival epochs, kept separately for the rate computation
    pub arriving_epochs: Vec<Epoch>,
}

impl Vertiport {
    pub fn new(id: VertiportId, name: impl Into<String>, position: Position, capacity: u32) -> Self {
        Vertiport {
            id,
            name: name.into(),
            position,
            capacity,
            pads: Vec::new(),
            aircraft: Vec::new(),
            holding_aircraft: VecDeque::new(),
            arriving_aircraft: Vec::new(),
            arriving_epochs: Vec::new(),
        }
    }

    /// Number of stands in use. Airborne and holding aircraft do not count.
    pub fn occupied_capacity(&self) -> u32 {
        self.aircraft
            .iter()
            .filter(|a| a.status.occupies_stand())
            .count() as u32
    }

    /// First pad in declared order whose status is ready
    pub fn find_ready_pad(&self) -> Option<PadId> {
        self.pads
            .iter()
            .find(|pad| pad.status == PadStatus::Ready)
            .map(|pad| pad.id)
    }

    pub fn pad_mut(&mut self, pad_id: PadId) -> Option<&mut Pad> {
        self.pads.iter_mut().find(|pad| pad.id == pad_id)
    }

    /// Whether the given aircraft may land here right now: a stand must be
    /// free, and the holding queue is strict FIFO. While anyone is queued,
    /// only the head may land; fresh arrivals fall in behind.
    pub fn may_admit(&self, aircraft_id: AircraftId) -> bool {
        let first_come_first_serve = if self.holding_aircraft.is_empty() {
            true
        } else {
            match self
                .holding_aircraft
                .iter()
                .position(|id| *id == aircraft_id)
            {
                Some(position) => position == 0,
                None => false,
            }
        };
        self.occupied_capacity() < self.capacity && first_come_first_serve
    }

    /// Record an inbound flight at the end of its cruise phase
    pub fn record_arrival(&mut self, epoch: Epoch, aircraft_id: AircraftId) {
        self.arriving_aircraft.push(Arrival { epoch, aircraft_id });
        self.arriving_epochs.push(epoch);
    }

    /// Arrivals per `period` seconds, measured over the window ending at
    /// `current_epoch`. While the run is younger than a full window the count
    /// is scaled up by `period / elapsed`.
    pub fn arrival_rate(&self, start_epoch: Epoch, current_epoch: Epoch, period: i64) -> f64 {
        if current_epoch == start_epoch {
            return 0.0;
        }
        let count = self
            .arriving_epochs
            .iter()
            .filter(|epoch| current_epoch - period < **epoch && **epoch < current_epoch)
            .count() as f64;
        if current_epoch - period < start_epoch {
            (period as f64 / (current_epoch - start_epoch) as f64) * count
        } else {
            count
        }
    }
}

/// Congestion-adaptive cap on `time_on_vertiport`, linearly interpolated from
/// the supplied table at the current arrival rate. Returns `None` when the
/// table has no curve for the vertiport's residual capacity.
pub fn max_station_time(
    table: &StationTimeTable,
    vertiport: &Vertiport,
    arrival_rate_per_hour: f64,
) -> Option<f64> {
    let considered_capacity =
        (vertiport.capacity as i64 - vertiport.occupied_capacity() as i64 + 1) as u32;
    let curve = table.get(&considered_capacity)?;
    geometry::interp(arrival_rate_per_hour, curve)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::aircraft::AircraftStatus;

    fn vertiport_with_aircraft(statuses: &[AircraftStatus]) -> Vertiport {
        let mut vertiport = Vertiport::new(1, "Downtown", Position::new(0.0, 0.0), 4);
        for (i, status) in statuses.iter().enumerate() {
            let mut aircraft = Aircraft::new(100 + i as u32, 1, 4);
            aircraft.status = *status;
            vertiport.aircraft.push(aircraft);
        }
        vertiport
    }

    #[test]
    fn ut_occupied_capacity_counts_ground_states() {
        let vertiport = vertiport_with_aircraft(&[
            AircraftStatus::Ready,
            AircraftStatus::Occupied,
            AircraftStatus::Turnaround,
            AircraftStatus::Landing,
            AircraftStatus::Takeoff,
            AircraftStatus::Climb,
            AircraftStatus::Cruise,
            AircraftStatus::Holding,
        ]);
        assert_eq!(vertiport.occupied_capacity(), 4);
    }

    #[test]
    fn ut_find_ready_pad_in_declared_order() {
        let mut vertiport = Vertiport::new(1, "Downtown", Position::new(0.0, 0.0), 4);
        vertiport.pads.push(Pad::new(10, "north"));
        vertiport.pads.push(Pad::new(11, "south"));
        vertiport.pads[0].status = PadStatus::Takeoff;

        assert_eq!(vertiport.find_ready_pad(), Some(11));

        vertiport.pads[0].status = PadStatus::Ready;
        assert_eq!(vertiport.find_ready_pad(), Some(10));

        vertiport.pads[0].status = PadStatus::Landing;
        vertiport.pads[1].status = PadStatus::Takeoff;
        assert_eq!(vertiport.find_ready_pad(), None);
    }

    #[test]
    fn ut_admission_is_strict_fifo() {
        let mut vertiport = vertiport_with_aircraft(&[AircraftStatus::Ready]);
        // fresh arrival with stands to spare
        assert!(vertiport.may_admit(200));

        vertiport.holding_aircraft.push_back(201);
        vertiport.holding_aircraft.push_back(202);
        // head of the queue may land, second in line may not
        assert!(vertiport.may_admit(201));
        assert!(!vertiport.may_admit(202));
        // a fresh arrival must queue behind the holders
        assert!(!vertiport.may_admit(203));
    }

    #[test]
    fn ut_admission_refused_when_stands_full() {
        let vertiport = vertiport_with_aircraft(&[
            AircraftStatus::Ready,
            AircraftStatus::Ready,
            AircraftStatus::Turnaround,
            AircraftStatus::Landing,
        ]);
        assert_eq!(vertiport.occupied_capacity(), vertiport.capacity);
        assert!(!vertiport.may_admit(200));
    }

    #[test]
    fn ut_arrival_rate_windows() {
        let mut vertiport = Vertiport::new(1, "Downtown", Position::new(0.0, 0.0), 4);
        vertiport.arriving_epochs = vec![100, 200, 3000, 5000];

        // at the start epoch the rate is pinned to zero
        assert_eq!(vertiport.arrival_rate(0, 0, 3600), 0.0);

        // partial window: 3 arrivals in 3500 s, scaled to a full hour
        let rate = vertiport.arrival_rate(0, 3500, 3600);
        assert!((rate - (3600.0 / 3500.0) * 3.0).abs() < 1e-9);

        // full window: only epochs strictly inside (1500, 5100) count
        let rate = vertiport.arrival_rate(0, 5100, 3600);
        assert_eq!(rate, 2.0);

        // window bounds are exclusive on both sides
        let rate = vertiport.arrival_rate(0, 5000, 3600);
        assert_eq!(rate, 1.0);
    }

    #[test]
    fn ut_max_station_time_interpolates() {
        let mut table = StationTimeTable::new();
        table.insert(3, vec![(1.0, 600.0), (3.0, 120.0)]);

        // capacity 4, two stands in use -> considered capacity 3
        let vertiport =
            vertiport_with_aircraft(&[AircraftStatus::Ready, AircraftStatus::Occupied]);

        assert_eq!(max_station_time(&table, &vertiport, 2.0), Some(360.0));
        // clamped on both ends of the curve
        assert_eq!(max_station_time(&table, &vertiport, 0.1), Some(600.0));
        assert_eq!(max_station_time(&table, &vertiport, 9.0), Some(120.0));

        // no curve for this residual capacity
        let empty = Vertiport::new(2, "Uptown", Position::new(1.0, 1.0), 4);
        assert_eq!(max_station_time(&table, &empty, 2.0), None);
    }
}
