//! Passenger demands and their delay accounting.

use super::aircraft::AircraftId;
use super::vertiport::VertiportId;
use super::Epoch;

/// Unique id of a demand within the world.
pub type DemandId = u32;

/// Demand lifecycle state
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DemandStatus {
    /// Waiting at the origin for an aircraft
    Scheduled,
    /// Boarded, aircraft still on the ground
    InAircraft,
    Airborne,
    /// Landed at the destination
    Satisfied,
    /// Gave up waiting (wait policies only)
    Unsuccessful,
}

impl std::fmt::Display for DemandStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            DemandStatus::Scheduled => write!(f, "scheduled"),
            DemandStatus::InAircraft => write!(f, "in aircraft"),
            DemandStatus::Airborne => write!(f, "airborne"),
            DemandStatus::Satisfied => write!(f, "satisfied"),
            DemandStatus::Unsuccessful => write!(f, "unsuccessful"),
        }
    }
}

/// Where the ticks went while this demand was stalled.
///
/// The first four fields count ticks spent in the named stall condition;
/// `flight_delay` tracks wall seconds since `start_time` for as long as the
/// demand has not landed.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct DelayedAt {
    pub finding_aircraft: u32,
    pub before_takeoff: u32,
    pub before_turnaround: u32,
    pub before_landing: u32,
    pub flight_delay: i64,
}

/// One transport request between two vertiports.
#[derive(Debug, Clone, PartialEq)]
pub struct Demand {
    pub id: DemandId,
    pub origin_id: VertiportId,
    pub destination_id: VertiportId,
    pub start_time: Epoch,
    pub status: DemandStatus,
    /// Aircraft carrying this demand, once matched
    pub carrier_id: Option<AircraftId>,
    pub delayed_at: DelayedAt,
}

impl Demand {
    pub fn new(
        id: DemandId,
        origin_id: VertiportId,
        destination_id: VertiportId,
        start_time: Epoch,
    ) -> Self {
        Demand {
            id,
            origin_id,
            destination_id,
            start_time,
            status: DemandStatus::Scheduled,
            carrier_id: None,
            delayed_at: DelayedAt::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ut_new_demand_defaults() {
        let demand = Demand::new(7, 1, 2, 3600);
        assert_eq!(demand.status, DemandStatus::Scheduled);
        assert_eq!(demand.carrier_id, None);
        assert_eq!(demand.delayed_at, DelayedAt::default());
        assert_eq!(demand.delayed_at.flight_delay, 0);
    }
}
