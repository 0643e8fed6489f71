//! Random demand-schedule generator.
//!
//! Draws uniform origin/destination pairs and start times over the demand
//! window. Seeded, so a run can be replayed exactly.

use chrono::{LocalResult, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::Rng;

use crate::sim::demand::{Demand, DemandId};
use crate::sim::vertiport::Vertiport;
use crate::sim::Epoch;

/// Error type for generator errors
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GeneratorError {
    /// Demands need distinct endpoints, so one vertiport is not enough
    NotEnoughVertiports,
}

impl std::fmt::Display for GeneratorError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            GeneratorError::NotEnoughVertiports => {
                write!(f, "Demand generation needs at least two vertiports")
            }
        }
    }
}

impl std::error::Error for GeneratorError {}

fn epoch_to_rfc3339(epoch: Epoch) -> String {
    match Utc.timestamp_opt(epoch, 0) {
        LocalResult::Single(datetime) => datetime.to_rfc3339(),
        _ => epoch.to_string(),
    }
}

/// Generates `demand_count` demands with start times in `[start_time,
/// end_time)`, sorted ascending by start time, with ids continuing the
/// world's running counter.
pub fn generate_demands(
    vertiports: &[Vertiport],
    demand_count: u32,
    start_time: Epoch,
    end_time: Epoch,
    first_id: DemandId,
    rng: &mut StdRng,
) -> Result<Vec<Demand>, GeneratorError> {
    if vertiports.len() < 2 {
        return Err(GeneratorError::NotEnoughVertiports);
    }

    let duration = end_time - start_time;
    let mut drafts = Vec::with_capacity(demand_count as usize);
    for _ in 0..demand_count {
        let origin_index = rng.gen_range(0..vertiports.len());
        let mut destination_index = rng.gen_range(0..vertiports.len());
        while destination_index == origin_index {
            destination_index = rng.gen_range(0..vertiports.len());
        }
        let demand_time = start_time + (rng.gen::<f64>() * duration as f64) as Epoch;
        drafts.push((
            demand_time,
            vertiports[origin_index].id,
            vertiports[destination_index].id,
        ));
    }
    // stable sort keeps generation order among equal start times
    drafts.sort_by_key(|draft| draft.0);

    let demands = drafts
        .into_iter()
        .enumerate()
        .map(|(offset, (demand_time, origin_id, destination_id))| {
            Demand::new(
                first_id + offset as DemandId,
                origin_id,
                destination_id,
                demand_time,
            )
        })
        .collect::<Vec<Demand>>();

    sim_info!(
        "(generate_demands) {} demands between {} and {}.",
        demands.len(),
        epoch_to_rfc3339(start_time),
        epoch_to_rfc3339(end_time)
    );
    Ok(demands)
}
