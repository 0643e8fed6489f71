//! Simulation binary entry point: configure from the environment, build the
//! world, run, report.

use dotenv::dotenv;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;
use std::str::FromStr;

use vertisim::sim::policy::DepartureMode;
use vertisim::sim::{run_simulation, SimParams, World};
use vertisim::{generator, init_logger, loader, metrics, Config};

/// The demand window closes one hour before the simulation does, so late
/// departures can still complete their flights.
const POST_DEMAND_WINDOW_SECONDS: i64 = 3600;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    let config = Config::try_from_env()?;
    init_logger(&config);
    log::info!("(main) vertisim starting with config: {:?}", config);

    let mode = DepartureMode::from_str(&config.mode)?;
    let aircraft_info = loader::load_aircraft_info(Path::new(&config.aircraft_info_file))?;
    let station_time = loader::load_station_times(Path::new(&config.station_time_file))?;
    let (vertiports, next_id) =
        loader::load_vertiports(Path::new(&config.vertiport_file), &aircraft_info)?;

    let mut rng = StdRng::seed_from_u64(config.demand_seed);
    let demands = generator::generate_demands(
        &vertiports,
        config.demand_count,
        config.start_time,
        config.end_time,
        next_id,
        &mut rng,
    )?;
    let world = World::new(vertiports, demands)?;

    let params = SimParams {
        mode,
        time_step: config.time_step,
        landing_occupation_time: config.landing_occupation_time,
        takeoff_occupation_time: config.takeoff_occupation_time,
        battery_swap_time: config.battery_swap_time,
        board_time_per_passenger: config.board_time_per_passenger,
        deboard_time_per_passenger: config.deboard_time_per_passenger,
        holding_duration: config.holding_duration,
        maximum_wait_time: config.maximum_wait_time,
        start_time: config.start_time,
        end_time: config.end_time + POST_DEMAND_WINDOW_SECONDS,
        aircraft_info,
        station_time,
    };

    let output = run_simulation(world, &params)?;
    if !output.messages.is_empty() {
        for message in &output.messages {
            log::error!(
                "(main) simulation aborted at epoch {}: {}",
                output.last_epoch,
                message
            );
        }
        std::process::exit(1);
    }

    let report = metrics::report(&output.world)?;
    log::info!("(main) finished at epoch {}.", output.last_epoch);
    println!("{report}");
    Ok(())
}
