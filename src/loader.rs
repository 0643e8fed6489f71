//! Loaders that materialise the initial world from files: the vertiport
//! inventory (CSV), the aircraft-info table (JSON) and the max-station-time
//! table (JSON).

use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::sim::aircraft::{Aircraft, AircraftInfoTable, AircraftTypeId};
use crate::sim::vertiport::{Pad, Position, StationTimeTable, Vertiport};

/// Error type for loader errors
#[derive(Debug)]
pub enum LoaderError {
    Io(std::io::Error),
    Csv(csv::Error),
    Json(serde_json::Error),
    /// A continuation row appeared before any vertiport row
    OrphanRow(u64),
    /// A vertiport row is missing position or capacity
    IncompleteVertiport(String),
    /// An aircraft references a type absent from the info table
    UnknownAircraftType(AircraftTypeId),
    /// The inventory file declared no vertiport at all
    NoVertiports,
    /// A station-time curve has no points
    EmptyCurve(u32),
}

impl std::fmt::Display for LoaderError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            LoaderError::Io(e) => write!(f, "I/O error: {}", e),
            LoaderError::Csv(e) => write!(f, "CSV error: {}", e),
            LoaderError::Json(e) => write!(f, "JSON error: {}", e),
            LoaderError::OrphanRow(line) => {
                write!(f, "Row {} continues no vertiport", line)
            }
            LoaderError::IncompleteVertiport(name) => {
                write!(f, "Vertiport '{}' lacks position or capacity", name)
            }
            LoaderError::UnknownAircraftType(db_id) => {
                write!(f, "Aircraft type {} not in the info table", db_id)
            }
            LoaderError::NoVertiports => write!(f, "Inventory file declares no vertiport"),
            LoaderError::EmptyCurve(capacity) => {
                write!(f, "Station-time curve for capacity {} is empty", capacity)
            }
        }
    }
}

impl std::error::Error for LoaderError {}

impl From<std::io::Error> for LoaderError {
    fn from(e: std::io::Error) -> Self {
        LoaderError::Io(e)
    }
}

impl From<csv::Error> for LoaderError {
    fn from(e: csv::Error) -> Self {
        LoaderError::Csv(e)
    }
}

impl From<serde_json::Error> for LoaderError {
    fn from(e: serde_json::Error) -> Self {
        LoaderError::Json(e)
    }
}

/// One line of the vertiport inventory CSV. A row with a name starts a new
/// vertiport; rows without one add further pads and aircraft to the vertiport
/// most recently started.
#[derive(Debug, Deserialize)]
struct InventoryRow {
    name: Option<String>,
    x_nm: Option<f64>,
    y_nm: Option<f64>,
    capacity: Option<u32>,
    pad_name: Option<String>,
    aircraft_count: Option<u32>,
    aircraft_db_id: Option<AircraftTypeId>,
}

/// Reads the vertiport inventory, assigning ids from a running counter in
/// file order (vertiports, pads and aircraft share the counter). Returns the
/// vertiports and the next unused id, for the demand builder to continue
/// from.
pub fn load_vertiports(
    path: &Path,
    aircraft_info: &AircraftInfoTable,
) -> Result<(Vec<Vertiport>, u32), LoaderError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut vertiports: Vec<Vertiport> = Vec::new();
    let mut next_id: u32 = 1;

    for (row_number, record) in reader.deserialize().enumerate() {
        let row: InventoryRow = record?;

        if let Some(name) = row.name.as_deref().filter(|n| !n.trim().is_empty()) {
            let (Some(x_nm), Some(y_nm), Some(capacity)) = (row.x_nm, row.y_nm, row.capacity)
            else {
                return Err(LoaderError::IncompleteVertiport(name.to_string()));
            };
            vertiports.push(Vertiport::new(
                next_id,
                name,
                Position::new(x_nm, y_nm),
                capacity,
            ));
            next_id += 1;
        } else if vertiports.is_empty() {
            return Err(LoaderError::OrphanRow(row_number as u64 + 2));
        }

        let vertiport = match vertiports.last_mut() {
            Some(v) => v,
            None => return Err(LoaderError::NoVertiports),
        };

        if let Some(pad_name) = row.pad_name.as_deref().filter(|n| !n.trim().is_empty()) {
            vertiport.pads.push(Pad::new(next_id, pad_name));
            next_id += 1;
        }

        if let (Some(count), Some(db_id)) = (row.aircraft_count, row.aircraft_db_id) {
            let info = aircraft_info
                .get(&db_id)
                .ok_or(LoaderError::UnknownAircraftType(db_id))?;
            for _ in 0..count {
                vertiport
                    .aircraft
                    .push(Aircraft::new(next_id, db_id, info.capacity));
                next_id += 1;
            }
        }
    }

    if vertiports.is_empty() {
        return Err(LoaderError::NoVertiports);
    }

    sim_info!(
        "(load_vertiports) loaded {} vertiports from {}.",
        vertiports.len(),
        path.display()
    );
    Ok((vertiports, next_id))
}

/// Reads the vehicle-type table
pub fn load_aircraft_info(path: &Path) -> Result<AircraftInfoTable, LoaderError> {
    let reader = BufReader::new(File::open(path)?);
    let table: AircraftInfoTable = serde_json::from_reader(reader)?;
    Ok(table)
}

/// Reads the max-station-time table and sorts each curve ascending by rate
pub fn load_station_times(path: &Path) -> Result<StationTimeTable, LoaderError> {
    let reader = BufReader::new(File::open(path)?);
    let mut table: HashMap<u32, Vec<(f64, f64)>> = serde_json::from_reader(reader)?;
    for (capacity, curve) in table.iter_mut() {
        if curve.is_empty() {
            return Err(LoaderError::EmptyCurve(*capacity));
        }
        curve.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
    }
    Ok(table)
}
