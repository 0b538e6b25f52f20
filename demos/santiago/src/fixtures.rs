//! Embedded route and stop data for central Santiago.
//!
//! The polyline runs south-west from Parque Almagro toward the default
//! destination near Avenida Matta.  Stop candidates are unordered and include
//! a near-duplicate pair and one stop nowhere near the route, so extraction
//! has something to do.

use std::io::Cursor;

use anyhow::Result;

use busim_core::GeoPoint;
use busim_route::{StopCandidate, load_candidates_reader, load_polyline_reader};

const ROUTE_CSV: &str = "\
lat,lon\n\
-33.4579,-70.6495\n\
-33.4590,-70.6502\n\
-33.4601,-70.6515\n\
-33.4610,-70.6528\n\
-33.4618,-70.6540\n\
-33.4624,-70.6550\n\
";

const STOPS_CSV: &str = "\
name,lat,lon\n\
Santa Isabel,-33.4605,-70.6521\n\
Parque Almagro,-33.4591,-70.6504\n\
Santa Isabel Poniente,-33.4607,-70.6524\n\
Diez de Julio,-33.4617,-70.6537\n\
Plaza Italia,-33.4372,-70.6343\n\
";

pub fn route() -> Result<Vec<GeoPoint>> {
    Ok(load_polyline_reader(Cursor::new(ROUTE_CSV))?)
}

pub fn stop_candidates() -> Result<Vec<StopCandidate>> {
    Ok(load_candidates_reader(Cursor::new(STOPS_CSV))?)
}
