//! Default "leading edge" view: frame the part of the globe where today's
//! imagery is most complete, given the current UTC hour.
//!
//! At 00:00 UTC the view sits at the far eastern edge
//! (`20.60,-46.55,179.93,53.02`); by 23:00 UTC it has moved to the far western
//! edge (`-179.93,-46.55,-20.60,53.02`).

use foundation::GeoExtent;

/// The only projection where a longitude window makes sense.
pub const GEOGRAPHIC: &str = "geographic";

/// Before this hour data for the day is still sparse; stay at the eastern edge.
pub const FIRST_TRACKED_HOUR: u32 = 9;

const EAST_EDGE_LON: f64 = 20.6015625;
const LON_SHIFT_PER_HOUR: f64 = -200.53125 / 23.0;
const VIEW_WIDTH_LON: f64 = 159.328125;
const SOUTH_LAT: f64 = -46.546875;
const NORTH_LAT: f64 = 53.015625;

pub fn supports_leading_edge(projection: &str) -> bool {
    projection == GEOGRAPHIC
}

pub fn leading_extent(utc_hour: u32) -> GeoExtent {
    let hour = if utc_hour < FIRST_TRACKED_HOUR {
        0
    } else {
        utc_hour
    };
    let min_lon = EAST_EDGE_LON + f64::from(hour) * LON_SHIFT_PER_HOUR;
    GeoExtent::new(min_lon, SOUTH_LAT, min_lon + VIEW_WIDTH_LON, NORTH_LAT)
}
