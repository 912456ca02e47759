//! Great-circle distance calculations

/// Mean Earth radius in meters (IUGG)
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Slack applied to radius comparisons to absorb floating-point rounding
pub const DISTANCE_TOLERANCE_M: f64 = 1e-6;

/// Calculates the great-circle distance between two positions
///
/// Uses the haversine formula, which stays numerically stable for short
/// distances.
///
/// # Arguments
///
/// * `from` - First position as (latitude, longitude) in degrees
/// * `to` - Second position as (latitude, longitude) in degrees
///
/// # Returns
///
/// Distance in meters
///
/// # Example
///
/// ```
/// use lounge_atlas::geo::distance_m;
///
/// // One degree of latitude is roughly 111.2 km
/// let dist = distance_m((0.0, 0.0), (1.0, 0.0));
/// assert!((dist - 111_195.0).abs() < 10.0);
/// ```
pub fn distance_m(from: (f64, f64), to: (f64, f64)) -> f64 {
    let (lat1, lon1) = from;
    let (lat2, lon2) = to;

    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    // Rounding can push `a` just past 1.0 for antipodal points
    let c = 2.0 * a.sqrt().min(1.0).asin();

    EARTH_RADIUS_M * c
}

/// Checks whether `to` lies within `radius_km` of `from`
///
/// The boundary is inclusive.
pub fn within_radius(from: (f64, f64), to: (f64, f64), radius_km: f64) -> bool {
    distance_m(from, to) <= radius_km * 1000.0 + DISTANCE_TOLERANCE_M
}
