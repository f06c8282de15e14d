use super::model::Coordinates;

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometers (haversine).
///
/// NaN in, NaN out. Callers validate coordinates first.
pub fn distance_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

pub fn between(from: Coordinates, to: Coordinates) -> f64 {
    distance_km(from.latitude, from.longitude, to.latitude, to.longitude)
}

/// Distance from the user to a vendor, if both ends are known.
pub fn from_user(user: Option<Coordinates>, vendor: Option<Coordinates>) -> Option<f64> {
    match (user, vendor) {
        (Some(u), Some(v)) => Some(between(u, v)),
        _ => None,
    }
}

pub(crate) fn is_valid(c: Coordinates) -> bool {
    c.latitude.is_finite()
        && c.longitude.is_finite()
        && (-90.0..=90.0).contains(&c.latitude)
        && (-180.0..=180.0).contains(&c.longitude)
}
