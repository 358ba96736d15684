//! Map-marker extraction from a scheduled itinerary.

use itinera_trip_contracts::{MapMarker, TripState};

/// Collect one marker per geocoded scheduled activity, in day order.
///
/// Returns `None` when there is no itinerary or nothing in it is geocoded,
/// so hosts can distinguish "no map" from "empty map".
pub fn map_markers(state: &TripState) -> Option<Vec<MapMarker>> {
    let itinerary = state.itinerary.as_ref()?;
    let markers: Vec<MapMarker> = itinerary
        .days
        .iter()
        .flat_map(|day| {
            day.activities.iter().filter_map(|activity| {
                activity.coordinates().map(|(latitude, longitude)| MapMarker {
                    day: day.day,
                    name: activity.name.clone(),
                    description: activity.description.clone(),
                    latitude,
                    longitude,
                })
            })
        })
        .collect();

    if markers.is_empty() {
        None
    } else {
        Some(markers)
    }
}
