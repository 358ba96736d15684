//! Markdown report rendering from a terminal planning state.

use std::fmt::Write as _;

use itinera_trip_contracts::{FlightLeg, PointOfInterest, TripState};

/// Render the full trip report for a successful run.
pub fn render_report(state: &TripState) -> String {
    let mut out = String::new();

    let Some(spec) = &state.spec else {
        return render_failure_report(state, "no trip specification");
    };

    let _ = writeln!(out, "# Trip Plan: {} → {}", spec.origin, spec.destination);
    let _ = writeln!(
        out,
        "**{} to {}** · {} day(s) · {} traveler(s)",
        spec.start_date,
        spec.end_date,
        spec.days(),
        spec.travelers
    );
    out.push('\n');

    render_budget(&mut out, state);

    if let Some(itinerary) = &state.itinerary {
        render_flight(&mut out, itinerary);
        render_hotel(&mut out, itinerary);
    }

    if !state.events.is_empty() {
        let _ = writeln!(out, "## Events during your stay\n");
        let _ = writeln!(out, "| Date | Event | Venue |");
        let _ = writeln!(out, "|------|-------|-------|");
        for event in &state.events {
            let _ = writeln!(
                out,
                "| {} | [{}]({}) | {} |",
                event.date, event.name, event.url, event.venue
            );
        }
        out.push('\n');
    }

    if let Some(itinerary) = &state.itinerary {
        if itinerary.days.is_empty() {
            let _ = writeln!(
                out,
                "_No activities or events were found; enjoy the city at your own pace._\n"
            );
        } else {
            let _ = writeln!(out, "## Daily itinerary\n");
            for day in &itinerary.days {
                let _ = writeln!(out, "### Day {}\n", day.day);
                for activity in &day.activities {
                    let _ = writeln!(
                        out,
                        "- **{}** ({}) — {} [Map]({})",
                        activity.name,
                        activity.time_of_day,
                        activity.description,
                        maps_link(activity, &spec.destination)
                    );
                }
                out.push('\n');
            }
        }
    }

    if let Some(evaluation) = &state.evaluation {
        let _ = writeln!(out, "## Planner notes\n");
        let _ = writeln!(out, "{}\n", evaluation.feedback);
    }

    out
}

/// Render the structured explanation for a run that produced no plan.
pub fn render_failure_report(state: &TripState, error: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Trip plan could not be generated\n");
    let _ = writeln!(out, "{error}\n");

    let mut missing = Vec::new();
    if state.flight_options.is_empty() {
        missing.push("no flights were found for the requested route and dates");
    }
    if state.hotel_options.is_empty() {
        missing.push("no hotels were found at the destination for those dates");
    }
    if !missing.is_empty() {
        let _ = writeln!(out, "What went wrong:\n");
        for reason in missing {
            let _ = writeln!(out, "- {reason}");
        }
        out.push('\n');
    }
    let _ = writeln!(
        out,
        "Try adjusting the dates, the destination spelling, or the budget."
    );
    out
}

fn render_budget(out: &mut String, state: &TripState) {
    let Some(spec) = &state.spec else { return };
    let _ = writeln!(out, "## Budget\n");
    match spec.budget {
        Some(budget) => {
            let _ = writeln!(out, "- Budget: {budget:.2} EUR");
        }
        None => {
            let _ = writeln!(out, "- Budget: not specified");
        }
    }
    if let Some(daily) = spec.daily_spending_budget {
        let _ = writeln!(out, "- Daily spending: {daily:.2} EUR per person");
    }
    if let Some(evaluation) = &state.evaluation {
        let _ = writeln!(out, "- Estimated total: {:.2} EUR", evaluation.total_cost);
        if let Some(budget) = spec.budget {
            if evaluation.total_cost > budget {
                let _ = writeln!(
                    out,
                    "- Status: over budget by {:.2} EUR",
                    evaluation.total_cost - budget
                );
            } else {
                let _ = writeln!(out, "- Status: within budget");
            }
        }
    }
    out.push('\n');
}

fn render_flight(out: &mut String, itinerary: &itinera_trip_contracts::Itinerary) {
    let flight = &itinerary.flight;
    let _ = writeln!(
        out,
        "## Flights — {} ({:.2} EUR total)\n",
        flight.outbound.airline, flight.price
    );
    render_leg(out, "Outbound", &flight.outbound);
    render_leg(out, "Return", &flight.inbound);
}

fn render_leg(out: &mut String, label: &str, leg: &FlightLeg) {
    let _ = writeln!(out, "### {label}\n");
    let _ = writeln!(out, "| Departure | Arrival | Duration | Flight |");
    let _ = writeln!(out, "|-----------|---------|----------|--------|");
    let _ = writeln!(
        out,
        "| {} ({}) | {} ({}) | {} min | {} |",
        leg.departure_time,
        leg.departure_airport,
        leg.arrival_time,
        leg.arrival_airport,
        leg.duration_minutes,
        leg.flight_number
    );
    if leg.is_layover {
        let airport = leg.layover_airport.as_deref().unwrap_or("unknown airport");
        match leg.layover_duration_minutes {
            Some(minutes) => {
                let _ = writeln!(out, "\nLayover in {airport} ({minutes} min).");
            }
            None => {
                let _ = writeln!(out, "\nLayover in {airport}.");
            }
        }
    }
    out.push('\n');
}

fn render_hotel(out: &mut String, itinerary: &itinera_trip_contracts::Itinerary) {
    let hotel = &itinerary.hotel;
    let _ = writeln!(out, "## Hotel — {}\n", hotel.name);
    let _ = writeln!(
        out,
        "- Rated {} \"{}\" from {} reviews",
        hotel.rating, hotel.rating_word, hotel.review_count
    );
    let _ = writeln!(
        out,
        "- {:.2} EUR for the stay ({:.2} EUR/night)",
        hotel.total_price, hotel.price_per_night
    );
    if let Some(photo) = &hotel.photo_url {
        let _ = writeln!(out, "- [Photo]({photo})");
    }
    if let Some(map) = &hotel.static_map_url {
        let _ = writeln!(out, "- [Location map]({map})");
    }
    out.push('\n');
}

/// A Google Maps link: coordinates when geocoded, a name search otherwise.
fn maps_link(activity: &PointOfInterest, destination: &str) -> String {
    match activity.coordinates() {
        Some((latitude, longitude)) => format!(
            "https://www.google.com/maps/search/?api=1&query={latitude},{longitude}"
        ),
        None => {
            let query = format!("{}, {}", activity.name, destination).replace(' ', "+");
            format!("https://www.google.com/maps/search/?api=1&query={query}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itinera_trip_contracts::{
        EvaluationAction, EvaluationOutcome, Itinerary, ScheduledDay, TripSpec,
    };
    use trip_providers::fixtures::FixtureProviders;

    fn poi(name: &str, coords: Option<(f64, f64)>) -> PointOfInterest {
        PointOfInterest {
            name: name.to_string(),
            description: "Worth a visit".to_string(),
            location: "Rome".to_string(),
            time_of_day: "Morning".to_string(),
            latitude: coords.map(|c| c.0),
            longitude: coords.map(|c| c.1),
        }
    }

    fn planned_state() -> TripState {
        let fixtures = FixtureProviders::rome();
        let mut state = TripState::new("Rome");
        state.spec = Some(TripSpec {
            origin: "Berlin".to_string(),
            destination: "Rome".to_string(),
            start_date: "2026-06-10".parse().unwrap(),
            end_date: "2026-06-14".parse().unwrap(),
            travelers: 2,
            budget: Some(2500.0),
            daily_spending_budget: Some(50.0),
            interests: vec![],
        });
        state.flight_options = fixtures.flights.clone();
        state.hotel_options = fixtures.hotels.clone();
        state.events = fixtures.events.clone();
        state.itinerary = Some(Itinerary {
            flight: fixtures.flights[0].clone(),
            hotel: fixtures.hotels[0].clone(),
            days: vec![ScheduledDay {
                day: 1,
                activities: vec![
                    poi("Colosseum", Some((41.8902, 12.4922))),
                    poi("Roman Forum", None),
                ],
            }],
        });
        state.evaluation = Some(EvaluationOutcome {
            action: EvaluationAction::Approve,
            feedback: "Good value for the budget.".to_string(),
            total_cost: 1892.0,
        });
        state
    }

    #[test]
    fn test_report_contains_all_sections() {
        let report = render_report(&planned_state());
        assert!(report.contains("# Trip Plan: Berlin → Rome"));
        assert!(report.contains("## Budget"));
        assert!(report.contains("within budget"));
        assert!(report.contains("## Flights — Lufthansa"));
        assert!(report.contains("Layover in Munich (MUC)"));
        assert!(report.contains("## Hotel — Hotel Milo Rome"));
        assert!(report.contains("Opera at Caracalla"));
        assert!(report.contains("### Day 1"));
        assert!(report.contains("Good value for the budget."));
    }

    #[test]
    fn test_maps_link_prefers_coordinates() {
        let geocoded = maps_link(&poi("Colosseum", Some((41.8902, 12.4922))), "Rome");
        assert!(geocoded.contains("query=41.8902,12.4922"));

        let search = maps_link(&poi("Roman Forum", None), "Rome");
        assert!(search.contains("query=Roman+Forum,+Rome"));
    }

    #[test]
    fn test_zero_day_itinerary_renders_a_note() {
        let mut state = planned_state();
        if let Some(itinerary) = state.itinerary.as_mut() {
            itinerary.days.clear();
        }
        state.events.clear();
        let report = render_report(&state);
        assert!(report.contains("at your own pace"));
        assert!(!report.contains("## Daily itinerary"));
    }

    #[test]
    fn test_failure_report_names_the_missing_pieces() {
        let mut state = TripState::new("Rome");
        state.hotel_options = FixtureProviders::rome().hotels;
        let report = render_failure_report(&state, "no flight could be selected");
        assert!(report.contains("could not be generated"));
        assert!(report.contains("no flights were found"));
        assert!(!report.contains("no hotels were found"));
    }
}
