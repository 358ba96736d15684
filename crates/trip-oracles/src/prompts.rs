//! Prompt builders for each oracle decision.
//!
//! Every prompt names the exact JSON object the model must return; the
//! typed layer in `llm.rs` treats anything that fails to parse as a
//! no-decision.

use chrono::NaiveDate;

use crate::types::{CurationRequest, EvaluationRequest, ScheduleRequest, SelectionRequest};

pub(crate) fn parse_trip(user_request: &str, today: NaiveDate) -> String {
    format!(
        "You are an expert at parsing travel requests.\n\
         Parse the following request into a single JSON object with exactly these keys:\n\
         \"origin\" (string), \"destination\" (string), \"startDate\" (YYYY-MM-DD),\n\
         \"endDate\" (YYYY-MM-DD), \"travelers\" (integer >= 1), \"budget\" (number or null),\n\
         \"dailySpendingBudget\" (number or null, per person per day), \"interests\" (array of strings).\n\
         Today's date is {today}; resolve any relative dates against it.\n\n\
         User request: \"{user_request}\"\n\n\
         Respond with the JSON object only."
    )
}

pub(crate) fn select_option(request: &SelectionRequest) -> String {
    let mut options_text = String::new();
    for (i, option) in request.options.iter().enumerate() {
        options_text.push_str(&format!("Option {i}: {option}\n"));
    }

    let budget_line = match request.budget {
        Some(budget) => format!("- Total trip budget: {budget:.2} EUR\n"),
        None => String::new(),
    };
    let feedback_block = match &request.feedback {
        Some(feedback) => format!(
            "The previous attempt exceeded the budget. Feedback: \"{feedback}\". \
             Favor a more budget-friendly option that is still good value.\n\n"
        ),
        None => String::new(),
    };

    format!(
        "You are an expert travel advisor. Select the best {kind} option for the user.\n\
         {feedback_block}\
         Balance price against quality ({quality}).\n\
         USER PREFERENCES:\n{budget_line}\n\
         OPTIONS:\n{options_text}\n\
         Respond with a JSON object: {{\"index\": <0-based option index>, \"reasoning\": \"<why>\"}}.",
        kind = request.kind.label(),
        quality = match request.kind {
            crate::types::OptionKind::Flight => "shorter duration and fewer stops are better",
            crate::types::OptionKind::Hotel => "a higher rating is better",
        },
    )
}

pub(crate) fn curate_events(request: &CurationRequest) -> String {
    let events_text: String = request
        .events
        .iter()
        .map(|e| {
            format!(
                "- {{\"name\": \"{}\", \"date\": \"{}\", \"venue\": \"{}\", \"url\": \"{}\"}}\n",
                e.name, e.date, e.venue, e.url
            )
        })
        .collect();

    format!(
        "You are an expert event curator. The user's interests are: {interests}.\n\
         Below is a list of events during their stay. Remove duplicates and \
         near-duplicates (same show on several dates counts once) and keep only \
         the 3-4 events most relevant to the interests, preserving each kept \
         event object exactly as given.\n\n\
         AVAILABLE EVENTS:\n{events_text}\n\
         Respond with a JSON object: {{\"events\": [<the kept event objects, unchanged>]}}.",
        interests = request.interests.join(", "),
    )
}

pub(crate) fn extract_places(destination: &str, raw_text: &str) -> String {
    format!(
        "You are a data extraction expert. Analyze the web search results below \
         and extract only real, physical, geocodable places: museums, monuments, \
         parks, squares, famous buildings, specific neighborhoods.\n\
         Do NOT extract temporary or abstract items such as festivals, \
         exhibitions, awards, or experiences.\n\
         Good: \"Colosseum\", \"Vatican Museums\", \"Trastevere Neighborhood\".\n\
         Bad: \"International Organ Festival\", \"cinema under the stars\".\n\n\
         SEARCH RESULTS:\n---\n{raw_text}\n---\n\n\
         Respond with a JSON object: {{\"places\": [{{\"name\": \"...\", \
         \"description\": \"...\", \"location\": \"{destination}\", \
         \"timeOfDay\": \"Morning|Afternoon|Evening\"}}]}}."
    )
}

pub(crate) fn schedule(request: &ScheduleRequest) -> String {
    let activities_text: String = request
        .activities
        .iter()
        .map(|a| format!("- {}: {} ({})\n", a.name, a.description, a.time_of_day))
        .collect();
    let events_text: String = request
        .events
        .iter()
        .map(|e| format!("- {} on {} at {}\n", e.name, e.date, e.venue))
        .collect();

    format!(
        "You are an expert travel planner. Create a day-by-day itinerary for a \
         {days}-day trip to {destination}.\n\n\
         Activities to place:\n{activities_text}\n\
         Fixed events (must stay on their own date):\n{events_text}\n\
         Rules:\n\
         1. Distribute activities across all {days} days; leave no day empty while unplaced activities remain.\n\
         2. Group nearby activities to minimize travel time and keep per-activity durations realistic.\n\
         3. Use the EXACT activity names from the input list.\n\n\
         Respond with a JSON object: {{\"days\": [{{\"day\": 1, \"activities\": \
         [{{\"name\": \"...\", \"description\": \"...\", \"location\": \"...\", \
         \"timeOfDay\": \"...\"}}]}}]}}.",
        days = request.days,
        destination = request.destination,
    )
}

pub(crate) fn evaluate(request: &EvaluationRequest) -> String {
    let budget_line = match request.budget {
        Some(budget) => format!("{budget:.2} EUR"),
        None => "not specified".to_string(),
    };
    let status = if request.over_budget() {
        "Over Budget"
    } else {
        "Within Budget"
    };

    let flight_alt = match &request.cheaper_flight {
        Some(alt) => {
            let duration = if alt.duration_change_minutes > 0 {
                format!("{} mins longer", alt.duration_change_minutes)
            } else {
                format!("{} mins shorter", alt.duration_change_minutes.abs())
            };
            format!(
                "Airline: {}, Price: {:.2} EUR (saves {:.2}), Duration change: {}, Stops: {}",
                alt.airline,
                alt.price,
                alt.saving,
                duration,
                if alt.has_layover { "has layover" } else { "direct" },
            )
        }
        None => "None".to_string(),
    };
    let hotel_alt = match &request.cheaper_hotel {
        Some(alt) => format!(
            "Name: {}, Price: {:.2} EUR (saves {:.2}), Rating: {} (current is {})",
            alt.name, alt.total_price, alt.saving, alt.rating, alt.current_rating,
        ),
        None => "None".to_string(),
    };

    format!(
        "You are an expert travel consultant. Maximize the user's experience \
         while respecting the budget.\n\n\
         Current status:\n\
         - Budget: {budget_line}\n\
         - Total cost: {total:.2} EUR\n\
         - Status: {status}\n\n\
         Current selection:\n\
         - Flight: {flight}\n\
         - Hotel: {hotel}\n\n\
         Alternatives for refinement:\n\
         - Cheaper hotel: {hotel_alt}\n\
         - Cheaper flight: {flight_alt}\n\n\
         Rules:\n\
         1. Within budget: APPROVE, unless an alternative is a clear upgrade at negligible cost.\n\
         2. Over budget: choose exactly one of REFINE_FLIGHT or REFINE_HOTEL by value trade-off, \
         not raw savings. A tiny saving for hours of extra travel, or a steep rating drop, is a bad trade. \
         If both alternatives are poor, pick the one that saves the most.\n\
         3. Edge case: slightly over budget (under ~5%) with only disproportionate quality losses \
         available may be APPROVED, with the reason stated in the feedback.\n\n\
         Respond with a JSON object: {{\"action\": \"APPROVE\"|\"REFINE_FLIGHT\"|\"REFINE_HOTEL\", \
         \"feedback\": \"<reasoning>\"}}.",
        total = request.total_cost,
        flight = request.current_flight,
        hotel = request.current_hotel,
    )
}
