use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignCategory {
    Regulatory,
    Warning,
    Guide,
    Construction,
}

impl SignCategory {
    pub const ALL: [SignCategory; 4] = [
        SignCategory::Regulatory,
        SignCategory::Warning,
        SignCategory::Guide,
        SignCategory::Construction,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SignCategory::Regulatory => "regulatory",
            SignCategory::Warning => "warning",
            SignCategory::Guide => "guide",
            SignCategory::Construction => "construction",
        }
    }
}

impl fmt::Display for SignCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference entry for one road sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoadSign {
    pub id: &'static str,
    pub name: &'static str,
    pub category: SignCategory,
    pub description: &'static str,
    pub related_question_ids: &'static [&'static str],
}

pub const SIGNS: &[RoadSign] = &[
    RoadSign {
        id: "sign_stop",
        name: "Stop Sign",
        category: SignCategory::Regulatory,
        description: "Come to a complete stop at the stop line, crosswalk, or before entering the intersection. Yield to pedestrians and other traffic. Proceed only when it is safe.",
        related_question_ids: &["rs_001"],
    },
    RoadSign {
        id: "sign_yield",
        name: "Yield Sign",
        category: SignCategory::Regulatory,
        description: "Slow down and be prepared to stop. Give the right-of-way to all vehicles and pedestrians in or approaching the intersection.",
        related_question_ids: &["rs_002"],
    },
    RoadSign {
        id: "sign_speed_limit",
        name: "Speed Limit Sign",
        category: SignCategory::Regulatory,
        description: "Indicates the maximum legal speed allowed on the road. You must not exceed this speed under any conditions, and you should drive slower when conditions are hazardous.",
        related_question_ids: &[],
    },
    RoadSign {
        id: "sign_do_not_enter",
        name: "Do Not Enter",
        category: SignCategory::Regulatory,
        description: "You must not enter this roadway. This sign is usually placed at the exit end of one-way streets, ramps, and crossovers.",
        related_question_ids: &[],
    },
    RoadSign {
        id: "sign_wrong_way",
        name: "Wrong Way",
        category: SignCategory::Regulatory,
        description: "You are traveling against traffic on a one-way street or ramp. Pull over safely and turn around.",
        related_question_ids: &[],
    },
    RoadSign {
        id: "sign_one_way",
        name: "One Way",
        category: SignCategory::Regulatory,
        description: "Traffic flows only in the direction of the arrow. Do not go the opposite direction.",
        related_question_ids: &[],
    },
    RoadSign {
        id: "sign_no_turn_on_red",
        name: "No Turn on Red",
        category: SignCategory::Regulatory,
        description: "You may not turn right (or left, if specified) on a red light at this intersection, even after stopping.",
        related_question_ids: &["ts_005"],
    },
    RoadSign {
        id: "sign_no_u_turn",
        name: "No U-Turn",
        category: SignCategory::Regulatory,
        description: "U-turns are prohibited at this location. Continue and find another legal place to turn around.",
        related_question_ids: &[],
    },
    RoadSign {
        id: "sign_no_parking",
        name: "No Parking",
        category: SignCategory::Regulatory,
        description: "Parking is prohibited in this area. Check signs for specific times or conditions.",
        related_question_ids: &["pr_002"],
    },
    RoadSign {
        id: "sign_no_passing",
        name: "No Passing Zone",
        category: SignCategory::Regulatory,
        description: "Passing is prohibited in this area. Stay in your lane until you see a sign indicating passing is allowed.",
        related_question_ids: &["rm_001"],
    },
    RoadSign {
        id: "sign_keep_right",
        name: "Keep Right",
        category: SignCategory::Regulatory,
        description: "Stay to the right of the divider, island, or obstruction ahead.",
        related_question_ids: &[],
    },
    RoadSign {
        id: "sign_curve_right",
        name: "Curve Ahead (Right)",
        category: SignCategory::Warning,
        description: "The road ahead curves to the right. Slow down and maintain a safe speed through the curve.",
        related_question_ids: &["sd_004"],
    },
    RoadSign {
        id: "sign_curve_left",
        name: "Curve Ahead (Left)",
        category: SignCategory::Warning,
        description: "The road ahead curves to the left. Slow down and maintain a safe speed through the curve.",
        related_question_ids: &["sd_004"],
    },
    RoadSign {
        id: "sign_winding_road",
        name: "Winding Road",
        category: SignCategory::Warning,
        description: "The road ahead has a series of curves. Reduce speed and stay alert.",
        related_question_ids: &[],
    },
    RoadSign {
        id: "sign_merge",
        name: "Merge",
        category: SignCategory::Warning,
        description: "Two lanes of traffic will merge into one ahead. Be prepared to yield or change lanes.",
        related_question_ids: &[],
    },
    RoadSign {
        id: "sign_lane_ends",
        name: "Lane Ends",
        category: SignCategory::Warning,
        description: "The lane you are in will end ahead. Merge into the adjacent lane safely.",
        related_question_ids: &[],
    },
    RoadSign {
        id: "sign_divided_highway_begins",
        name: "Divided Highway Begins",
        category: SignCategory::Warning,
        description: "The highway ahead is divided by a median. Keep to the right of the divider.",
        related_question_ids: &[],
    },
    RoadSign {
        id: "sign_divided_highway_ends",
        name: "Divided Highway Ends",
        category: SignCategory::Warning,
        description: "The divided highway ends ahead. Traffic will meet from both directions. Stay alert.",
        related_question_ids: &[],
    },
    RoadSign {
        id: "sign_two_way_traffic",
        name: "Two-Way Traffic",
        category: SignCategory::Warning,
        description: "You are leaving a one-way road and entering a road with two-way traffic.",
        related_question_ids: &[],
    },
    RoadSign {
        id: "sign_hill",
        name: "Steep Grade/Hill",
        category: SignCategory::Warning,
        description: "There is a steep hill ahead. Trucks and heavy vehicles should use lower gears. Watch for slow-moving vehicles.",
        related_question_ids: &[],
    },
    RoadSign {
        id: "sign_slippery_when_wet",
        name: "Slippery When Wet",
        category: SignCategory::Warning,
        description: "The road becomes slippery when wet. Reduce speed in wet conditions and avoid sudden braking or turning.",
        related_question_ids: &["sd_006"],
    },
    RoadSign {
        id: "sign_railroad_crossing",
        name: "Railroad Crossing Ahead",
        category: SignCategory::Warning,
        description: "A railroad crossing is ahead. Slow down, look both ways, and be prepared to stop. Never stop on the tracks.",
        related_question_ids: &["rs_005", "ss_002"],
    },
    RoadSign {
        id: "sign_deer_crossing",
        name: "Deer Crossing",
        category: SignCategory::Warning,
        description: "Deer frequently cross the road in this area. Be alert, especially at dawn and dusk.",
        related_question_ids: &[],
    },
    RoadSign {
        id: "sign_pedestrian_crossing",
        name: "Pedestrian Crossing",
        category: SignCategory::Warning,
        description: "A pedestrian crosswalk is ahead. Be prepared to stop for pedestrians.",
        related_question_ids: &["row_002"],
    },
    RoadSign {
        id: "sign_school_zone",
        name: "School Zone",
        category: SignCategory::Warning,
        description: "You are entering a school zone. Reduce speed when children are present. Watch for children crossing.",
        related_question_ids: &["rs_009", "ss_001"],
    },
    RoadSign {
        id: "sign_intersection",
        name: "Intersection Ahead",
        category: SignCategory::Warning,
        description: "An intersection is ahead. Be prepared to stop or yield to crossing traffic.",
        related_question_ids: &[],
    },
    RoadSign {
        id: "sign_stop_ahead",
        name: "Stop Sign Ahead",
        category: SignCategory::Warning,
        description: "A stop sign is ahead. Begin slowing down to prepare to stop.",
        related_question_ids: &[],
    },
    RoadSign {
        id: "sign_signal_ahead",
        name: "Traffic Signal Ahead",
        category: SignCategory::Warning,
        description: "A traffic signal is ahead. Be prepared to stop if the light is yellow or red.",
        related_question_ids: &[],
    },
    RoadSign {
        id: "sign_interstate",
        name: "Interstate Route",
        category: SignCategory::Guide,
        description: "Indicates an Interstate highway. Red, white, and blue shield shape shows the route number.",
        related_question_ids: &["rs_006"],
    },
    RoadSign {
        id: "sign_us_route",
        name: "US Route",
        category: SignCategory::Guide,
        description: "Indicates a US highway route. White shield shape on black background shows the route number.",
        related_question_ids: &[],
    },
    RoadSign {
        id: "sign_state_route",
        name: "State Route",
        category: SignCategory::Guide,
        description: "Indicates a state highway. Shape and color vary by state.",
        related_question_ids: &[],
    },
    RoadSign {
        id: "sign_hospital",
        name: "Hospital",
        category: SignCategory::Guide,
        description: "A hospital is nearby in the direction indicated. Blue background with white \"H\".",
        related_question_ids: &["rs_007"],
    },
    RoadSign {
        id: "sign_gas",
        name: "Gas Station",
        category: SignCategory::Guide,
        description: "A gas station is nearby in the direction indicated.",
        related_question_ids: &["rs_007"],
    },
    RoadSign {
        id: "sign_food",
        name: "Food Services",
        category: SignCategory::Guide,
        description: "Restaurants or food services are nearby in the direction indicated.",
        related_question_ids: &["rs_007"],
    },
    RoadSign {
        id: "sign_lodging",
        name: "Lodging",
        category: SignCategory::Guide,
        description: "Hotels or lodging facilities are nearby in the direction indicated.",
        related_question_ids: &["rs_007"],
    },
    RoadSign {
        id: "sign_rest_area",
        name: "Rest Area",
        category: SignCategory::Guide,
        description: "A rest area is ahead at the distance or exit indicated.",
        related_question_ids: &["rs_007"],
    },
    RoadSign {
        id: "sign_exit",
        name: "Exit Sign",
        category: SignCategory::Guide,
        description: "Indicates an exit from the highway. Shows exit number and/or destination.",
        related_question_ids: &[],
    },
    RoadSign {
        id: "sign_mile_marker",
        name: "Mile Marker",
        category: SignCategory::Guide,
        description: "Indicates the distance from the state line or beginning of the route. Useful for reporting emergencies or planning trips.",
        related_question_ids: &[],
    },
    RoadSign {
        id: "sign_road_work",
        name: "Road Work Ahead",
        category: SignCategory::Construction,
        description: "Construction or maintenance work is ahead. Slow down and watch for workers and equipment.",
        related_question_ids: &["rs_008", "ss_007"],
    },
    RoadSign {
        id: "sign_detour",
        name: "Detour",
        category: SignCategory::Construction,
        description: "The normal route is closed. Follow the detour signs to an alternate route.",
        related_question_ids: &[],
    },
    RoadSign {
        id: "sign_road_closed",
        name: "Road Closed",
        category: SignCategory::Construction,
        description: "The road ahead is closed. You must turn around or take an alternate route.",
        related_question_ids: &[],
    },
    RoadSign {
        id: "sign_flagger",
        name: "Flagger Ahead",
        category: SignCategory::Construction,
        description: "A flagger is ahead directing traffic through a work zone. Be prepared to stop and follow their directions.",
        related_question_ids: &["ss_007"],
    },
    RoadSign {
        id: "sign_one_lane",
        name: "One Lane Road Ahead",
        category: SignCategory::Construction,
        description: "Traffic is reduced to one lane ahead. Be prepared to merge and follow any flaggers or signals.",
        related_question_ids: &[],
    },
    RoadSign {
        id: "sign_shoulder_closed",
        name: "Shoulder Closed",
        category: SignCategory::Construction,
        description: "The road shoulder is closed or unavailable. Do not use the shoulder.",
        related_question_ids: &[],
    },
    RoadSign {
        id: "sign_fresh_oil",
        name: "Fresh Oil",
        category: SignCategory::Construction,
        description: "Fresh oil or tar has been applied to the road. Reduce speed to prevent damage to your vehicle and the road surface.",
        related_question_ids: &[],
    },
    RoadSign {
        id: "sign_uneven_lanes",
        name: "Uneven Lanes",
        category: SignCategory::Construction,
        description: "Lanes are at different levels due to construction. Reduce speed and drive carefully.",
        related_question_ids: &[],
    },];

#[must_use]
pub fn signs_by_category(category: SignCategory) -> Vec<&'static RoadSign> {
    SIGNS.iter().filter(|s| s.category == category).collect()
}

/// Case-insensitive substring search over name and description.
#[must_use]
pub fn search_signs(query: &str) -> Vec<&'static RoadSign> {
    let needle = query.to_lowercase();
    SIGNS
        .iter()
        .filter(|s| {
            s.name.to_lowercase().contains(&needle)
                || s.description.to_lowercase().contains(&needle)
        })
        .collect()
}

#[must_use]
pub fn sign_by_id(id: &str) -> Option<&'static RoadSign> {
    SIGNS.iter().find(|s| s.id == id)
}

#[must_use]
pub fn sign_categories() -> &'static [SignCategory] {
    &SignCategory::ALL
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_unique() {
        let ids: HashSet<&str> = SIGNS.iter().map(|s| s.id).collect();
        assert_eq!(ids.len(), SIGNS.len());
    }

    #[test]
    fn every_category_has_signs() {
        for category in sign_categories() {
            let signs = signs_by_category(*category);
            assert!(!signs.is_empty(), "{category}");
            assert!(signs.iter().all(|s| s.category == *category));
        }
    }

    #[test]
    fn search_ignores_case() {
        let hits = search_signs("STOP");
        assert!(hits.iter().any(|s| s.id == "sign_stop"));
        assert!(search_signs("zzz-no-such-sign").is_empty());
    }

    #[test]
    fn lookup_by_id() {
        assert_eq!(sign_by_id("sign_yield").unwrap().name, "Yield Sign");
        assert!(sign_by_id("sign_missing").is_none());
    }
}
