use crate::model::CategoryId;

/// One of the fixed topical buckets questions are grouped into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

impl Category {
    #[must_use]
    pub fn category_id(&self) -> CategoryId {
        CategoryId::new(self.id)
    }
}

pub const CATEGORIES: &[Category] = &[
    Category {
        id: "road_signs",
        name: "Road Signs",
        description: "Regulatory, warning, guide, and construction signs",
    },
    Category {
        id: "traffic_signals",
        name: "Traffic Signals",
        description: "Traffic lights, flashing signals, pedestrian signals",
    },
    Category {
        id: "right_of_way",
        name: "Right of Way",
        description: "Intersections, pedestrians, emergency vehicles",
    },
    Category {
        id: "parking_rules",
        name: "Parking Rules",
        description: "Parallel parking, curb colors, no parking zones",
    },
    Category {
        id: "safe_driving",
        name: "Safe Driving",
        description: "Following distance, speed limits, lane changes",
    },
    Category {
        id: "alcohol_drugs",
        name: "Alcohol & Drugs",
        description: "DUI laws, BAC limits, penalties, implied consent",
    },
    Category {
        id: "special_situations",
        name: "Special Situations",
        description: "School zones, railroad crossings, emergency vehicles",
    },
    Category {
        id: "vehicle_equipment",
        name: "Vehicle Equipment",
        description: "Lights, mirrors, horn, brakes, safety equipment",
    },
    Category {
        id: "road_markings",
        name: "Road Markings",
        description: "Lane lines, crosswalks, turn arrows, bike lanes",
    },
];

#[must_use]
pub fn category_by_id(id: &str) -> Option<&'static Category> {
    CATEGORIES.iter().find(|c| c.id == id)
}
