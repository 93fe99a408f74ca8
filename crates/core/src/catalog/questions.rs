use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::model::{CategoryId, LicenseType, QuestionId};

/// Marker in `Question::states` for questions valid in every state.
pub const ALL_STATES: &str = "ALL";

/// A multiple-choice permit question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: QuestionId,
    pub text: String,
    pub options: [String; 4],
    pub correct_index: u8,
    pub explanation: String,
    pub category_id: CategoryId,
    pub states: Vec<String>,
    pub license_types: Vec<LicenseType>,
}

impl Question {
    #[must_use]
    pub fn is_correct(&self, selected: i32) -> bool {
        selected == i32::from(self.correct_index)
    }

    #[must_use]
    pub fn applies_to_state(&self, code: &str) -> bool {
        self.states.iter().any(|s| s == code || s == ALL_STATES)
    }
}

/// Read-only question lookup and sampling.
#[derive(Debug, Clone, Default)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    #[must_use]
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    /// The built-in bank shipped with the app.
    #[must_use]
    pub fn seed() -> Self {
        Self::new(SEED.iter().map(SeedQuestion::to_question).collect())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn all(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn by_id(&self, id: &QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| &q.id == id)
    }

    #[must_use]
    pub fn by_category(&self, category_id: &CategoryId) -> Vec<&Question> {
        self.questions
            .iter()
            .filter(|q| &q.category_id == category_id)
            .collect()
    }

    #[must_use]
    pub fn for_state(&self, code: &str) -> Vec<&Question> {
        self.questions
            .iter()
            .filter(|q| q.applies_to_state(code))
            .collect()
    }

    #[must_use]
    pub fn for_license_type(&self, license: LicenseType) -> Vec<&Question> {
        self.questions
            .iter()
            .filter(|q| q.license_types.contains(&license))
            .collect()
    }

    /// Up to `count` distinct questions in random order, optionally limited to one category.
    pub fn random_sample<R: Rng + ?Sized>(
        &self,
        count: usize,
        category_id: Option<&CategoryId>,
        rng: &mut R,
    ) -> Vec<&Question> {
        let mut pool: Vec<&Question> = match category_id {
            Some(category_id) => self.by_category(category_id),
            None => self.questions.iter().collect(),
        };
        pool.as_mut_slice().shuffle(rng);
        pool.truncate(count);
        pool
    }
}

//
// ─── SEED DATA ─────────────────────────────────────────────────────────────────
//

struct SeedQuestion {
    id: &'static str,
    category: &'static str,
    text: &'static str,
    options: [&'static str; 4],
    correct: u8,
    explanation: &'static str,
    licenses: &'static [LicenseType],
}

impl SeedQuestion {
    fn to_question(&self) -> Question {
        Question {
            id: QuestionId::new(self.id),
            text: self.text.to_owned(),
            options: self.options.map(str::to_owned),
            correct_index: self.correct,
            explanation: self.explanation.to_owned(),
            category_id: CategoryId::new(self.category),
            states: vec![ALL_STATES.to_owned()],
            license_types: self.licenses.to_vec(),
        }
    }
}

const STANDARD: &[LicenseType] = &[LicenseType::Car, LicenseType::Motorcycle, LicenseType::Cdl];
const CDL_ONLY: &[LicenseType] = &[LicenseType::Cdl];

const SEED: &[SeedQuestion] = &[
    SeedQuestion {
        id: "rs_001",
        category: "road_signs",
        text: "What does an eight-sided red sign mean?",
        options: ["Yield", "Stop", "Do not enter", "Slow down"],
        correct: 1,
        explanation: "Octagonal red signs always mean come to a complete stop.",
        licenses: STANDARD,
    },
    SeedQuestion {
        id: "rs_002",
        category: "road_signs",
        text: "A downward-pointing red and white triangle means:",
        options: [
            "Stop ahead",
            "Merge left",
            "Yield the right-of-way",
            "Road narrows",
        ],
        correct: 2,
        explanation: "A yield sign means slow down and give way to traffic and pedestrians.",
        licenses: STANDARD,
    },
    SeedQuestion {
        id: "ts_001",
        category: "traffic_signals",
        text: "A flashing red traffic light means:",
        options: [
            "Proceed with caution",
            "Stop, then go when safe",
            "The light is about to turn green",
            "Yield only to pedestrians",
        ],
        correct: 1,
        explanation: "Treat a flashing red light exactly like a stop sign.",
        licenses: STANDARD,
    },
    SeedQuestion {
        id: "ts_005",
        category: "traffic_signals",
        text: "A steady yellow light means:",
        options: [
            "Speed up to clear the intersection",
            "The signal is about to turn red",
            "Pedestrians may cross",
            "Turn right only",
        ],
        correct: 1,
        explanation: "Stop if you can do so safely; the light is about to turn red.",
        licenses: STANDARD,
    },
    SeedQuestion {
        id: "rw_001",
        category: "right_of_way",
        text: "At a four-way stop, two cars arrive at the same time. Who goes first?",
        options: [
            "The car on the left",
            "The car on the right",
            "The larger vehicle",
            "Whoever honks first",
        ],
        correct: 1,
        explanation: "Yield to the vehicle on your right when arrivals are simultaneous.",
        licenses: STANDARD,
    },
    SeedQuestion {
        id: "rw_002",
        category: "right_of_way",
        text: "When an emergency vehicle approaches with sirens on, you should:",
        options: [
            "Stop where you are",
            "Speed up to get out of the way",
            "Pull to the right edge and stop",
            "Keep driving at the same speed",
        ],
        correct: 2,
        explanation: "Pull over to the right and stop until the emergency vehicle passes.",
        licenses: STANDARD,
    },
    SeedQuestion {
        id: "pr_001",
        category: "parking_rules",
        text: "A red-painted curb means:",
        options: [
            "Loading zone",
            "No stopping, standing, or parking",
            "Passenger pickup only",
            "Parking for disabled persons",
        ],
        correct: 1,
        explanation: "Red curbs prohibit stopping, standing, and parking.",
        licenses: STANDARD,
    },
    SeedQuestion {
        id: "pr_002",
        category: "parking_rules",
        text: "When parking uphill with a curb, turn your front wheels:",
        options: [
            "Toward the curb",
            "Away from the curb",
            "Straight ahead",
            "It does not matter",
        ],
        correct: 1,
        explanation: "Wheels turned away from the curb let the tire catch the curb if the car rolls.",
        licenses: STANDARD,
    },
    SeedQuestion {
        id: "sd_004",
        category: "safe_driving",
        text: "The recommended minimum following distance in good conditions is:",
        options: ["1 second", "2 seconds", "3 seconds", "10 seconds"],
        correct: 2,
        explanation: "Keep at least three seconds between you and the vehicle ahead.",
        licenses: STANDARD,
    },
    SeedQuestion {
        id: "sd_006",
        category: "safe_driving",
        text: "Before changing lanes you should:",
        options: [
            "Only use your mirrors",
            "Signal and check your blind spot",
            "Slow down sharply",
            "Honk your horn",
        ],
        correct: 1,
        explanation: "Mirrors leave blind spots; signal and look over your shoulder.",
        licenses: STANDARD,
    },
    SeedQuestion {
        id: "ad_001",
        category: "alcohol_drugs",
        text: "For drivers 21 and over, the legal BAC limit in most states is:",
        options: ["0.02%", "0.05%", "0.08%", "0.10%"],
        correct: 2,
        explanation: "A blood alcohol concentration of 0.08% or more is illegal for adult drivers.",
        licenses: STANDARD,
    },
    SeedQuestion {
        id: "ad_002",
        category: "alcohol_drugs",
        text: "Implied consent means that by driving you agree to:",
        options: [
            "Carry insurance",
            "Be tested for alcohol or drugs if lawfully requested",
            "Obey the speed limit",
            "Let police search your car",
        ],
        correct: 1,
        explanation: "Refusing a lawful chemical test carries its own penalties.",
        licenses: STANDARD,
    },
    SeedQuestion {
        id: "ss_001",
        category: "special_situations",
        text: "When you see a school bus stopped with red lights flashing you must:",
        options: [
            "Pass carefully on the left",
            "Stop until the lights stop flashing",
            "Slow to 25 mph",
            "Honk to warn children",
        ],
        correct: 1,
        explanation: "Traffic in both directions must stop for a loading school bus on undivided roads.",
        licenses: STANDARD,
    },
    SeedQuestion {
        id: "ss_007",
        category: "special_situations",
        text: "When approaching a railroad crossing without gates you should:",
        options: [
            "Speed up to cross quickly",
            "Look and listen for trains in both directions",
            "Stop on the tracks to check",
            "Shift gears while crossing",
        ],
        correct: 1,
        explanation: "Always look both ways and listen before crossing tracks.",
        licenses: STANDARD,
    },
    SeedQuestion {
        id: "ve_001",
        category: "vehicle_equipment",
        text: "Low-beam headlights must be used:",
        options: [
            "Only on highways",
            "From sunset to sunrise and in poor visibility",
            "Only in the rain",
            "Whenever the radio is on",
        ],
        correct: 1,
        explanation: "Use headlights at night and whenever visibility is reduced.",
        licenses: STANDARD,
    },
    SeedQuestion {
        id: "ve_002",
        category: "vehicle_equipment",
        text: "Before driving a commercial vehicle you must perform a:",
        options: [
            "Pre-trip inspection",
            "Fuel economy test",
            "Radio check",
            "Tire rotation",
        ],
        correct: 0,
        explanation: "A pre-trip inspection is required before operating a commercial vehicle.",
        licenses: CDL_ONLY,
    },
    SeedQuestion {
        id: "rm_001",
        category: "road_markings",
        text: "A solid yellow line on your side of the center line means:",
        options: [
            "Passing is allowed",
            "Do not pass",
            "Bike lane",
            "Lane ends ahead",
        ],
        correct: 1,
        explanation: "A solid line on your side prohibits passing.",
        licenses: STANDARD,
    },
    SeedQuestion {
        id: "rm_002",
        category: "road_markings",
        text: "White lane lines separate:",
        options: [
            "Traffic moving in opposite directions",
            "Traffic moving in the same direction",
            "Parking spaces only",
            "Bike lanes only",
        ],
        correct: 1,
        explanation: "White lines separate lanes of traffic traveling the same way.",
        licenses: STANDARD,
    },
];
