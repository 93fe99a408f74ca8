/// Permit test rules for one US state (or DC).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateInfo {
    pub code: &'static str,
    pub name: &'static str,
    /// Minimum percentage needed to pass.
    pub passing_score: u32,
    pub question_count: u32,
    /// Minutes.
    pub time_limit: u32,
}

const fn state(
    code: &'static str,
    name: &'static str,
    passing_score: u32,
    question_count: u32,
    time_limit: u32,
) -> StateInfo {
    StateInfo {
        code,
        name,
        passing_score,
        question_count,
        time_limit,
    }
}

pub const US_STATES: &[StateInfo] = &[
    state("AL", "Alabama", 80, 30, 45),
    state("AK", "Alaska", 80, 20, 30),
    state("AZ", "Arizona", 80, 30, 45),
    state("AR", "Arkansas", 80, 25, 40),
    state("CA", "California", 83, 36, 45),
    state("CO", "Colorado", 80, 25, 40),
    state("CT", "Connecticut", 80, 25, 40),
    state("DE", "Delaware", 80, 30, 45),
    state("DC", "District of Columbia", 80, 25, 40),
    state("FL", "Florida", 80, 50, 60),
    state("GA", "Georgia", 75, 40, 45),
    state("HI", "Hawaii", 80, 30, 45),
    state("ID", "Idaho", 85, 40, 45),
    state("IL", "Illinois", 80, 35, 45),
    state("IN", "Indiana", 84, 50, 60),
    state("IA", "Iowa", 80, 35, 45),
    state("KS", "Kansas", 80, 25, 40),
    state("KY", "Kentucky", 80, 40, 45),
    state("LA", "Louisiana", 80, 40, 45),
    state("ME", "Maine", 80, 30, 45),
    state("MD", "Maryland", 85, 25, 40),
    state("MA", "Massachusetts", 72, 25, 40),
    state("MI", "Michigan", 80, 50, 60),
    state("MN", "Minnesota", 80, 40, 45),
    state("MS", "Mississippi", 80, 30, 45),
    state("MO", "Missouri", 80, 25, 40),
    state("MT", "Montana", 80, 33, 45),
    state("NE", "Nebraska", 80, 25, 40),
    state("NV", "Nevada", 80, 50, 60),
    state("NH", "New Hampshire", 80, 40, 45),
    state("NJ", "New Jersey", 80, 50, 60),
    state("NM", "New Mexico", 78, 25, 40),
    state("NY", "New York", 70, 20, 30),
    state("NC", "North Carolina", 80, 25, 40),
    state("ND", "North Dakota", 80, 25, 40),
    state("OH", "Ohio", 75, 40, 45),
    state("OK", "Oklahoma", 80, 50, 60),
    state("OR", "Oregon", 80, 35, 45),
    state("PA", "Pennsylvania", 85, 18, 30),
    state("RI", "Rhode Island", 80, 25, 40),
    state("SC", "South Carolina", 80, 30, 45),
    state("SD", "South Dakota", 80, 25, 40),
    state("TN", "Tennessee", 80, 30, 45),
    state("TX", "Texas", 70, 30, 45),
    state("UT", "Utah", 80, 50, 60),
    state("VT", "Vermont", 80, 20, 30),
    state("VA", "Virginia", 80, 35, 45),
    state("WA", "Washington", 80, 40, 45),
    state("WV", "West Virginia", 80, 25, 40),
    state("WI", "Wisconsin", 80, 50, 60),
    state("WY", "Wyoming", 80, 25, 40),
];

/// Case-sensitive lookup by two-letter code.
#[must_use]
pub fn state_by_code(code: &str) -> Option<&'static StateInfo> {
    US_STATES.iter().find(|s| s.code == code)
}
