pub mod aggregate;
pub mod client;
pub mod ftcscout;

use chrono::{DateTime, Datelike, Utc};

pub const FTCSCOUT_WEB: &str = "https://ftcscout.org";

/// FTC seasons kick off in September and are named after that calendar year.
pub fn current_season(now: DateTime<Utc>) -> u16 {
    let year = if now.month() >= 9 { now.year() } else { now.year() - 1 };
    year as u16
}

// ---------------------------------------------------------------------------
// Domain types: clean model, independent of FTCScout wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Team {
    pub number: u32,
    pub name: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub rookie_year: u16,
    pub school_name: Option<String>,
    pub sponsors: Vec<String>,
    /// None until quick-stats have been fetched for this team.
    pub stats: Option<QuickStats>,
}

impl Team {
    /// "City, State, Country" with empty parts skipped.
    pub fn location(&self) -> String {
        [&self.city, &self.state, &self.country]
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn web_url(&self) -> String {
        format!("{FTCSCOUT_WEB}/teams/{}", self.number)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Stat {
    pub value: f64,
    pub rank: u32,
}

/// OPR breakdown and ranks among all teams for one season.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct QuickStats {
    pub total: Stat,
    pub auto: Stat,
    pub teleop: Stat,
    pub endgame: Stat,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventRef {
    pub code: String,
    /// Filled by the event metadata fetch, independently of `matches`.
    pub display_name: Option<String>,
    /// False when the team has no stats at this event; such events are never
    /// queried for matches.
    pub is_valid: bool,
    pub matches: Vec<MatchRecord>,
}

impl EventRef {
    pub fn new(code: impl Into<String>, is_valid: bool) -> Self {
        Self { code: code.into(), is_valid, ..Self::default() }
    }

    pub fn needs_matches(&self) -> bool {
        self.is_valid && self.matches.is_empty()
    }

    pub fn title(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.code)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Alliance {
    #[default]
    Red,
    Blue,
}

impl Alliance {
    pub fn label(&self) -> &'static str {
        match self {
            Alliance::Red => "red",
            Alliance::Blue => "blue",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TournamentLevel {
    #[default]
    Qualification,
    Playoff,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Loss,
    Tie,
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Win => "Win",
            Outcome::Loss => "Loss",
            Outcome::Tie => "Tie",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllianceScore {
    pub total: i32,
    pub auto: i32,
    pub teleop: i32,
    pub endgame: i32,
}

/// One match seen from the perspective of `subject_team`.
///
/// Alliance membership and the result are computed from the slot and score
/// fields on every call, so they can never disagree with them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchRecord {
    pub match_id: u32,
    pub event_code: String,
    pub level: TournamentLevel,
    pub series: u32,
    pub red: AllianceScore,
    pub blue: AllianceScore,
    /// Station one, station two. 0 = empty slot.
    pub red_teams: [u32; 2],
    pub blue_teams: [u32; 2],
    pub subject_team: u32,
}

impl MatchRecord {
    pub fn alliance(&self) -> Alliance {
        if self.red_teams.contains(&self.subject_team) {
            Alliance::Red
        } else {
            Alliance::Blue
        }
    }

    pub fn is_tie(&self) -> bool {
        self.red.total == self.blue.total
    }

    pub fn is_win(&self) -> bool {
        match self.alliance() {
            Alliance::Red => self.red.total > self.blue.total,
            Alliance::Blue => self.blue.total > self.red.total,
        }
    }

    pub fn outcome(&self) -> Outcome {
        if self.is_tie() {
            Outcome::Tie
        } else if self.is_win() {
            Outcome::Win
        } else {
            Outcome::Loss
        }
    }

    pub fn short_name(&self) -> String {
        match self.level {
            TournamentLevel::Qualification => format!("Qual {}", self.match_id),
            TournamentLevel::Playoff => format!("Playoff {}", self.series),
        }
    }

    pub fn long_name(&self) -> String {
        match self.level {
            TournamentLevel::Qualification => format!("Qualification {}", self.match_id),
            TournamentLevel::Playoff => format!("Playoff {}", self.series),
        }
    }

    /// Unique across events; match ids alone repeat between events.
    pub fn list_id(&self) -> String {
        format!("{}{}", self.match_id, self.event_code)
    }
}
