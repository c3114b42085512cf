/// FTCScout REST raw wire types: serde shapes for deserializing responses.
/// These map to the clean domain types in client.rs.
/// Base: https://api.ftcscout.org/rest/v1
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Teams
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TeamEntry {
    pub number: u32,
    #[serde(default)]
    pub name: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub rookie_year: Option<u16>,
    pub school_name: Option<String>,
    pub sponsors: Option<Vec<String>>,
}

/// `/teams/{number}/quick-stats`. Every metric is absent when the team has
/// not played in the requested season.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct QuickStatsResponse {
    pub tot: Option<QuickStat>,
    pub auto: Option<QuickStat>,
    pub dc: Option<QuickStat>,
    pub eg: Option<QuickStat>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct QuickStat {
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub rank: u32,
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TeamEventEntry {
    pub event_code: String,
    /// Null (or missing) when the team has no results at the event.
    #[serde(default)]
    pub stats: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct EventResponse {
    pub name: Option<String>,
    pub code: Option<String>,
}

// ---------------------------------------------------------------------------
// Matches
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MatchEntry {
    pub id: u32,
    /// "Quals", "Semis", "Finals", "DoubleElim".
    #[serde(default)]
    pub tournament_level: String,
    #[serde(default)]
    pub series: u32,
    #[serde(default)]
    pub teams: Vec<MatchTeam>,
    pub scores: Option<MatchScores>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MatchTeam {
    pub team_number: u32,
    pub alliance: WireAlliance,
    pub station: Station,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum WireAlliance {
    Red,
    Blue,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum Station {
    One,
    Two,
    #[serde(other)]
    Other,
}

/// Remote-event seasons carry a flat score object instead of red/blue; those
/// deserialize with both sides absent.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct MatchScores {
    pub red: Option<AllianceScores>,
    pub blue: Option<AllianceScores>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AllianceScores {
    pub total_points: Option<i32>,
    pub auto_points: Option<i32>,
    pub dc_points: Option<i32>,
    pub dc_park_points: Option<i32>,
}
