use crate::ftcscout::{
    AllianceScores, EventResponse, MatchEntry, QuickStat, QuickStatsResponse, Station,
    TeamEntry, TeamEventEntry, WireAlliance,
};
use crate::{AllianceScore, EventRef, MatchRecord, QuickStats, Stat, Team, TournamentLevel};
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use std::fmt;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

pub const FTCSCOUT_REST: &str = "https://api.ftcscout.org/rest/v1";
pub const DEFAULT_SEARCH_LIMIT: u32 = 100;

/// FTCScout REST client.
#[derive(Debug, Clone)]
pub struct FtcScoutApi {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl Default for FtcScoutApi {
    fn default() -> Self {
        Self::with_base_url(FTCSCOUT_REST)
    }
}

#[derive(Debug)]
pub enum ApiError {
    Network(reqwest::Error, String),
    Api(reqwest::Error, String),
    Parsing(reqwest::Error, String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            ApiError::Api(e, url) => write!(f, "API error for {url}: {e}"),
            ApiError::Parsing(e, url) => write!(f, "Parse error for {url}: {e}"),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Network(e, _) | ApiError::Api(e, _) | ApiError::Parsing(e, _) => Some(e),
        }
    }
}

impl FtcScoutApi {
    /// Point the client at another deployment of the REST API (or a test server).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .user_agent(concat!("ftctui/", env!("CARGO_PKG_VERSION"), " (terminal ftcscout client)"))
                .build()
                .unwrap_or_default(),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Free-text team search by name or number.
    pub async fn search_teams(&self, text: &str, limit: u32) -> ApiResult<Vec<Team>> {
        let url = format!("{}/teams/search", self.base_url);
        let limit = limit.to_string();
        let raw: Vec<TeamEntry> = self
            .get_with_query(&url, &[("searchText", text), ("limit", limit.as_str())])
            .await?;
        Ok(raw.into_iter().map(map_team).collect())
    }

    /// OPR values and ranks for one team. `None` when the team has no
    /// results in `season`.
    pub async fn fetch_quick_stats(&self, team_number: u32, season: u16) -> ApiResult<Option<QuickStats>> {
        let url = format!("{}/teams/{team_number}/quick-stats", self.base_url);
        let season = season.to_string();
        let raw: QuickStatsResponse = self.get_with_query(&url, &[("season", season.as_str())]).await?;
        Ok(map_quick_stats(raw))
    }

    /// Events a team attended in `season`, in API order.
    pub async fn fetch_team_events(&self, team_number: u32, season: u16) -> ApiResult<Vec<EventRef>> {
        let url = format!("{}/teams/{team_number}/events/{season}", self.base_url);
        let raw: Vec<TeamEventEntry> = self.get(&url).await?;
        Ok(raw.into_iter().map(map_team_event).collect())
    }

    /// Human-readable event name, if FTCScout knows the event.
    pub async fn fetch_event_name(&self, season: u16, event_code: &str) -> ApiResult<Option<String>> {
        let url = format!("{}/events/{season}/{event_code}", self.base_url);
        let raw: EventResponse = self.get(&url).await?;
        Ok(raw.name.filter(|n| !n.trim().is_empty()))
    }

    /// Matches at an event that involve `subject_team`, sorted by match id.
    pub async fn fetch_event_matches(
        &self,
        season: u16,
        event_code: &str,
        subject_team: u32,
    ) -> ApiResult<Vec<MatchRecord>> {
        let url = format!("{}/events/{season}/{event_code}/matches", self.base_url);
        let raw: Vec<MatchEntry> = self.get(&url).await?;
        Ok(map_event_matches(&raw, event_code, subject_team))
    }

    async fn get<T: Default + serde::de::DeserializeOwned>(&self, url: &str) -> ApiResult<T> {
        self.get_with_query(url, &[]).await
    }

    async fn get_with_query<T: Default + serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> ApiResult<T> {
        let response = self
            .client
            .get(url)
            .query(query)
            .header(CONTENT_TYPE, "application/json")
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.to_owned()))?;

        match response.error_for_status() {
            Ok(res) => res
                .json::<T>()
                .await
                .map_err(|e| ApiError::Parsing(e, url.to_owned())),
            Err(e) => {
                // Unknown team/event numbers come back as 4xx; treat as empty.
                if e.status().map(|s| s.is_client_error()).unwrap_or(false) {
                    Ok(T::default())
                } else {
                    Err(ApiError::Api(e, url.to_owned()))
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Mapping: FTCScout wire types → clean domain types
// ---------------------------------------------------------------------------

fn map_team(t: TeamEntry) -> Team {
    Team {
        number: t.number,
        name: t.name,
        city: t.city.unwrap_or_default(),
        state: t.state.unwrap_or_default(),
        country: t.country.unwrap_or_default(),
        rookie_year: t.rookie_year.unwrap_or_default(),
        school_name: t.school_name.filter(|s| !s.trim().is_empty()),
        sponsors: t.sponsors.unwrap_or_default(),
        stats: None,
    }
}

fn map_quick_stats(raw: QuickStatsResponse) -> Option<QuickStats> {
    if raw.tot.is_none() && raw.auto.is_none() && raw.dc.is_none() && raw.eg.is_none() {
        return None;
    }
    let stat = |s: Option<QuickStat>| {
        s.map(|s| Stat { value: s.value, rank: s.rank }).unwrap_or_default()
    };
    Some(QuickStats {
        total: stat(raw.tot),
        auto: stat(raw.auto),
        teleop: stat(raw.dc),
        endgame: stat(raw.eg),
    })
}

fn map_team_event(e: TeamEventEntry) -> EventRef {
    let is_valid = e.stats.as_ref().is_some_and(|s| !s.is_null());
    EventRef::new(e.event_code, is_valid)
}

/// Keep the matches `subject_team` played in, normalize them and sort by id.
pub fn map_event_matches(raw: &[MatchEntry], event_code: &str, subject_team: u32) -> Vec<MatchRecord> {
    let mut matches: Vec<MatchRecord> = raw
        .iter()
        .filter(|m| m.teams.iter().any(|t| t.team_number == subject_team))
        .map(|m| map_match(m, event_code, subject_team))
        .collect();
    matches.sort_by_key(|m| m.match_id);
    matches
}

fn map_match(m: &MatchEntry, event_code: &str, subject_team: u32) -> MatchRecord {
    let slot = |alliance: WireAlliance, station: Station| {
        m.teams
            .iter()
            .find(|t| t.alliance == alliance && t.station == station)
            .map(|t| t.team_number)
            .unwrap_or(0)
    };

    let scores = m.scores.clone().unwrap_or_default();

    MatchRecord {
        match_id: m.id,
        event_code: event_code.to_owned(),
        level: parse_level(&m.tournament_level),
        series: m.series,
        red: map_alliance_score(scores.red.as_ref()),
        blue: map_alliance_score(scores.blue.as_ref()),
        red_teams: [slot(WireAlliance::Red, Station::One), slot(WireAlliance::Red, Station::Two)],
        blue_teams: [slot(WireAlliance::Blue, Station::One), slot(WireAlliance::Blue, Station::Two)],
        subject_team,
    }
}

fn map_alliance_score(s: Option<&AllianceScores>) -> AllianceScore {
    let Some(s) = s else {
        return AllianceScore::default();
    };
    AllianceScore {
        total: s.total_points.unwrap_or_default(),
        auto: s.auto_points.unwrap_or_default(),
        teleop: s.dc_points.unwrap_or_default(),
        endgame: s.dc_park_points.unwrap_or_default(),
    }
}

fn parse_level(s: &str) -> TournamentLevel {
    match s {
        "Quals" => TournamentLevel::Qualification,
        _ => TournamentLevel::Playoff,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Alliance;

    fn match_entry(json: serde_json::Value) -> MatchEntry {
        serde_json::from_value(json).expect("match fixture should parse")
    }

    fn qual(id: u32, red: [u32; 2], blue: [u32; 2], red_total: i32, blue_total: i32) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "tournamentLevel": "Quals",
            "series": 0,
            "teams": [
                { "teamNumber": red[0], "alliance": "Red", "station": "One" },
                { "teamNumber": red[1], "alliance": "Red", "station": "Two" },
                { "teamNumber": blue[0], "alliance": "Blue", "station": "One" },
                { "teamNumber": blue[1], "alliance": "Blue", "station": "Two" }
            ],
            "scores": {
                "red": { "totalPoints": red_total, "autoPoints": 10, "dcPoints": 30, "dcParkPoints": 5 },
                "blue": { "totalPoints": blue_total, "autoPoints": 12, "dcPoints": 20, "dcParkPoints": 3 }
            }
        })
    }

    #[test]
    fn red_station_one_match_normalizes() {
        let raw = vec![match_entry(qual(7, [1000, 1001], [2000, 2001], 50, 40))];
        let matches = map_event_matches(&raw, "USTXHOQ", 1000);

        assert_eq!(matches.len(), 1);
        let m = &matches[0];
        assert_eq!(m.alliance(), Alliance::Red);
        assert!(m.is_win());
        assert!(!m.is_tie());
        assert_eq!(m.red_teams[0], 1000);
        assert_eq!(m.blue_teams, [2000, 2001]);
        assert_eq!(m.red.auto, 10);
        assert_eq!(m.blue.teleop, 20);
        assert_eq!(m.red.endgame, 5);
        assert_eq!(m.short_name(), "Qual 7");
        assert_eq!(m.event_code, "USTXHOQ");
    }

    #[test]
    fn matches_without_subject_are_filtered_and_rest_sorted() {
        let raw = vec![
            match_entry(qual(30, [1000, 1], [2, 3], 1, 2)),
            match_entry(qual(10, [4, 5], [1000, 6], 1, 2)),
            match_entry(qual(15, [7, 8], [9, 11], 1, 2)),
            match_entry(qual(20, [12, 1000], [13, 14], 1, 2)),
        ];
        let ids: Vec<u32> = map_event_matches(&raw, "E1", 1000).iter().map(|m| m.match_id).collect();
        assert_eq!(ids, vec![10, 20, 30]);
    }

    #[test]
    fn missing_slot_resolves_to_zero() {
        let raw = vec![match_entry(serde_json::json!({
            "id": 3,
            "tournamentLevel": "Quals",
            "teams": [
                { "teamNumber": 1000, "alliance": "Red", "station": "One" },
                { "teamNumber": 2000, "alliance": "Blue", "station": "One" }
            ],
            "scores": null
        }))];
        let m = &map_event_matches(&raw, "E1", 1000)[0];
        assert_eq!(m.red_teams, [1000, 0]);
        assert_eq!(m.blue_teams, [2000, 0]);
        assert_eq!(m.red, AllianceScore::default());
        assert!(m.is_tie());
    }

    #[test]
    fn missing_score_fields_default_to_zero() {
        let raw = vec![match_entry(serde_json::json!({
            "id": 4,
            "tournamentLevel": "Quals",
            "teams": [{ "teamNumber": 1000, "alliance": "Blue", "station": "Two" }],
            "scores": { "red": { "totalPoints": 12 }, "blue": { "autoPoints": 8 } }
        }))];
        let m = &map_event_matches(&raw, "E1", 1000)[0];
        assert_eq!(m.red.total, 12);
        assert_eq!(m.blue.total, 0);
        assert_eq!(m.blue.auto, 8);
        assert_eq!(m.alliance(), Alliance::Blue);
        assert!(!m.is_win());
    }

    #[test]
    fn playoff_matches_are_labelled_by_series() {
        let mut json = qual(9001, [1000, 1], [2, 3], 80, 80);
        json["tournamentLevel"] = "DoubleElim".into();
        json["series"] = 4.into();
        let m = &map_event_matches(&[match_entry(json)], "E1", 1000)[0];
        assert_eq!(m.level, TournamentLevel::Playoff);
        assert_eq!(m.short_name(), "Playoff 4");
        assert_eq!(m.long_name(), "Playoff 4");
    }

    #[test]
    fn unknown_station_does_not_fill_a_slot() {
        let raw = vec![match_entry(serde_json::json!({
            "id": 5,
            "tournamentLevel": "Quals",
            "teams": [
                { "teamNumber": 1000, "alliance": "Red", "station": "NotOnField" },
                { "teamNumber": 2000, "alliance": "Blue", "station": "One" }
            ]
        }))];
        let m = &map_event_matches(&raw, "E1", 1000)[0];
        assert_eq!(m.red_teams, [0, 0]);
        // Not seated red, so the record is read from blue's side.
        assert_eq!(m.alliance(), Alliance::Blue);
    }

    #[test]
    fn team_event_validity_follows_stats_container() {
        let raw: Vec<TeamEventEntry> = serde_json::from_value(serde_json::json!([
            { "eventCode": "E1", "stats": {} },
            { "eventCode": "E2", "stats": null },
            { "eventCode": "E3" }
        ]))
        .unwrap();
        let events: Vec<EventRef> = raw.into_iter().map(map_team_event).collect();
        assert!(events[0].is_valid);
        assert!(!events[1].is_valid);
        assert!(!events[2].is_valid);
    }

    #[test]
    fn quick_stats_absent_maps_to_none() {
        assert_eq!(map_quick_stats(QuickStatsResponse::default()), None);
    }

    // -----------------------------------------------------------------------
    // HTTP tests against a local mock server
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn search_sends_query_and_maps_teams() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/teams/search")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("searchText".into(), "robo tigers".into()),
                mockito::Matcher::UrlEncoded("limit".into(), "100".into()),
            ]))
            .match_header("content-type", "application/json")
            .with_header("content-type", "application/json")
            .with_body(
                r#"[{"number":16236,"name":"Robo Tigers","city":"Austin","state":"TX","country":"USA",
                    "rookieYear":2019,"schoolName":"","sponsors":null}]"#,
            )
            .create_async()
            .await;

        let api = FtcScoutApi::with_base_url(server.url());
        let teams = api.search_teams("robo tigers", DEFAULT_SEARCH_LIMIT).await.unwrap();

        mock.assert_async().await;
        assert_eq!(teams.len(), 1);
        assert_eq!(teams[0].number, 16236);
        assert_eq!(teams[0].location(), "Austin, TX, USA");
        assert_eq!(teams[0].school_name, None);
        assert!(teams[0].sponsors.is_empty());
        assert!(teams[0].stats.is_none());
    }

    #[tokio::test]
    async fn quick_stats_map_named_metrics() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/teams/1000/quick-stats")
            .match_query(mockito::Matcher::UrlEncoded("season".into(), "2024".into()))
            .with_body(
                r#"{"season":2024,"number":1000,
                    "tot":{"value":101.5,"rank":3},"auto":{"value":20.25,"rank":10},
                    "dc":{"value":60.0,"rank":5},"eg":{"value":21.25,"rank":1},"count":5000}"#,
            )
            .create_async()
            .await;

        let api = FtcScoutApi::with_base_url(server.url());
        let stats = api.fetch_quick_stats(1000, 2024).await.unwrap().unwrap();
        assert_eq!(stats.total, Stat { value: 101.5, rank: 3 });
        assert_eq!(stats.teleop.rank, 5);
        assert_eq!(stats.endgame.value, 21.25);
    }

    #[tokio::test]
    async fn client_error_reads_as_empty() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/teams/99999/events/2024")
            .with_status(404)
            .create_async()
            .await;

        let api = FtcScoutApi::with_base_url(server.url());
        let events = api.fetch_team_events(99999, 2024).await.unwrap();
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn server_error_is_reported() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/events/2024/E1")
            .with_status(502)
            .create_async()
            .await;

        let api = FtcScoutApi::with_base_url(server.url());
        let err = api.fetch_event_name(2024, "E1").await.unwrap_err();
        assert!(matches!(err, ApiError::Api(_, _)));
    }

    #[tokio::test]
    async fn malformed_body_is_a_parse_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/events/2024/E1/matches")
            .with_body("{not json")
            .create_async()
            .await;

        let api = FtcScoutApi::with_base_url(server.url());
        let err = api.fetch_event_matches(2024, "E1", 1000).await.unwrap_err();
        assert!(matches!(err, ApiError::Parsing(_, _)));
    }
}
