//! Match Record Types
//!
//! Shapes of the records served by the matches endpoint and pushed over
//! the matches channel. Keys are emitted in snake_case, the form the
//! backend produces; camelCase keys are accepted on input as well.

use serde::{Deserialize, Serialize};

/// Status tag the backend uses for matches in progress
pub const STATUS_LIVE: &str = "live";

/// A single fixture
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub id: i64,
    pub league: String,
    #[serde(alias = "homeTeam")]
    pub home_team: String,
    #[serde(alias = "awayTeam")]
    pub away_team: String,
    #[serde(alias = "homeScore")]
    pub home_score: u32,
    #[serde(alias = "awayScore")]
    pub away_score: u32,
    /// Kickoff timestamp, passed through as the backend formats it
    #[serde(alias = "kickoffTime")]
    pub kickoff_time: String,
    /// Open tag: scheduled, live, finished, ...
    pub status: String,
    /// In-match incidents, chronological as sent by the producer
    #[serde(default)]
    pub events: Vec<MatchEvent>,
    /// Present only while the match is live
    #[serde(
        default,
        alias = "currentMinute",
        skip_serializing_if = "Option::is_none"
    )]
    pub current_minute: Option<u32>,
}

/// A single in-match incident
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchEvent {
    pub minute: u32,
    pub team: String,
    pub player: String,
    /// Open tag: goal, yellow_card, substitution, ...
    #[serde(rename = "type")]
    pub kind: String,
    /// Player coming on, for substitutions
    #[serde(default, alias = "subIn", skip_serializing_if = "Option::is_none")]
    pub sub_in: Option<String>,
}

impl Match {
    /// Whether the backend reports this match as in progress
    pub fn is_live(&self) -> bool {
        self.status == STATUS_LIVE
    }

    /// Score line in `home - away` form
    pub fn score_line(&self) -> String {
        format!("{} - {}", self.home_score, self.away_score)
    }

    /// Events of the given kind, in producer order
    pub fn events_of<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a MatchEvent> + 'a {
        self.events.iter().filter(move |e| e.kind == kind)
    }
}

/// Decode a full snapshot (a JSON array of matches)
pub fn decode_snapshot(text: &str) -> Result<Vec<Match>, serde_json::Error> {
    serde_json::from_str(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAKE: &str = r#"[{
        "id": 7,
        "league": "Premier League",
        "home_team": "Arsenal",
        "away_team": "Chelsea",
        "home_score": 2,
        "away_score": 1,
        "kickoff_time": "2024-10-26T15:00:00",
        "status": "live",
        "events": [
            {"minute": 23, "team": "Arsenal", "player": "Bukayo Saka", "type": "goal"},
            {"minute": 75, "team": "Chelsea", "player": "Moises Caicedo", "type": "substitution", "sub_in": "Cole Palmer"}
        ],
        "current_minute": 78
    }]"#;

    #[test]
    fn test_decode_backend_snapshot() {
        let matches = decode_snapshot(SNAKE).unwrap();
        assert_eq!(matches.len(), 1);

        let m = &matches[0];
        assert_eq!(m.home_team, "Arsenal");
        assert_eq!(m.score_line(), "2 - 1");
        assert_eq!(m.current_minute, Some(78));
        assert!(m.is_live());
        assert_eq!(m.events[1].sub_in.as_deref(), Some("Cole Palmer"));
        assert_eq!(m.events_of("goal").count(), 1);
    }

    #[test]
    fn test_decode_camel_case_snapshot() {
        let text = r#"[{"id":1,"league":"A","homeTeam":"X","awayTeam":"Y","homeScore":1,"awayScore":0,"kickoffTime":"2024-01-01T00:00:00Z","status":"live","events":[],"currentMinute":12}]"#;
        let matches = decode_snapshot(text).unwrap();

        assert_eq!(
            matches,
            vec![Match {
                id: 1,
                league: "A".to_string(),
                home_team: "X".to_string(),
                away_team: "Y".to_string(),
                home_score: 1,
                away_score: 0,
                kickoff_time: "2024-01-01T00:00:00Z".to_string(),
                status: "live".to_string(),
                events: vec![],
                current_minute: Some(12),
            }]
        );
    }

    #[test]
    fn test_optional_fields_default() {
        // The backend omits events and current_minute for scheduled fixtures
        let text = r#"[{"id":3,"league":"La Liga","home_team":"Barcelona","away_team":"Real Madrid","home_score":0,"away_score":0,"kickoff_time":"2024-10-27T18:00:00","status":"scheduled"}]"#;
        let matches = decode_snapshot(text).unwrap();

        assert!(matches[0].events.is_empty());
        assert_eq!(matches[0].current_minute, None);
        assert!(!matches[0].is_live());
    }

    #[test]
    fn test_serialize_skips_absent_options() {
        let event = MatchEvent {
            minute: 11,
            team: "Manchester City".to_string(),
            player: "Erling Haaland".to_string(),
            kind: "goal".to_string(),
            sub_in: None,
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "goal");
        assert!(json.get("sub_in").is_none());
    }

    #[test]
    fn test_rejects_negative_score() {
        let text = r#"[{"id":1,"league":"A","home_team":"X","away_team":"Y","home_score":-1,"away_score":0,"kickoff_time":"t","status":"live"}]"#;
        assert!(decode_snapshot(text).is_err());
    }

    #[test]
    fn test_rejects_non_array() {
        assert!(decode_snapshot(r#"{"matches": []}"#).is_err());
        assert!(decode_snapshot("not json").is_err());
    }
}
