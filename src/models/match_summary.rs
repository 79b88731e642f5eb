use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const NOT_AVAILABLE: &str = "N/A";
pub const UNKNOWN: &str = "Unknown";
pub const LIVE: &str = "LIVE";
pub const ANNOTATION_KEY: &str = "klurgecustom";
pub const NO_LIVE_GAME: &str = "no game is live";

/// One match as served by the API.
///
/// Every field is a string, scores and timestamps included, so irregular
/// upstream formatting never fails a row. Extra string keys (the score
/// annotations) are flattened into the same JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchSummary {
    pub team1: String,
    pub team2: String,
    pub flag1: String,
    pub flag2: String,
    pub team1_logo: String,
    pub team2_logo: String,
    pub score1: String,
    pub score2: String,
    pub team1_round_ct: String,
    pub team1_round_t: String,
    pub team2_round_ct: String,
    pub team2_round_t: String,
    pub map_number: String,
    pub current_map: String,
    pub time_until_match: String,
    pub match_event: String,
    pub match_series: String,
    pub unix_timestamp: String,
    pub match_page: String,
    #[serde(flatten)]
    pub annotations: BTreeMap<String, String>,
}

impl MatchSummary {
    /// Placeholder returned as the only element when nothing is live.
    pub fn no_live_sentinel() -> Self {
        let mut sentinel = Self::default();
        sentinel
            .annotations
            .insert(ANNOTATION_KEY.to_string(), NO_LIVE_GAME.to_string());
        sentinel
    }

    /// Record for a match page fetched directly, before any field is found.
    pub fn unresolved(match_page: impl Into<String>) -> Self {
        Self {
            team1: UNKNOWN.into(),
            team2: UNKNOWN.into(),
            score1: "0".into(),
            score2: "0".into(),
            team1_round_ct: NOT_AVAILABLE.into(),
            team1_round_t: NOT_AVAILABLE.into(),
            team2_round_ct: NOT_AVAILABLE.into(),
            team2_round_t: NOT_AVAILABLE.into(),
            map_number: UNKNOWN.into(),
            current_map: UNKNOWN.into(),
            time_until_match: UNKNOWN.into(),
            match_event: UNKNOWN.into(),
            match_series: UNKNOWN.into(),
            match_page: match_page.into(),
            ..Self::default()
        }
    }

    pub fn score_line(&self) -> String {
        format!(
            "{} {} : {} {}",
            self.team1, self.score1, self.team2, self.score2
        )
    }
}

/// Detail-page fields merged into a live row.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchDetail {
    pub logos: Vec<String>,
    pub current_map: String,
    pub map_number: String,
}

impl Default for MatchDetail {
    fn default() -> Self {
        Self {
            logos: Vec::new(),
            current_map: UNKNOWN.to_string(),
            map_number: UNKNOWN.to_string(),
        }
    }
}

impl MatchDetail {
    pub fn apply_to(self, summary: &mut MatchSummary) {
        let mut logos = self.logos.into_iter();
        summary.team1_logo = logos.next().unwrap_or_default();
        summary.team2_logo = logos.next().unwrap_or_default();
        summary.current_map = self.current_map;
        summary.map_number = self.map_number;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_is_all_empty_except_marker() {
        let json = serde_json::to_value(MatchSummary::no_live_sentinel()).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), 20);
        for (key, value) in object {
            if key == ANNOTATION_KEY {
                assert_eq!(value, NO_LIVE_GAME);
            } else {
                assert_eq!(value, "", "{key} should be empty");
            }
        }
    }

    #[test]
    fn detail_fills_missing_second_logo_with_empty() {
        let mut summary = MatchSummary::default();
        MatchDetail {
            logos: vec!["https://owcdn.net/a.png".into()],
            current_map: "Ascent".into(),
            map_number: "2".into(),
        }
        .apply_to(&mut summary);

        assert_eq!(summary.team1_logo, "https://owcdn.net/a.png");
        assert_eq!(summary.team2_logo, "");
        assert_eq!(summary.current_map, "Ascent");
        assert_eq!(summary.map_number, "2");
    }
}
