//! Selector rules for the vlr.gg home page and match pages.
//!
//! Parsing is synchronous and owns nothing from the document once it
//! returns, so callers can hold the results across `.await` points.

use chrono::DateTime;
use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::error::ExtractError;
use crate::models::match_summary::{
    MatchDetail, MatchSummary, ANNOTATION_KEY, LIVE, NOT_AVAILABLE, UNKNOWN,
};

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector is valid")
}

lazy_static! {
    static ref MATCH_ROWS: Selector = selector(".js-home-matches-upcoming a.wf-module-item");
    static ref LIVE_MARKER: Selector = selector(".h-match-eta.mod-live");
    static ref TEAM: Selector = selector(".h-match-team");
    static ref TEAM_NAME: Selector = selector(".h-match-team-name");
    static ref FLAG: Selector = selector(".flag");
    static ref TEAM_SCORE: Selector = selector(".h-match-team-score");
    static ref ROUNDS_CT: Selector = selector(".h-match-team-rounds .mod-ct");
    static ref ROUNDS_T: Selector = selector(".h-match-team-rounds .mod-t");
    static ref EVENT: Selector = selector(".h-match-preview-event");
    static ref SERIES: Selector = selector(".h-match-preview-series");
    static ref TIMESTAMP: Selector = selector(".moment-tz-convert");

    static ref HEADER_LOGOS: Selector = selector(".match-header-vs img");
    static ref HEADER_TEAM_NAMES: Selector = selector(".match-header-vs .team-name");
    static ref HEADER_SCORES: Selector = selector(".match-header-vs .score");
    static ref LIVE_MAP_TAB: Selector =
        selector(".vm-stats-gamesnav-item.js-map-switch.mod-active.mod-live");
    static ref DIV: Selector = selector("div");

    static ref LEADING_DIGITS: Regex = Regex::new(r"^\d+").expect("static regex is valid");
}

/// What the home page says about live matches.
#[derive(Debug)]
pub enum Listing {
    /// No row carries the live marker.
    NoLiveMatches,
    /// One entry per live row, in page order. A row the selectors could not
    /// read is an `Err` so the caller can log and drop it.
    Live(Vec<Result<MatchSummary, ExtractError>>),
}

pub fn parse_listing(html: &str, base_url: &str) -> Listing {
    let document = Html::parse_document(html);
    let rows: Vec<_> = document
        .select(&MATCH_ROWS)
        .filter(|row| row.select(&LIVE_MARKER).next().is_some())
        .map(|row| parse_live_row(row, base_url))
        .collect();

    if rows.is_empty() {
        Listing::NoLiveMatches
    } else {
        Listing::Live(rows)
    }
}

struct TeamRow {
    name: String,
    flag: String,
    score: String,
    round_ct: String,
    round_t: String,
}

fn parse_team(team: ElementRef) -> Result<TeamRow, ExtractError> {
    let flag = team
        .select(&FLAG)
        .next()
        .ok_or(ExtractError::MissingElement(".flag"))?
        .value()
        .attr("class")
        .ok_or(ExtractError::MissingAttribute {
            element: ".flag",
            attr: "class",
        })?;

    Ok(TeamRow {
        name: required_text(team, &TEAM_NAME, ".h-match-team-name")?,
        flag: normalize_flag(flag),
        score: required_text(team, &TEAM_SCORE, ".h-match-team-score")?,
        round_ct: optional_text(team, &ROUNDS_CT).unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        round_t: optional_text(team, &ROUNDS_T).unwrap_or_else(|| NOT_AVAILABLE.to_string()),
    })
}

fn parse_live_row(row: ElementRef, base_url: &str) -> Result<MatchSummary, ExtractError> {
    let teams = row
        .select(&TEAM)
        .map(parse_team)
        .collect::<Result<Vec<_>, _>>()?;
    let count = teams.len();
    let mut teams = teams.into_iter();
    let (team1, team2) = match (teams.next(), teams.next()) {
        (Some(team1), Some(team2)) => (team1, team2),
        _ => return Err(ExtractError::TeamCount(count)),
    };

    let timestamp = row
        .select(&TIMESTAMP)
        .next()
        .ok_or(ExtractError::MissingElement(".moment-tz-convert"))?
        .value()
        .attr("data-utc-ts")
        .ok_or(ExtractError::MissingAttribute {
            element: ".moment-tz-convert",
            attr: "data-utc-ts",
        })?;
    let href = row.value().attr("href").ok_or(ExtractError::MissingAttribute {
        element: "a.wf-module-item",
        attr: "href",
    })?;

    Ok(MatchSummary {
        team1: team1.name,
        team2: team2.name,
        flag1: team1.flag,
        flag2: team2.flag,
        score1: team1.score,
        score2: team2.score,
        team1_round_ct: team1.round_ct,
        team1_round_t: team1.round_t,
        team2_round_ct: team2.round_ct,
        team2_round_t: team2.round_t,
        map_number: UNKNOWN.to_string(),
        current_map: UNKNOWN.to_string(),
        time_until_match: LIVE.to_string(),
        match_event: required_text(row, &EVENT, ".h-match-preview-event")?,
        match_series: required_text(row, &SERIES, ".h-match-preview-series")?,
        unix_timestamp: format_timestamp(timestamp)?,
        match_page: absolute_url(base_url, href),
        ..MatchSummary::default()
    })
}

/// Logos and the map currently being played, from a match page.
pub fn parse_detail(html: &str) -> MatchDetail {
    let document = Html::parse_document(html);

    let logos = document
        .select(&HEADER_LOGOS)
        .take(2)
        .map(|img| img.value().attr("src").map(absolute_logo).unwrap_or_default())
        .collect();

    let map_text = document
        .select(&LIVE_MAP_TAB)
        .next()
        .and_then(|tab| tab.select(&DIV).next())
        .map(|div| element_text(div).replace(['\n', '\t'], ""));

    let (current_map, map_number) = match map_text {
        Some(text) => (
            LEADING_DIGITS.replace(&text, "").trim().to_string(),
            LEADING_DIGITS
                .find(&text)
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(|| UNKNOWN.to_string()),
        ),
        None => (UNKNOWN.to_string(), UNKNOWN.to_string()),
    };

    MatchDetail {
        logos,
        current_map,
        map_number,
    }
}

/// Reduced record for a match that is not in the live list.
pub fn parse_match_page(html: &str, url: &str) -> MatchSummary {
    let document = Html::parse_document(html);
    let mut summary = MatchSummary::unresolved(url);

    let names: Vec<_> = document.select(&HEADER_TEAM_NAMES).map(element_text).collect();
    if let [team1, team2, ..] = names.as_slice() {
        summary.team1 = team1.clone();
        summary.team2 = team2.clone();
    }

    let scores: Vec<_> = document.select(&HEADER_SCORES).map(element_text).collect();
    if let [score1, score2, ..] = scores.as_slice() {
        summary.score1 = score1.clone();
        summary.score2 = score2.clone();
    }

    let logos: Vec<_> = document
        .select(&HEADER_LOGOS)
        .map(|img| img.value().attr("src").map(absolute_logo).unwrap_or_default())
        .collect();
    if let [logo1, logo2, ..] = logos.as_slice() {
        summary.team1_logo = logo1.clone();
        summary.team2_logo = logo2.clone();
    }

    summary
}

/// Drops every `" mod-"` and then turns `"16"` into `"_"`.
pub fn normalize_flag(class: &str) -> String {
    class.replace(" mod-", "").replace("16", "_")
}

pub fn absolute_url(base_url: &str, href: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        href.trim_start_matches('/')
    )
}

fn absolute_logo(src: &str) -> String {
    if src.starts_with("http://") || src.starts_with("https://") {
        src.to_string()
    } else {
        format!("https:{src}")
    }
}

/// `"%Y-%m-%d %H:%M:%S"` in UTC from integer epoch seconds.
pub fn format_timestamp(raw: &str) -> Result<String, ExtractError> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .ok_or_else(|| ExtractError::InvalidTimestamp(raw.to_string()))
}

/// Adds `klurgecustom`, `klurgecustom2`, ... holding each match's score line.
pub fn annotate_scores(matches: &mut [MatchSummary]) {
    for (idx, summary) in matches.iter_mut().enumerate() {
        let key = if idx == 0 {
            ANNOTATION_KEY.to_string()
        } else {
            format!("{}{}", ANNOTATION_KEY, idx + 1)
        };
        let line = summary.score_line();
        summary.annotations.insert(key, line);
    }
}

fn element_text(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn optional_text(parent: ElementRef, selector: &Selector) -> Option<String> {
    parent.select(selector).next().map(element_text)
}

fn required_text(
    parent: ElementRef,
    selector: &Selector,
    name: &'static str,
) -> Result<String, ExtractError> {
    optional_text(parent, selector).ok_or(ExtractError::MissingElement(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://www.vlr.gg";
    const LISTING: &str = include_str!("../../tests/fixtures/listing.html");
    const LISTING_IDLE: &str = include_str!("../../tests/fixtures/listing_idle.html");
    const DETAIL: &str = include_str!("../../tests/fixtures/match_detail.html");

    fn live_rows(html: &str) -> Vec<Result<MatchSummary, ExtractError>> {
        match parse_listing(html, BASE) {
            Listing::Live(rows) => rows,
            Listing::NoLiveMatches => panic!("expected live rows"),
        }
    }

    #[test]
    fn listing_keeps_only_live_rows_in_order() {
        let rows = live_rows(LISTING);
        assert_eq!(rows.len(), 3);

        let first = rows[0].as_ref().unwrap();
        assert_eq!(first.team1, "Sentinels");
        assert_eq!(first.team2, "FNATIC");
        assert_eq!(first.flag1, "flagus");
        assert_eq!(first.flag2, "flageu");
        assert_eq!((first.score1.as_str(), first.score2.as_str()), ("1", "0"));
        assert_eq!(first.team1_round_ct, "7");
        assert_eq!(first.team1_round_t, "5");
        assert_eq!(first.team2_round_ct, "3");
        assert_eq!(first.team2_round_t, "4");
        assert_eq!(first.match_event, "Champions Tour 2024: Masters Madrid");
        assert_eq!(first.match_series, "Playoffs: Upper Final");
        assert_eq!(first.unix_timestamp, "2024-03-09 16:00:00");
        assert_eq!(first.time_until_match, LIVE);
        assert_eq!(
            first.match_page,
            "https://www.vlr.gg/1001/sentinels-vs-fnatic-champions-tour-2024-masters-madrid-upper-final"
        );
        assert_eq!(first.current_map, UNKNOWN);

        assert_eq!(rows[1].as_ref().unwrap().team1, "Paper Rex");
    }

    #[test]
    fn missing_round_info_defaults_to_not_available() {
        let rows = live_rows(LISTING);
        let second = rows[1].as_ref().unwrap();
        assert_eq!(second.team1_round_ct, NOT_AVAILABLE);
        assert_eq!(second.team1_round_t, NOT_AVAILABLE);
        assert_eq!(second.team2_round_ct, "9");
        assert_eq!(second.team2_round_t, NOT_AVAILABLE);
        assert_eq!(second.unix_timestamp, "2024-03-09 17:00:00");
    }

    #[test]
    fn broken_row_is_an_error_not_a_panic() {
        let rows = live_rows(LISTING);
        assert_eq!(
            rows[2],
            Err(ExtractError::MissingElement(".h-match-team-name"))
        );
    }

    #[test]
    fn no_live_rows() {
        assert!(matches!(
            parse_listing(LISTING_IDLE, BASE),
            Listing::NoLiveMatches
        ));
        assert!(matches!(
            parse_listing("<html><body></body></html>", BASE),
            Listing::NoLiveMatches
        ));
    }

    #[test]
    fn single_team_row_reports_team_count() {
        let html = r#"<div class="js-home-matches-upcoming">
            <a class="wf-module-item" href="/9">
              <div class="h-match-eta mod-live">LIVE</div>
              <div class="h-match-team">
                <div class="h-match-team-name">Solo</div>
                <span class="flag mod-un"></span>
                <div class="h-match-team-score">0</div>
              </div>
            </a></div>"#;
        assert_eq!(live_rows(html), vec![Err(ExtractError::TeamCount(1))]);
    }

    #[test]
    fn flag_transform() {
        assert_eq!(normalize_flag("mod-us mod-16"), "mod-us_");
        assert_eq!(normalize_flag("flag mod-us mod-16"), "flagus_");
        assert_eq!(normalize_flag("flag mod-us"), "flagus");
        assert_eq!(normalize_flag("flag"), "flag");
        assert_eq!(normalize_flag(&normalize_flag("flag")), "flag");
    }

    #[test]
    fn detail_page_logos_and_live_map() {
        let detail = parse_detail(DETAIL);
        assert_eq!(
            detail.logos,
            vec![
                "https://owcdn.net/img/62875027c8e06.png".to_string(),
                "https://owcdn.net/img/62a40cc2b5e29.png".to_string(),
            ]
        );
        assert_eq!(detail.map_number, "2");
        assert_eq!(detail.current_map, "Lotus");
    }

    #[test]
    fn detail_without_live_map_is_unknown() {
        let detail =
            parse_detail("<html><body><div class=\"match-header-vs\"></div></body></html>");
        assert_eq!(detail, MatchDetail::default());
    }

    #[test]
    fn match_page_reduced_record() {
        let summary = parse_match_page(DETAIL, "https://www.vlr.gg/1001");
        assert_eq!(summary.team1, "Sentinels");
        assert_eq!(summary.team2, "FNATIC");
        assert_eq!(summary.score1, "1");
        assert_eq!(summary.score2, "0");
        assert_eq!(summary.team1_logo, "https://owcdn.net/img/62875027c8e06.png");
        assert_eq!(summary.team1_round_ct, NOT_AVAILABLE);
        assert_eq!(summary.match_event, UNKNOWN);
        assert_eq!(summary.unix_timestamp, "");
        assert_eq!(summary.match_page, "https://www.vlr.gg/1001");

        let empty = parse_match_page("<html></html>", "https://www.vlr.gg/5");
        assert_eq!(empty, MatchSummary::unresolved("https://www.vlr.gg/5"));
    }

    #[test]
    fn bad_timestamp() {
        assert_eq!(
            format_timestamp("soon"),
            Err(ExtractError::InvalidTimestamp("soon".into()))
        );
        assert_eq!(format_timestamp("0").unwrap(), "1970-01-01 00:00:00");
    }

    #[test]
    fn annotations_are_numbered_from_the_second_match() {
        let mut matches = vec![
            MatchSummary {
                team1: "Sentinels".into(),
                score1: "1".into(),
                team2: "FNATIC".into(),
                score2: "0".into(),
                ..MatchSummary::default()
            },
            MatchSummary {
                team1: "Paper Rex".into(),
                score1: "0".into(),
                team2: "DRX".into(),
                score2: "1".into(),
                ..MatchSummary::default()
            },
        ];
        annotate_scores(&mut matches);

        assert_eq!(matches[0].annotations["klurgecustom"], "Sentinels 1 : FNATIC 0");
        assert_eq!(matches[1].annotations["klurgecustom2"], "Paper Rex 0 : DRX 1");
        assert_eq!(matches[0].annotations.len(), 1);
        assert_eq!(matches[1].annotations.len(), 1);
    }
}
