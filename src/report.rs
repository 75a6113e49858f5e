//! CSV report sheets for a scan
//!
//! Four sheets are written per run: `Picks`, `Player Props`, `Game Summary`
//! and `Audit`, each to `NBA_<date>_<Conf>_<Sheet>.csv`.

use chrono::NaiveDate;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::data::mapping::Conference;
use crate::models::{
    EdgeRecord, GameOdds, GameSummary, Market, MarketKey, MarketType, PricingMode, RankingBatch,
};

pub const PICKS_HEADERS: [&str; 14] = [
    "Tip (ET)",
    "Matchup (AWAY @ HOME)",
    "Market",
    "Side/Player",
    "Book",
    "Line/Price",
    "Fair (Model)",
    "Book (De-vig)",
    "Diff% / ΔLine",
    "Edge %",
    "Kelly %",
    "Risk",
    "Notes",
    "Pulled At",
];

pub const GAME_SUMMARY_HEADERS: [&str; 10] = [
    "Tip (ET)",
    "Matchup",
    "Conference",
    "Projected Score",
    "Fair ML (Home)",
    "Fair ML (Away)",
    "Fair Spread",
    "Fair Total",
    "Home Card",
    "Away Card",
];

pub const AUDIT_HEADERS: [&str; 15] = [
    "Game ID",
    "Market",
    "Side",
    "Book",
    "Line",
    "Price A",
    "Price B",
    "Implied A",
    "Implied B",
    "De-vig A",
    "De-vig B",
    "Timestamp",
    "Source",
    "Books",
    "Conference",
];

pub const SHEETS: [&str; 4] = ["Picks", "Player Props", "Game Summary", "Audit"];

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Everything a scan produced, borrowed for writing
#[derive(Debug, Clone, Copy)]
pub struct ScanReport<'a> {
    pub date: NaiveDate,
    pub conference: Conference,
    pub books: &'a [String],
    pub source: &'a str,
    pub pulled_at: &'a str,
    pub games: &'a [GameOdds],
    pub summaries: &'a [GameSummary],
    pub batch: &'a RankingBatch,
    /// Team name to one-line ratings card
    pub team_cards: &'a HashMap<String, String>,
}

fn escape_csv(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn format_percentage(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}

fn format_american(odds: i32) -> String {
    if odds > 0 {
        format!("+{}", odds)
    } else {
        odds.to_string()
    }
}

fn format_line(line: Option<f64>) -> String {
    line.map_or_else(|| "N/A".to_string(), |l| l.to_string())
}

fn format_opt(value: Option<f64>, decimals: usize) -> String {
    value.map_or_else(String::new, |v| format!("{:.*}", decimals, v))
}

fn tip_label(date: NaiveDate) -> String {
    format!("{} 07:30 PM", date.format("%m-%d"))
}

/// Market label as shown on the sheets
pub fn market_label(record: &EdgeRecord) -> String {
    match (record.market.market_type, record.market.stat.as_deref()) {
        (MarketType::PlayerProp, Some(stat)) => {
            let mut chars = stat.chars();
            chars
                .next()
                .map(|c| c.to_uppercase().chain(chars).collect())
                .unwrap_or_default()
        }
        (market_type, _) => market_type.label().to_string(),
    }
}

fn selection_label(record: &EdgeRecord) -> String {
    match &record.market.player {
        Some(player) => format!("{} • {}", player, record.side.label()),
        None => record.side.label().to_string(),
    }
}

fn line_price(record: &EdgeRecord) -> String {
    let price = format_american(record.american);
    match (record.market.market_type, record.line) {
        (MarketType::Moneyline, _) | (_, None) => format!("{} / {}", record.side.label(), price),
        (MarketType::Spread, Some(line)) => format!("{} / {}", line, price),
        (_, Some(line)) => format!("{} {} / {}", record.side.label(), line, price),
    }
}

fn pick_row(
    record: &EdgeRecord,
    report: &ScanReport<'_>,
    matchups: &HashMap<&str, (String, NaiveDate)>,
) -> Vec<String> {
    let (matchup, date) = matchups
        .get(record.market.game_id.as_str())
        .cloned()
        .unwrap_or_else(|| (record.market.game_id.clone(), report.date));

    let (fair, book, diff) = match record.market.market_type.pricing_mode() {
        PricingMode::Line => (
            format!("{:.3}", record.fair_value),
            format!("{:.3}", record.book_value),
            format!("{:.2}", record.diff),
        ),
        PricingMode::Probability => (
            format_percentage(record.fair_value),
            format_percentage(record.book_value),
            format_percentage(record.diff),
        ),
    };

    vec![
        tip_label(date),
        matchup,
        market_label(record),
        selection_label(record),
        record.book.clone(),
        line_price(record),
        fair,
        book,
        diff,
        format_percentage(record.edge),
        format!("{:.1}%", record.kelly_pct),
        record.risk.label().to_string(),
        String::new(),
        report.pulled_at.to_string(),
    ]
}

fn audit_row(record: &EdgeRecord, market: Option<&Market>, report: &ScanReport<'_>) -> Vec<String> {
    let label = match (record.market.market_type, record.market.stat.as_deref()) {
        (MarketType::PlayerProp, Some(stat)) => format!("Prop-{}", stat),
        (market_type, _) => market_type.label().to_string(),
    };
    let price = |i: usize| {
        market
            .and_then(|m| m.quotes.get(i))
            .map_or_else(String::new, |q| format_american(q.american))
    };
    let prob = |values: &[f64], i: usize| {
        values
            .get(i)
            .map_or_else(String::new, |p| format!("{:.3}", p))
    };

    vec![
        record.market.game_id.clone(),
        label,
        record.side.label().to_lowercase(),
        record.book.clone(),
        format_line(record.line),
        price(0),
        price(1),
        prob(&record.implied, 0),
        prob(&record.implied, 1),
        prob(&record.devigged, 0),
        prob(&record.devigged, 1),
        report.pulled_at.to_string(),
        report.source.to_string(),
        report.books.join(","),
        report.conference.label().to_string(),
    ]
}

fn summary_row(summary: &GameSummary, game: &GameOdds, report: &ScanReport<'_>) -> Vec<String> {
    let card = |team: &str| report.team_cards.get(team).cloned().unwrap_or_default();
    let projected = match (summary.projected_home, summary.projected_away) {
        (Some(home), Some(away)) => format!("{:.1}-{:.1}", home, away),
        _ => String::new(),
    };

    vec![
        tip_label(game.date),
        summary.matchup.clone(),
        report.conference.label().to_string(),
        projected,
        format_opt(summary.fair_ml_home, 2),
        format_opt(summary.fair_ml_away, 2),
        format_opt(summary.fair_spread, 2),
        format_opt(summary.fair_total, 2),
        card(&game.home),
        card(&game.away),
    ]
}

/// File name of one sheet
pub fn sheet_file_name(date: NaiveDate, conference: Conference, sheet: &str) -> String {
    format!(
        "NBA_{}_{}_{}.csv",
        date.format("%Y-%m-%d"),
        conference.label(),
        sheet.replace(' ', "_")
    )
}

fn write_sheet(path: &Path, headers: &[&str], rows: &[Vec<String>]) -> Result<(), ReportError> {
    let io_err = |source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut file = BufWriter::new(File::create(path).map_err(io_err)?);

    let header: Vec<String> = headers.iter().map(|h| escape_csv(h)).collect();
    writeln!(file, "{}", header.join(",")).map_err(io_err)?;
    for row in rows {
        let values: Vec<String> = row.iter().map(|v| escape_csv(v)).collect();
        writeln!(file, "{}", values.join(",")).map_err(io_err)?;
    }
    file.flush().map_err(io_err)
}

/// Writes scan sheets into one directory
///
/// There is no workbook: each sheet is its own CSV file, with spaces in the
/// sheet name turned into underscores. [`ReportWriter::write`] returns the
/// paths in [`SHEETS`] order.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    output_dir: PathBuf,
}

impl ReportWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write all four sheets, returning their paths in sheet order
    pub fn write(&self, report: &ScanReport<'_>) -> Result<Vec<PathBuf>, ReportError> {
        fs::create_dir_all(&self.output_dir).map_err(|source| ReportError::Io {
            path: self.output_dir.clone(),
            source,
        })?;

        let matchups: HashMap<&str, (String, NaiveDate)> = report
            .games
            .iter()
            .map(|g| (g.game_id.as_str(), (g.matchup(), g.date)))
            .collect();

        let (props, picks): (Vec<&EdgeRecord>, Vec<&EdgeRecord>) = report
            .batch
            .records
            .iter()
            .partition(|r| r.market.market_type == MarketType::PlayerProp);

        let picks_rows: Vec<Vec<String>> = picks
            .iter()
            .map(|r| pick_row(r, report, &matchups))
            .collect();
        let props_rows: Vec<Vec<String>> = props
            .iter()
            .map(|r| pick_row(r, report, &matchups))
            .collect();
        let summary_rows: Vec<Vec<String>> = report
            .summaries
            .iter()
            .filter_map(|s| {
                let game = report.games.iter().find(|g| g.game_id == s.game_id)?;
                Some(summary_row(s, game, report))
            })
            .collect();
        let markets: HashMap<(&MarketKey, &str), &Market> = report
            .games
            .iter()
            .flat_map(|g| &g.markets)
            .map(|m| ((&m.key, m.book.as_str()), m))
            .collect();
        let audit_rows: Vec<Vec<String>> = report
            .batch
            .records
            .iter()
            .map(|r| {
                let market = markets.get(&(&r.market, r.book.as_str())).copied();
                audit_row(r, market, report)
            })
            .collect();

        let sheets: [(&str, &[&str], &[Vec<String>]); 4] = [
            (SHEETS[0], &PICKS_HEADERS, &picks_rows),
            (SHEETS[1], &PICKS_HEADERS, &props_rows),
            (SHEETS[2], &GAME_SUMMARY_HEADERS, &summary_rows),
            (SHEETS[3], &AUDIT_HEADERS, &audit_rows),
        ];

        let mut paths = Vec::with_capacity(sheets.len());
        for (sheet, headers, rows) in sheets {
            let path = self
                .output_dir
                .join(sheet_file_name(report.date, report.conference, sheet));
            write_sheet(&path, headers, rows)?;
            info!("Wrote {} rows to {:?}", rows.len(), path);
            paths.push(path);
        }

        Ok(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use crate::core::ranker::{rank, EstimateMap};
    use crate::models::{ModelEstimate, OddsQuote, Side};
    use tempfile::tempdir;

    fn game() -> GameOdds {
        GameOdds {
            game_id: "g1".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 2, 24).unwrap(),
            home: "New York Knicks".to_string(),
            away: "Boston Celtics".to_string(),
            markets: vec![
                Market {
                    key: MarketKey::new("g1", MarketType::Moneyline),
                    book: "DK".to_string(),
                    line: None,
                    quotes: vec![
                        OddsQuote::new(Side::Home, -110, "DK"),
                        OddsQuote::new(Side::Away, -110, "DK"),
                    ],
                },
                Market {
                    key: MarketKey::prop("g1", "Jalen Brunson", "points"),
                    book: "DK".to_string(),
                    line: Some(27.5),
                    quotes: vec![
                        OddsQuote::new(Side::Over, 120, "DK"),
                        OddsQuote::new(Side::Under, -140, "DK"),
                    ],
                },
            ],
        }
    }

    fn estimates() -> EstimateMap {
        [
            (
                MarketKey::new("g1", MarketType::Moneyline),
                ModelEstimate::probability(Side::Home, 0.55),
            ),
            (
                MarketKey::prop("g1", "Jalen Brunson", "points"),
                ModelEstimate::probability(Side::Over, 0.5),
            ),
        ]
        .into_iter()
        .collect()
    }

    fn read_lines(path: &Path) -> Vec<String> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_sheet_file_name() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 24).unwrap();
        assert_eq!(
            sheet_file_name(date, Conference::East, "Player Props"),
            "NBA_2024-02-24_East_Player_Props.csv"
        );
    }

    #[test]
    fn test_escape_csv() {
        assert_eq!(escape_csv("plain"), "plain");
        assert_eq!(escape_csv("a,b"), "\"a,b\"");
        assert_eq!(escape_csv("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_write_empty_report_has_headers() {
        let dir = tempdir().unwrap();
        let batch = RankingBatch::default();
        let cards = HashMap::new();
        let report = ScanReport {
            date: NaiveDate::from_ymd_opt(2024, 2, 24).unwrap(),
            conference: Conference::East,
            books: &["DK".to_string()],
            source: "replay",
            pulled_at: "2024-02-24T12:00:00",
            games: &[],
            summaries: &[],
            batch: &batch,
            team_cards: &cards,
        };

        let paths = ReportWriter::new(dir.path()).write(&report).unwrap();
        assert_eq!(paths.len(), 4);

        let picks = read_lines(&paths[0]);
        assert_eq!(picks.len(), 1);
        assert_eq!(picks[0], PICKS_HEADERS.join(","));
        assert_eq!(read_lines(&paths[2])[0], GAME_SUMMARY_HEADERS.join(","));
        assert_eq!(read_lines(&paths[3])[0], AUDIT_HEADERS.join(","));
    }

    #[test]
    fn test_write_splits_props_from_picks() {
        let dir = tempdir().unwrap();
        let games = vec![game()];
        let batch = rank(&games[0].markets, &estimates(), &PipelineConfig::default()).unwrap();
        let cards: HashMap<String, String> = [(
            "New York Knicks".to_string(),
            "Pace 99.0, ORtg 110.8".to_string(),
        )]
        .into_iter()
        .collect();
        let books = vec!["DK".to_string()];
        let report = ScanReport {
            date: games[0].date,
            conference: Conference::East,
            books: &books,
            source: "replay",
            pulled_at: "2024-02-24T12:00:00",
            games: &games,
            summaries: &[],
            batch: &batch,
            team_cards: &cards,
        };

        let paths = ReportWriter::new(dir.path()).write(&report).unwrap();
        assert_eq!(paths.len(), SHEETS.len());
        assert!(paths[1].ends_with("NBA_2024-02-24_East_Player_Props.csv"));
        assert!(paths.iter().all(|p| p.extension().is_some_and(|e| e == "csv")));

        let picks = read_lines(&paths[0]);
        assert_eq!(picks.len(), 2);
        assert_eq!(
            picks[1],
            "02-24 07:30 PM,Boston Celtics @ New York Knicks,ML,Home,DK,Home / -110,55.0%,50.0%,5.0%,5.0%,1.0%,Med,,2024-02-24T12:00:00"
        );

        let props = read_lines(&paths[1]);
        assert_eq!(props.len(), 2);
        assert!(props[1].contains("Points,Jalen Brunson • Over,DK,Over 27.5 / +120"));

        let audit = read_lines(&paths[3]);
        assert_eq!(audit.len(), 3);
        assert!(audit
            .iter()
            .any(|row| row.starts_with("g1,Prop-points,over,DK,27.5,+120,-140,")));
        assert!(audit[1..].iter().all(|row| row.ends_with(",replay,DK,East")));
    }
}
