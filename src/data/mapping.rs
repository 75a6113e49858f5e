//! Team name canonicalization and conference lookup

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Conference filter for a scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Conference {
    East,
    West,
    All,
}

impl Conference {
    pub fn label(self) -> &'static str {
        match self {
            Conference::East => "East",
            Conference::West => "West",
            Conference::All => "All",
        }
    }

    /// A game belongs to a conference when either team does
    pub fn includes_game(self, home: &str, away: &str) -> bool {
        match self {
            Conference::All => true,
            conf => conference_for_team(home) == conf || conference_for_team(away) == conf,
        }
    }
}

impl fmt::Display for Conference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Conference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "east" | "1" => Ok(Conference::East),
            "west" | "2" => Ok(Conference::West),
            "all" | "3" => Ok(Conference::All),
            other => Err(format!("unknown conference '{}'", other)),
        }
    }
}

/// Return the canonical team name for an abbreviation, city or nickname
pub fn canonical_team(name: &str) -> String {
    let name = name.trim();
    let canonical = match name {
        "ATL" | "Atlanta" | "Hawks" => "Atlanta Hawks",
        "BOS" | "Boston" | "Celtics" => "Boston Celtics",
        "BKN" | "Brooklyn" | "Nets" => "Brooklyn Nets",
        "CHA" | "Charlotte" | "Hornets" => "Charlotte Hornets",
        "CHI" | "Chicago" | "Bulls" => "Chicago Bulls",
        "CLE" | "Cleveland" | "Cavaliers" => "Cleveland Cavaliers",
        "DAL" | "Dallas" | "Mavericks" => "Dallas Mavericks",
        "DEN" | "Denver" | "Nuggets" => "Denver Nuggets",
        "DET" | "Detroit" | "Pistons" => "Detroit Pistons",
        "GSW" | "Golden State" | "Warriors" => "Golden State Warriors",
        "HOU" | "Houston" | "Rockets" => "Houston Rockets",
        "IND" | "Indiana" | "Pacers" => "Indiana Pacers",
        "LAC" | "Clippers" => "Los Angeles Clippers",
        "LAL" | "Lakers" => "Los Angeles Lakers",
        "MEM" | "Memphis" | "Grizzlies" => "Memphis Grizzlies",
        "MIA" | "Miami" | "Heat" => "Miami Heat",
        "MIL" | "Milwaukee" | "Bucks" => "Milwaukee Bucks",
        "MIN" | "Minnesota" | "Timberwolves" => "Minnesota Timberwolves",
        "NOP" | "New Orleans" | "Pelicans" => "New Orleans Pelicans",
        "NYK" | "New York" | "Knicks" => "New York Knicks",
        "OKC" | "Oklahoma City" | "Thunder" => "Oklahoma City Thunder",
        "ORL" | "Orlando" | "Magic" => "Orlando Magic",
        "PHI" | "Philadelphia" | "76ers" | "Sixers" => "Philadelphia 76ers",
        "PHX" | "Phoenix" | "Suns" => "Phoenix Suns",
        "POR" | "Portland" | "Trail Blazers" | "Blazers" => "Portland Trail Blazers",
        "SAC" | "Sacramento" | "Kings" => "Sacramento Kings",
        "SAS" | "San Antonio" | "Spurs" => "San Antonio Spurs",
        "TOR" | "Toronto" | "Raptors" => "Toronto Raptors",
        "UTA" | "Utah" | "Jazz" => "Utah Jazz",
        "WAS" | "Washington" | "Wizards" => "Washington Wizards",
        other => other,
    };
    canonical.to_string()
}

/// Conference of a canonical team name; unknown teams map to `All`
pub fn conference_for_team(team: &str) -> Conference {
    match team {
        "Atlanta Hawks" | "Boston Celtics" | "Brooklyn Nets" | "Charlotte Hornets"
        | "Chicago Bulls" | "Cleveland Cavaliers" | "Detroit Pistons" | "Indiana Pacers"
        | "Miami Heat" | "Milwaukee Bucks" | "New York Knicks" | "Orlando Magic"
        | "Philadelphia 76ers" | "Toronto Raptors" | "Washington Wizards" => Conference::East,
        "Dallas Mavericks" | "Denver Nuggets" | "Golden State Warriors" | "Houston Rockets"
        | "Los Angeles Clippers" | "Los Angeles Lakers" | "Memphis Grizzlies"
        | "Minnesota Timberwolves" | "New Orleans Pelicans" | "Oklahoma City Thunder"
        | "Phoenix Suns" | "Portland Trail Blazers" | "Sacramento Kings"
        | "San Antonio Spurs" | "Utah Jazz" => Conference::West,
        _ => Conference::All,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_team_alias() {
        assert_eq!(canonical_team("BOS"), "Boston Celtics");
        assert_eq!(canonical_team(" Knicks "), "New York Knicks");
        assert_eq!(canonical_team("Boston Celtics"), "Boston Celtics");
        assert_eq!(canonical_team("Seattle"), "Seattle");
    }

    #[test]
    fn test_conference_lookup() {
        assert_eq!(conference_for_team("Boston Celtics"), Conference::East);
        assert_eq!(conference_for_team("Utah Jazz"), Conference::West);
        assert_eq!(conference_for_team("Non Team"), Conference::All);
    }

    #[test]
    fn test_conference_filter() {
        assert!(Conference::East.includes_game("New York Knicks", "Boston Celtics"));
        assert!(Conference::East.includes_game("Denver Nuggets", "Miami Heat"));
        assert!(!Conference::West.includes_game("New York Knicks", "Boston Celtics"));
        assert!(Conference::All.includes_game("A", "B"));
    }

    #[test]
    fn test_parse_conference() {
        assert_eq!("East".parse::<Conference>(), Ok(Conference::East));
        assert_eq!("2".parse::<Conference>(), Ok(Conference::West));
        assert!("north".parse::<Conference>().is_err());
    }
}
