//! Static NBA team registry.
//!
//! Immutable reference data loaded once at process start: abbreviation,
//! full name, city, conference/division, the BallDontLie team id and the
//! NBA CDN id used for logo URLs. Path parameters are validated against
//! this table before any prediction work begins.

use serde::Serialize;

/// Official NBA CDN base for team logos (publicly accessible).
pub const NBA_CDN_BASE: &str = "https://cdn.nba.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Conference {
    East,
    West,
}

impl Conference {
    pub fn as_str(&self) -> &'static str {
        match self {
            Conference::East => "East",
            Conference::West => "West",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Division {
    Atlantic,
    Central,
    Southeast,
    Northwest,
    Pacific,
    Southwest,
}

impl Division {
    pub fn as_str(&self) -> &'static str {
        match self {
            Division::Atlantic => "Atlantic",
            Division::Central => "Central",
            Division::Southeast => "Southeast",
            Division::Northwest => "Northwest",
            Division::Pacific => "Pacific",
            Division::Southwest => "Southwest",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Team {
    /// Unique key, 2-3 uppercase letters.
    pub abbreviation: &'static str,
    pub name: &'static str,
    pub city: &'static str,
    pub conference: Conference,
    pub division: Division,
    /// BallDontLie API team id.
    pub provider_id: i64,
    /// NBA CDN id, used only for logo URLs.
    pub nba_id: i64,
}

impl Team {
    /// Logo URL on the official NBA CDN. `size` is "L", "D" or "S".
    pub fn logo_url(&self, size: &str) -> String {
        format!("{}/logos/nba/{}/primary/{}/logo.svg", NBA_CDN_BASE, self.nba_id, size)
    }
}

use Conference::{East, West};
use Division::{Atlantic, Central, Northwest, Pacific, Southeast, Southwest};

/// All 30 NBA teams, sorted by abbreviation.
pub const TEAMS: [Team; 30] = [
    Team { abbreviation: "ATL", name: "Atlanta Hawks", city: "Atlanta", conference: East, division: Southeast, provider_id: 1, nba_id: 1610612737 },
    Team { abbreviation: "BKN", name: "Brooklyn Nets", city: "Brooklyn", conference: East, division: Atlantic, provider_id: 3, nba_id: 1610612751 },
    Team { abbreviation: "BOS", name: "Boston Celtics", city: "Boston", conference: East, division: Atlantic, provider_id: 2, nba_id: 1610612738 },
    Team { abbreviation: "CHA", name: "Charlotte Hornets", city: "Charlotte", conference: East, division: Southeast, provider_id: 4, nba_id: 1610612766 },
    Team { abbreviation: "CHI", name: "Chicago Bulls", city: "Chicago", conference: East, division: Central, provider_id: 5, nba_id: 1610612741 },
    Team { abbreviation: "CLE", name: "Cleveland Cavaliers", city: "Cleveland", conference: East, division: Central, provider_id: 6, nba_id: 1610612739 },
    Team { abbreviation: "DAL", name: "Dallas Mavericks", city: "Dallas", conference: West, division: Southwest, provider_id: 7, nba_id: 1610612742 },
    Team { abbreviation: "DEN", name: "Denver Nuggets", city: "Denver", conference: West, division: Northwest, provider_id: 8, nba_id: 1610612743 },
    Team { abbreviation: "DET", name: "Detroit Pistons", city: "Detroit", conference: East, division: Central, provider_id: 9, nba_id: 1610612765 },
    Team { abbreviation: "GSW", name: "Golden State Warriors", city: "San Francisco", conference: West, division: Pacific, provider_id: 10, nba_id: 1610612744 },
    Team { abbreviation: "HOU", name: "Houston Rockets", city: "Houston", conference: West, division: Southwest, provider_id: 11, nba_id: 1610612745 },
    Team { abbreviation: "IND", name: "Indiana Pacers", city: "Indianapolis", conference: East, division: Central, provider_id: 12, nba_id: 1610612754 },
    Team { abbreviation: "LAC", name: "Los Angeles Clippers", city: "Los Angeles", conference: West, division: Pacific, provider_id: 13, nba_id: 1610612746 },
    Team { abbreviation: "LAL", name: "Los Angeles Lakers", city: "Los Angeles", conference: West, division: Pacific, provider_id: 14, nba_id: 1610612747 },
    Team { abbreviation: "MEM", name: "Memphis Grizzlies", city: "Memphis", conference: West, division: Southwest, provider_id: 15, nba_id: 1610612763 },
    Team { abbreviation: "MIA", name: "Miami Heat", city: "Miami", conference: East, division: Southeast, provider_id: 16, nba_id: 1610612748 },
    Team { abbreviation: "MIL", name: "Milwaukee Bucks", city: "Milwaukee", conference: East, division: Central, provider_id: 17, nba_id: 1610612749 },
    Team { abbreviation: "MIN", name: "Minnesota Timberwolves", city: "Minneapolis", conference: West, division: Northwest, provider_id: 18, nba_id: 1610612750 },
    Team { abbreviation: "NOP", name: "New Orleans Pelicans", city: "New Orleans", conference: West, division: Southwest, provider_id: 19, nba_id: 1610612740 },
    Team { abbreviation: "NYK", name: "New York Knicks", city: "New York", conference: East, division: Atlantic, provider_id: 20, nba_id: 1610612752 },
    Team { abbreviation: "OKC", name: "Oklahoma City Thunder", city: "Oklahoma City", conference: West, division: Northwest, provider_id: 21, nba_id: 1610612760 },
    Team { abbreviation: "ORL", name: "Orlando Magic", city: "Orlando", conference: East, division: Southeast, provider_id: 22, nba_id: 1610612753 },
    Team { abbreviation: "PHI", name: "Philadelphia 76ers", city: "Philadelphia", conference: East, division: Atlantic, provider_id: 23, nba_id: 1610612755 },
    Team { abbreviation: "PHX", name: "Phoenix Suns", city: "Phoenix", conference: West, division: Pacific, provider_id: 24, nba_id: 1610612756 },
    Team { abbreviation: "POR", name: "Portland Trail Blazers", city: "Portland", conference: West, division: Northwest, provider_id: 25, nba_id: 1610612757 },
    Team { abbreviation: "SAC", name: "Sacramento Kings", city: "Sacramento", conference: West, division: Pacific, provider_id: 26, nba_id: 1610612758 },
    Team { abbreviation: "SAS", name: "San Antonio Spurs", city: "San Antonio", conference: West, division: Southwest, provider_id: 27, nba_id: 1610612759 },
    Team { abbreviation: "TOR", name: "Toronto Raptors", city: "Toronto", conference: East, division: Atlantic, provider_id: 28, nba_id: 1610612761 },
    Team { abbreviation: "UTA", name: "Utah Jazz", city: "Salt Lake City", conference: West, division: Northwest, provider_id: 29, nba_id: 1610612762 },
    Team { abbreviation: "WAS", name: "Washington Wizards", city: "Washington", conference: East, division: Southeast, provider_id: 30, nba_id: 1610612764 },
];

/// Look up a team by abbreviation. Input is case-insensitive and
/// canonicalized to uppercase before the lookup.
pub fn lookup(abbreviation: &str) -> Option<&'static Team> {
    let canon = abbreviation.trim().to_ascii_uppercase();
    TEAMS.iter().find(|t| t.abbreviation == canon)
}

/// Full name for an abbreviation, when known.
pub fn full_name(abbreviation: &str) -> Option<&'static str> {
    lookup(abbreviation).map(|t| t.name)
}
