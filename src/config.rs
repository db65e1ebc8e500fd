use anyhow::Result;
use clap::Parser;

/// NBA game outcome prediction service
#[derive(Parser, Debug, Clone)]
#[command(name = "nba-predictor", version, about)]
pub struct Config {
    /// HTTP listen address
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:8000")]
    pub listen_addr: String,

    /// Path to the trained model bundle (JSON)
    #[arg(long, env = "MODEL_PATH", default_value = "model/nba_model.json")]
    pub model_path: String,

    /// Path to the bundled static game schedule (JSON)
    #[arg(long, env = "FALLBACK_GAMES_PATH", default_value = "data/games.json")]
    pub fallback_games_path: String,

    /// SQLite database path
    #[arg(long, env = "DATABASE_PATH", default_value = "predictions.db")]
    pub database_path: String,

    /// BallDontLie API base URL
    #[arg(
        long,
        env = "BALL_API_URL",
        default_value = "https://api.balldontlie.io/v1"
    )]
    pub ball_api_url: String,

    /// BallDontLie API key (optional; unauthenticated requests are rate-limited)
    #[arg(long, env = "BALL_API_KEY")]
    pub ball_api_key: Option<String>,

    /// Upstream request timeout in seconds
    #[arg(long, env = "PROVIDER_TIMEOUT_SECS", default_value = "10")]
    pub provider_timeout_secs: u64,
}

impl Config {
    /// Validate configuration values at startup.
    pub fn validate(&self) -> Result<()> {
        if self.listen_addr.parse::<std::net::SocketAddr>().is_err() {
            anyhow::bail!("Invalid listen address: {}", self.listen_addr);
        }
        if !(1..=120).contains(&self.provider_timeout_secs) {
            anyhow::bail!(
                "Provider timeout must be between 1 and 120 seconds, got {}",
                self.provider_timeout_secs
            );
        }
        if !self.ball_api_url.starts_with("http") {
            anyhow::bail!("Invalid BallDontLie API URL: {}", self.ball_api_url);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Config {
        Config {
            listen_addr: "0.0.0.0:8000".into(),
            model_path: "model/nba_model.json".into(),
            fallback_games_path: "data/games.json".into(),
            database_path: "predictions.db".into(),
            ball_api_url: "https://api.balldontlie.io/v1".into(),
            ball_api_key: None,
            provider_timeout_secs: 10,
        }
    }

    #[test]
    fn default_shape_validates() {
        assert!(base().validate().is_ok());
    }

    #[test]
    fn bad_listen_addr_is_rejected() {
        let mut cfg = base();
        cfg.listen_addr = "not-an-addr".into();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn timeout_bounds_are_enforced() {
        let mut cfg = base();
        cfg.provider_timeout_secs = 0;
        assert!(cfg.validate().is_err());
        cfg.provider_timeout_secs = 121;
        assert!(cfg.validate().is_err());
        cfg.provider_timeout_secs = 120;
        assert!(cfg.validate().is_ok());
    }
}
