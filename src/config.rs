use clap::Parser;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::time::Duration;

use crate::errors::ConfigError;
use crate::game::{default_tile_letters, Config};
use crate::words::WordList;

/// Command line options of the game server
#[derive(Parser, Debug, Clone)]
#[command(name = "bananas-server", version, about = "Multiplayer tile word game server")]
pub struct ServerArgs {
    /// Port to listen on
    #[arg(short, long, default_value_t = 8000)]
    pub port: u16,

    /// Dictionary with one word per line. Without it no word is accepted.
    #[arg(short, long)]
    pub words_file: Option<PathBuf>,

    #[arg(long, default_value_t = 8)]
    pub max_players: usize,

    /// Tiles dealt to each player on joining
    #[arg(long, default_value_t = 21)]
    pub starting_tiles: usize,

    /// Minutes without activity before a game deletes itself
    #[arg(long, default_value_t = 60)]
    pub idle_minutes: u64,

    /// Letters of every tile in a game, replacing the standard distribution
    #[arg(long)]
    pub tile_letters: Option<String>,
}

impl ServerArgs {
    /// The settings every new game starts from
    pub fn session_config(&self) -> Result<Config, ConfigError> {
        let idle_secs = self
            .idle_minutes
            .checked_mul(60)
            .ok_or(ConfigError::IdlePeriodTooLong {
                minutes: self.idle_minutes,
            })?;
        let config = Config {
            max_players: self.max_players,
            num_new_tiles: self.starting_tiles,
            tile_letters: self
                .tile_letters
                .clone()
                .unwrap_or_else(default_tile_letters),
            idle_period: Duration::from_secs(idle_secs),
            ..Config::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn load_words(&self) -> io::Result<WordList> {
        match &self.words_file {
            Some(path) => WordList::from_reader(BufReader::new(File::open(path)?)),
            None => {
                log::warn!("No words file given, every word will be rejected");
                Ok(WordList::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = ServerArgs::try_parse_from(["bananas-server"]).unwrap();
        assert_eq!(args.port, 8000);
        assert!(args.words_file.is_none());

        let config = args.session_config().unwrap();
        assert_eq!(config.max_players, 8);
        assert_eq!(config.num_new_tiles, 21);
        assert_eq!(config.tile_letters.len(), 144);
        assert_eq!(config.idle_period, Duration::from_secs(3600));
        assert!(args.load_words().unwrap().is_empty());
    }

    #[test]
    fn test_overrides() {
        let args = ServerArgs::try_parse_from([
            "bananas-server",
            "--port",
            "9000",
            "--max-players",
            "2",
            "--starting-tiles",
            "3",
            "--idle-minutes",
            "5",
            "--tile-letters",
            "ABCDEF",
        ])
        .unwrap();
        let config = args.session_config().unwrap();
        assert_eq!(args.port, 9000);
        assert_eq!(config.max_players, 2);
        assert_eq!(config.tile_letters, "ABCDEF");
        assert_eq!(config.idle_period, Duration::from_secs(300));
    }

    #[test]
    fn test_invalid_settings() {
        let args = ServerArgs::try_parse_from(["bananas-server", "--tile-letters", "abc"]).unwrap();
        assert_eq!(
            args.session_config().unwrap_err(),
            ConfigError::InvalidTileLetter { letter: 'a' }
        );
        assert!(ServerArgs::try_parse_from(["bananas-server", "--port", "many"]).is_err());
    }

    #[test]
    fn test_idle_minutes_overflow() {
        let args = ServerArgs::try_parse_from([
            "bananas-server",
            "--idle-minutes",
            "18446744073709551615",
        ])
        .unwrap();
        assert_eq!(
            args.session_config().unwrap_err(),
            ConfigError::IdlePeriodTooLong {
                minutes: u64::MAX
            }
        );
    }

    #[test]
    fn test_missing_words_file() {
        let args = ServerArgs::try_parse_from([
            "bananas-server",
            "--words-file",
            "/definitely/not/here.txt",
        ])
        .unwrap();
        assert!(args.load_words().is_err());
    }
}
