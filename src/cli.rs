//! Command-line interface for strictly_lessons.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use strictly_lessons::GameKind;

/// Strictly Lessons - vocabulary mini-games over a lesson service
#[derive(Parser, Debug)]
#[command(name = "strictly_lessons")]
#[command(about = "Play vocabulary lessons as Memory, Fill, or Match games", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the TOML config file (defaults to strictly_lessons.toml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Lesson service base URL, overriding the config file
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Session token (falls back to STRICTLY_LESSONS_TOKEN)
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Player username (falls back to STRICTLY_LESSONS_USER)
    #[arg(long, global = true)]
    pub username: Option<String>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the lesson catalogue
    Lessons {
        /// Only show lessons in this language
        #[arg(short, long)]
        language: Option<String>,
    },

    /// Play a lesson in the console
    Play {
        /// Lesson identifier
        #[arg(short, long)]
        lesson: Option<String>,

        /// Game to play instead of the lesson's own (memory, fill, match)
        #[arg(short, long)]
        game: Option<GameKind>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_play_parses_game_override() {
        let cli = Cli::try_parse_from([
            "strictly_lessons",
            "--token",
            "abc",
            "play",
            "--lesson",
            "l1",
            "--game",
            "fill",
        ])
        .expect("Arguments parse");
        assert_eq!(cli.token.as_deref(), Some("abc"));
        match cli.command {
            Command::Play { lesson, game } => {
                assert_eq!(lesson.as_deref(), Some("l1"));
                assert_eq!(game, Some(GameKind::Fill));
            }
            other => panic!("Unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["strictly_lessons", "lessons", "--username", "ana"])
            .expect("Arguments parse");
        assert_eq!(cli.username.as_deref(), Some("ana"));
        assert!(cli.api_url.is_none());
        assert!(matches!(cli.command, Command::Lessons { language: None }));
    }

    #[test]
    fn test_api_url_override() {
        let cli = Cli::try_parse_from([
            "strictly_lessons",
            "lessons",
            "--api-url",
            "http://localhost:4000/api",
        ])
        .expect("Arguments parse");
        assert_eq!(cli.api_url.as_deref(), Some("http://localhost:4000/api"));
    }

    #[test]
    fn test_unknown_game_is_rejected() {
        assert!(
            Cli::try_parse_from(["strictly_lessons", "play", "--game", "chess"]).is_err()
        );
    }
}
