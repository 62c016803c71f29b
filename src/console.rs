//! Line-oriented console for playing a session.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use derive_more::{Display, Error};
use rand::Rng;
use strictly_lessons::{
    AbandonSignal, ActionOutcome, AnyGame, GameEngine, PlayerAction, PlaySession, RowStatus,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, instrument, warn};

/// Longest wait for win reports before exiting.
const REPORT_GRACE: Duration = Duration::from_secs(5);

const HELP: &str = "Commands: flip N | fill ROW CHAR | drop ROW TEXT | show | replay | help | quit";

/// One parsed console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Forward an action to the game.
    Act(PlayerAction),
    /// Redraw the board.
    Show,
    /// Start over on a fresh board.
    Replay,
    /// Print the command list.
    Help,
    /// Leave the session.
    Quit,
}

/// A console line could not be understood.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("{}", message)]
pub struct ParseCommandError {
    message: String,
}

impl ParseCommandError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

fn parse_index(raw: Option<&str>, what: &str) -> Result<usize, ParseCommandError> {
    let raw = raw.ok_or_else(|| ParseCommandError::new(format!("Missing {}", what)))?;
    raw.parse()
        .map_err(|_| ParseCommandError::new(format!("Invalid {}: {}", what, raw)))
}

impl ConsoleCommand {
    /// Parses one input line.
    pub fn parse(line: &str) -> Result<Self, ParseCommandError> {
        let line = line.trim();
        let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        match verb.to_lowercase().as_str() {
            "flip" => Ok(Self::Act(PlayerAction::flip(parse_index(
                Some(rest).filter(|r| !r.is_empty()),
                "card number",
            )?))),
            "fill" => {
                let (row, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                let row = parse_index(Some(row).filter(|r| !r.is_empty()), "row number")?;
                Ok(Self::Act(PlayerAction::enter(row, value.trim())))
            }
            "drop" => {
                let (row, chip) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                let row = parse_index(Some(row).filter(|r| !r.is_empty()), "row number")?;
                let chip = chip.trim();
                let payload = (!chip.is_empty()).then(|| chip.to_string());
                Ok(Self::Act(PlayerAction::drop_chip(row, payload)))
            }
            "show" | "" => Ok(Self::Show),
            "replay" => Ok(Self::Replay),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            other => Err(ParseCommandError::new(format!("Unknown command: {}", other))),
        }
    }
}

/// Plain-text view of the engine.
pub fn render(engine: &GameEngine) -> String {
    let lesson = engine.lesson();
    let progress = engine.progress();
    let mut out = format!(
        "{} ({}) - {}   pairs {}/{}   tries {}\n",
        lesson.id(),
        lesson.language(),
        engine.kind(),
        progress.successes(),
        progress.pair_count(),
        progress.attempts(),
    );

    match engine.game() {
        AnyGame::Memory(board) => {
            for (i, card) in board.cards().iter().enumerate() {
                let face = if *card.is_matched() {
                    format!("({})", card.display_text())
                } else if *card.is_flipped() {
                    card.display_text().clone()
                } else {
                    "####".to_string()
                };
                out.push_str(&format!("  [{}] {}\n", i, face));
            }
        }
        AnyGame::Fill(sheet) => {
            for (i, row) in sheet.rows().iter().enumerate() {
                let mark = match row.status() {
                    RowStatus::Idle => "",
                    RowStatus::Correct => "  ok",
                    RowStatus::Incorrect => "  x",
                };
                out.push_str(&format!("  [{}] {} -> {}{}\n", i, row.word(), row.masked(), mark));
            }
        }
        AnyGame::Match(board) => {
            for (i, row) in board.rows().iter().enumerate() {
                let zone = if *row.placed() {
                    row.translation().as_str()
                } else {
                    "____"
                };
                out.push_str(&format!("  [{}] {} -> {}\n", i, row.word(), zone));
            }
            let pool: Vec<String> = board
                .pool()
                .iter()
                .map(|chip| {
                    if board.is_shaking(chip) {
                        format!("!{}!", chip)
                    } else {
                        chip.clone()
                    }
                })
                .collect();
            out.push_str(&format!("  pool: {}\n", pool.join(", ")));
        }
    }

    if engine.is_won() {
        out.push_str("  Lesson complete! Type `replay` to play again or `quit`.\n");
    }
    out
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await,
        None => std::future::pending().await,
    }
}

/// Runs the console until the player quits, stdin closes, or the session is
/// abandoned. Waits briefly for any win report before returning.
#[instrument(skip_all)]
pub async fn run<R: Rng + ?Sized>(
    session: &mut PlaySession,
    rng: &mut R,
    mut abandon: AbandonSignal,
) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("{}", HELP);
    print!("{}", render(session.engine()));

    loop {
        tokio::select! {
            _ = abandon.abandoned() => break,
            _ = sleep_until_deadline(session.next_deadline()) => {
                if session.tick(Instant::now()) > 0 {
                    print!("{}", render(session.engine()));
                }
            }
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read input")? else {
                    break;
                };
                match ConsoleCommand::parse(&line) {
                    Ok(ConsoleCommand::Quit) => break,
                    Ok(ConsoleCommand::Help) => println!("{}", HELP),
                    Ok(ConsoleCommand::Show) => print!("{}", render(session.engine())),
                    Ok(ConsoleCommand::Replay) => {
                        session.replay(rng).context("Failed to lay out lesson again")?;
                        print!("{}", render(session.engine()));
                    }
                    Ok(ConsoleCommand::Act(action)) => {
                        match session.handle(action, Instant::now()) {
                            Ok(ActionOutcome::Ignored) => println!("(ignored)"),
                            Ok(outcome) => {
                                println!("{:?}", outcome);
                                print!("{}", render(session.engine()));
                            }
                            Err(e) => println!("{}", e),
                        }
                    }
                    Err(e) => println!("{}. {}", e, HELP),
                }
            }
        }
    }

    session.abandon();
    if let Some(report) = session.take_report() {
        match tokio::time::timeout(REPORT_GRACE, report.settled()).await {
            Ok(succeeded) => info!(succeeded, "Win report settled"),
            Err(_) => warn!("Win report still running at exit"),
        }
    }
    Ok(())
}
