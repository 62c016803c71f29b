//! Strictly Lessons - console client
//!
//! Lists lessons and plays them as Memory, Fill, or Match games.

#![warn(missing_docs)]

mod cli;
mod console;

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use cli::{Cli, Command};
use strictly_lessons::{
    ClientConfig, Credential, GameKind, LessonId, PlaySession, RestLessonService, SessionContext,
    SessionGate, SessionOptions, SessionStart, SharedService, Verification, abandon_pair,
};
use tracing::{info, instrument, warn};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the session token.
const TOKEN_ENV: &str = "STRICTLY_LESSONS_TOKEN";
/// Environment variable holding the player username.
const USER_ENV: &str = "STRICTLY_LESSONS_USER";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Logs go to stderr; stdout is the game view.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config =
        ClientConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(api_url) = cli.api_url {
        config = config.with_api_base_url(api_url);
    }
    let service: SharedService = Arc::new(
        RestLessonService::from_config(&config).context("Failed to create lesson client")?,
    );

    let credential = cli
        .token
        .or_else(|| std::env::var(TOKEN_ENV).ok())
        .and_then(Credential::parse);
    let username = cli
        .username
        .or_else(|| std::env::var(USER_ENV).ok())
        .filter(|u| !u.trim().is_empty());

    match cli.command {
        Command::Lessons { language } => list_lessons(service, credential, language).await,
        Command::Play { lesson, game } => {
            let ctx = SessionContext::new(credential, lesson.and_then(LessonId::parse), username);
            play(service, &config, ctx, game).await
        }
    }
}

/// Verify the session, then print the lesson catalogue.
#[instrument(skip(service, credential))]
async fn list_lessons(
    service: SharedService,
    credential: Option<Credential>,
    language: Option<String>,
) -> Result<()> {
    let mut ctx = SessionContext::new(credential, None, None);
    let Verification::Valid(credential) = SessionGate::new(service.clone()).verify(&mut ctx).await
    else {
        bail!("Login required: pass --token or set {}", TOKEN_ENV);
    };

    let lessons = service
        .list_lessons(&credential)
        .await
        .context("Failed to list lessons")?;
    let shown: Vec<_> = lessons
        .iter()
        .filter(|l| {
            language
                .as_deref()
                .is_none_or(|lang| l.language().eq_ignore_ascii_case(lang))
        })
        .collect();
    info!(total = lessons.len(), shown = shown.len(), "Listing lessons");

    if shown.is_empty() {
        println!("No lessons found.");
    }
    for lesson in shown {
        println!(
            "{}  {:<12} {:<7} plays {:>4}  by {}",
            lesson.id(),
            lesson.language(),
            lesson.kind(),
            lesson.play_count(),
            lesson.author().as_deref().unwrap_or("-"),
        );
    }
    Ok(())
}

/// Enter a play session and run the console until the player leaves.
#[instrument(skip_all, fields(lesson_id = ?ctx.lesson_id()))]
async fn play(
    service: SharedService,
    config: &ClientConfig,
    mut ctx: SessionContext,
    game: Option<GameKind>,
) -> Result<()> {
    let (handle, signal) = abandon_pair();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            handle.abandon();
        }
    });

    let mut rng = rand::rng();
    let options = SessionOptions::new(*config.timings(), game);
    let start = PlaySession::start(service, &mut ctx, options, &mut rng, &mut signal.clone())
        .await
        .context("Lesson could not be started")?;

    match start {
        SessionStart::Ready(mut session) => {
            console::run(&mut session, &mut rng, signal).await?;
            ctx.back_out();
            Ok(())
        }
        SessionStart::LoginRequired => {
            bail!("Login required: pass --token or set {}", TOKEN_ENV)
        }
        SessionStart::LessonSelectionRequired => {
            println!("No lesson selected. Run `strictly_lessons lessons` and pass --lesson ID.");
            Ok(())
        }
        SessionStart::Abandoned => {
            warn!("Session abandoned before the board was ready");
            Ok(())
        }
    }
}
