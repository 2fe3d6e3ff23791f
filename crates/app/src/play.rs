//! Interactive terminal game loop.

use std::io::Write;
use std::time::Duration;

use quiz_core::model::Difficulty;
use quiz_core::scoring::ANSWER_TIME_LIMIT_SECS;
use quiz_core::{QuizEngine, QuizError};
use services::{AppServices, GameServiceError, Identity, LeaderboardServiceError};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::time::{Instant, timeout_at};

use crate::render;

type Input = Lines<BufReader<Stdin>>;

fn prompt(text: &str) -> std::io::Result<()> {
    let mut out = std::io::stdout();
    out.write_all(text.as_bytes())?;
    out.flush()
}

enum Turn {
    Answered,
    Quit,
}

pub async fn run(
    app: &AppServices,
    difficulty: Difficulty,
    identity: Option<Identity>,
) -> Result<(), Box<dyn std::error::Error>> {
    let game = app.game();
    let mut engine = QuizEngine::new();
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    if let Some(identity) = &identity {
        println!("Playing as {}.", identity.username);
    }
    println!(
        "{} questions, {} seconds each. Starting on {}.",
        quiz_core::QUESTIONS_PER_GAME,
        ANSWER_TIME_LIMIT_SECS,
        difficulty.label()
    );
    game.start_game(&mut engine, difficulty);

    while !game.progress(&engine)?.is_game_over {
        match ask(app, &mut engine, &mut input).await? {
            Turn::Answered => {}
            Turn::Quit => break,
        }
    }

    let summary = game.finish(&mut engine)?;
    println!();
    for line in render::summary(&summary) {
        println!("{line}");
    }

    save(app, &mut engine, &mut input, identity.as_ref()).await?;
    Ok(())
}

async fn ask(
    app: &AppServices,
    engine: &mut QuizEngine,
    input: &mut Input,
) -> Result<Turn, Box<dyn std::error::Error>> {
    let game = app.game();
    let next = game.next_question(engine)?;
    let score = game.progress(engine)?.score;
    println!();
    println!("{}", render::question_line(&next, score));

    let deadline = Instant::now() + Duration::from_secs(u64::from(ANSWER_TIME_LIMIT_SECS));
    let result = loop {
        prompt("> ")?;
        let line = match timeout_at(deadline, input.next_line()).await {
            Err(_elapsed) => {
                println!();
                break game.time_out(engine, next.ticket)?;
            }
            Ok(line) => line?,
        };
        let Some(line) = line else {
            return Ok(Turn::Quit);
        };
        match game.submit_for(engine, next.ticket, &line) {
            Ok(result) => break result,
            Err(GameServiceError::Quiz(QuizError::InvalidAnswerInput { .. })) => {
                println!("Please enter a whole number.");
            }
            Err(e) => return Err(e.into()),
        }
    };

    for line in render::feedback(&result) {
        println!("{line}");
    }
    Ok(Turn::Answered)
}

async fn save(
    app: &AppServices,
    engine: &mut QuizEngine,
    input: &mut Input,
    identity: Option<&Identity>,
) -> Result<(), Box<dyn std::error::Error>> {
    let game = app.game();
    loop {
        match identity {
            Some(identity) => prompt(&format!("Name for the leaderboard [{}]: ", identity.username))?,
            None => prompt("Name for the leaderboard (blank to skip): ")?,
        }
        let Some(line) = input.next_line().await? else {
            println!();
            return Ok(());
        };
        if line.trim().is_empty() && identity.is_none() {
            println!("Score not saved.");
            return Ok(());
        }

        match game.save_score(engine, Some(&line), identity).await {
            Ok(entry) => {
                println!("Saved {} points for {}.", entry.score, entry.name);
                break;
            }
            Err(GameServiceError::PlayerName(e)) => println!("{e}"),
            Err(e) => return Err(e.into()),
        }
    }

    println!();
    print_top(app).await?;
    Ok(())
}

async fn print_top(app: &AppServices) -> Result<(), LeaderboardServiceError> {
    println!("Top scores:");
    for line in render::leaderboard(&app.leaderboard().top().await?) {
        println!("{line}");
    }
    Ok(())
}
