use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{Instant, interval_at, sleep};

use engine::{
    ADVANCE_DELAY_MS, Clock, JsonFileHighScore, QuizEngine, QuizEvent, QuizSession, ShapeRenderer,
};
use quiz_core::model::{Difficulty, Question, ShapeDescriptor};

/// Initial deadline for the disarmed advance timer; rearmed per answer.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365);

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidSeed { raw: String },
    InvalidDifficulty { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidSeed { raw } => write!(f, "invalid --seed value: {raw}"),
            ArgsError::InvalidDifficulty { raw } => {
                write!(f, "invalid difficulty: {raw} (use easy, medium or hard)")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

struct Args {
    high_scores: PathBuf,
    seed: Option<u64>,
    difficulty: Difficulty,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [--high-scores <path>] [--seed <u64>] [--difficulty <level>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --high-scores geoquiz-high-score.json");
    eprintln!("  --difficulty easy");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  GEOQUIZ_HIGH_SCORES, GEOQUIZ_DIFFICULTY");
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut high_scores = std::env::var("GEOQUIZ_HIGH_SCORES")
            .map_or_else(|_| PathBuf::from("geoquiz-high-score.json"), PathBuf::from);
        let mut difficulty = std::env::var("GEOQUIZ_DIFFICULTY")
            .ok()
            .and_then(|value| value.parse::<Difficulty>().ok())
            .unwrap_or_default();
        let mut seed = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--high-scores" => {
                    high_scores = PathBuf::from(require_value(args, "--high-scores")?);
                }
                "--seed" => {
                    let value = require_value(args, "--seed")?;
                    let parsed: u64 = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidSeed { raw: value.clone() })?;
                    seed = Some(parsed);
                }
                "--difficulty" => {
                    let value = require_value(args, "--difficulty")?;
                    difficulty = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidDifficulty { raw: value.clone() })?;
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            high_scores,
            seed,
            difficulty,
        })
    }
}

//
// ─── TEXT RENDERER ─────────────────────────────────────────────────────────────
//

/// Renders shape descriptors as one descriptive terminal line.
struct TextRenderer;

impl ShapeRenderer for TextRenderer {
    fn draw(&self, shape: &ShapeDescriptor) {
        match shape {
            ShapeDescriptor::Rectangle { width, height } => {
                println!("  [shape] rectangle, {width} by {height} units");
            }
            ShapeDescriptor::RightTriangle {
                base,
                height,
                hypotenuse: Some(hypotenuse),
            } => {
                println!(
                    "  [shape] right triangle, legs {base} and {height}, hypotenuse {hypotenuse}"
                );
            }
            ShapeDescriptor::RightTriangle {
                base,
                height,
                hypotenuse: None,
            } => {
                println!("  [shape] right triangle, base {base}, height {height}");
            }
            ShapeDescriptor::Circle { radius } => {
                println!("  [shape] circle, radius {radius} units");
            }
            ShapeDescriptor::Trapezoid {
                base_bottom,
                base_top,
                height,
            } => {
                println!(
                    "  [shape] trapezoid, bases {base_bottom} and {base_top}, height {height}"
                );
            }
            ShapeDescriptor::Translation { point, vector, .. } => {
                println!("  [shape] grid with P{point} and vector {vector}");
            }
            ShapeDescriptor::CompositeL {
                outer_width,
                outer_height,
                cut_width,
                cut_height,
            } => {
                println!(
                    "  [shape] L-figure, outer {outer_width}×{outer_height}, cut {cut_width}×{cut_height}"
                );
            }
        }
    }
}

//
// ─── DISPLAY ───────────────────────────────────────────────────────────────────
//

fn format_timer(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

fn print_question(question: &Question) {
    println!();
    println!("{}", question.prompt());
    for (index, option) in question.options().iter().enumerate() {
        println!("  [{}] {}", index + 1, option.label());
    }
}

fn print_scoreboard(session: &QuizSession) {
    let snapshot = session.snapshot();
    println!(
        "  score {} | streak {} | best {} | {} left",
        snapshot.score,
        snapshot.streak,
        snapshot.best_streak,
        format_timer(snapshot.time_remaining)
    );
}

/// Prints events and reports whether the advance timer should be armed.
///
/// `high_before` is the high score as of session start, so beating it can
/// be announced.
fn handle_events(events: &[QuizEvent], engine: &QuizEngine, high_before: u32) -> bool {
    let mut arm_advance = false;
    for event in events {
        match event {
            QuizEvent::QuestionReady(question) => print_question(question),
            QuizEvent::AnswerResolved { correct, question } => {
                let feedback = if *correct {
                    question.feedback_success()
                } else {
                    question.feedback_error()
                };
                println!("  {feedback}");
                println!("  {}", question.explanation());
                print_scoreboard(engine.session());
                arm_advance = true;
            }
            QuizEvent::SessionEnded { final_score } => {
                println!();
                println!("Time is up! Final score: {final_score}");
                if *final_score > high_before {
                    println!("New high score!");
                } else {
                    println!("High score: {}", engine.high_score());
                }
                println!("Type start [easy|medium|hard] to play again.");
            }
        }
    }
    arm_advance
}

//
// ─── EVENT LOOP ────────────────────────────────────────────────────────────────
//

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(JsonFileHighScore::new(args.high_scores));
    log::info!("high scores persisted at {}", store.path().display());
    let renderer = Arc::new(TextRenderer);
    let mut engine = match args.seed {
        Some(seed) => {
            QuizEngine::with_rng(Clock::default_clock(), store, renderer, StdRng::seed_from_u64(seed))
        }
        None => QuizEngine::new(Clock::default_clock(), store, renderer),
    };
    let mut default_difficulty = args.difficulty;
    let mut high_at_start = engine.high_score();

    println!("geoquiz — timed geometry quiz");
    println!("High score: {}", engine.high_score());
    println!("Commands: start [easy|medium|hard], 1-4 to answer, score, reset, quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = interval_at(
        Instant::now() + Duration::from_secs(1),
        Duration::from_secs(1),
    );
    let advance_timer = sleep(FAR_FUTURE);
    tokio::pin!(advance_timer);
    let mut advance_armed = false;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let events = engine.on_tick();
                if events.is_empty() {
                    let remaining = engine.session().time_remaining();
                    if engine.session().is_active() && (remaining % 30 == 0 || remaining <= 5) {
                        println!("  {} left", format_timer(remaining));
                    }
                } else if handle_events(&events, &engine, high_at_start) {
                    advance_armed = true;
                    advance_timer
                        .as_mut()
                        .reset(Instant::now() + Duration::from_millis(ADVANCE_DELAY_MS));
                }
            }
            () = &mut advance_timer, if advance_armed => {
                advance_armed = false;
                let events = engine.on_advance_timeout()?;
                handle_events(&events, &engine, high_at_start);
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                let mut parts = line.split_whitespace();
                match parts.next() {
                    None => {}
                    Some("quit") | Some("exit") => break,
                    Some("start") => {
                        if let Some(raw) = parts.next() {
                            match raw.parse::<Difficulty>() {
                                Ok(difficulty) => default_difficulty = difficulty,
                                Err(err) => {
                                    println!("  {err}");
                                    continue;
                                }
                            }
                        }
                        advance_armed = false;
                        high_at_start = engine.high_score();
                        println!("Starting a {default_difficulty} session. Good luck!");
                        let events = engine.start(default_difficulty)?;
                        handle_events(&events, &engine, high_at_start);
                    }
                    Some("reset") => {
                        advance_armed = false;
                        engine.reset();
                        println!("Session reset.");
                    }
                    Some("score") => print_scoreboard(engine.session()),
                    Some(choice @ ("1" | "2" | "3" | "4")) => {
                        let index = choice.parse::<usize>().unwrap_or(1) - 1;
                        let selected = engine
                            .session()
                            .current_question()
                            .and_then(|question| question.options().get(index))
                            .map(|option| option.value().to_string());
                        match selected {
                            Some(value) => {
                                let events = engine.submit_answer(&value);
                                if handle_events(&events, &engine, high_at_start) {
                                    advance_armed = true;
                                    advance_timer.as_mut().reset(
                                        Instant::now() + Duration::from_millis(ADVANCE_DELAY_MS),
                                    );
                                }
                            }
                            None => println!("  No question is waiting for an answer."),
                        }
                    }
                    Some(other) => {
                        println!("  Unknown command: {other}. Try start, 1-4, score, reset or quit.");
                    }
                }
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    pretty_env_logger::init();

    let parsed = Args::parse(&mut std::env::args().skip(1)).map_err(|err| {
        eprintln!("{err}");
        print_usage();
        err
    });
    let Ok(args) = parsed else {
        std::process::exit(2);
    };

    if let Err(err) = run(args).await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
