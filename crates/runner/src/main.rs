use arena_clock::SystemClock;
use arena_runner::{Replay, RunnerConfig, bootstrap};
use std::sync::Arc;

fn print_help() {
    eprintln!(
        r#"Arena Runner - replay scripted trading game sessions

USAGE:
    arena-runner [OPTIONS]

OPTIONS:
    --config <PATH>     Runner file (default: demos/runner.json)
    --help              Print this help message

ENVIRONMENT VARIABLES:
    RUST_LOG            Log level filter (default: info)

EXAMPLES:
    # Replay the bundled demo
    arena-runner

    # Replay your own scripts with engine debug logs
    RUST_LOG=arena_engine=debug arena-runner --config my-runner.json
"#
    );
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    let mut config_path = "demos/runner.json".to_string();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            "--config" | "-c" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --config requires a path argument");
                    std::process::exit(1);
                }
                config_path = args[i].clone();
            }
            arg => {
                eprintln!("Unknown argument: {}", arg);
                print_help();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    log::info!("Loading runner file from: {}", config_path);
    let config = RunnerConfig::from_file(&config_path)?;

    let engine = Arc::new(bootstrap(&config, Arc::new(SystemClock::new())).await?);
    let sweeper = engine.spawn_expiry_sweeper(engine.config().sweep_interval());

    let results = Replay::new(Arc::clone(&engine), config.players.clone())
        .with_leaderboard_limit(config.leaderboard_limit)
        .run()
        .await;
    sweeper.abort();

    println!();
    println!(
        "{:<12} {:<10} {:>7} {:>9} {:>14} {:>12}",
        "PLAYER", "STATUS", "FRAMES", "REJECTED", "SCORE", "PNL"
    );
    for outcome in &results.outcomes {
        println!(
            "{:<12} {:<10} {:>7} {:>9} {:>14} {:>12}",
            outcome.user_id,
            outcome.status.as_str(),
            outcome.frames_played,
            outcome.rejected,
            outcome.total_score.round_dp(2),
            outcome.total_pnl.round_dp(2)
        );
    }
    for (user_id, error) in &results.failures {
        println!("{:<12} FAILED     {}", user_id, error);
    }

    println!();
    println!(
        "{:>4}  {:<12} {:<14} {:>14} {:>10}",
        "RANK", "PLAYER", "SEGMENT", "SCORE", "MAX DD"
    );
    for entry in &results.leaderboard {
        println!(
            "{:>4}  {:<12} {:<14} {:>14} {:>10}",
            entry.rank,
            entry.user_id,
            entry.segment_id,
            entry.total_score.round_dp(2),
            entry.max_drawdown.round_dp(4)
        );
    }

    if !results.success() {
        std::process::exit(1);
    }
    Ok(())
}
