//! Print a season's standings table from the OpenF1 API
//!
//! ```text
//! cargo run --example season_standings -- [YEAR] [CONFIG.yaml]
//! ```
//!
//! Without a year, the most recent season in the catalogue is used. Set
//! `RUST_LOG=paddock=debug` to watch the paced requests go out.

use anyhow::{Context, bail};
use paddock::{Paddock, PipelineConfig, SeasonView};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "paddock=info".into()))
        .init();

    let mut args = std::env::args().skip(1);
    let year = args.next().map(|y| y.parse::<u32>()).transpose().context("YEAR must be a number")?;
    let config = match args.next() {
        Some(path) => PipelineConfig::from_path(&path)
            .with_context(|| format!("Failed to load config from {path}"))?,
        None => PipelineConfig::default(),
    };

    let pipeline = Paddock::connect_with(config)?;
    let year = match year {
        Some(year) => year,
        None => match pipeline.available_seasons().await?.first() {
            Some(&latest) => latest,
            None => bail!("The API returned no seasons"),
        },
    };

    let view = SeasonView::new(pipeline);
    let snapshot = view.select(year).await?;
    let standings = &snapshot.standings;

    println!("{year} season, {} races", standings.sessions().len());
    println!();
    print!("{:<4} {:<24} {:<26} {:>6}", "#", "Driver", "Team", "Pts");
    for session in standings.sessions() {
        let label = session.circuit_short_name.as_deref().unwrap_or("?");
        print!(" {:>4.4}", label);
    }
    println!();

    for row in standings.rows() {
        print!(
            "{:<4} {:<24} {:<26} {:>6}",
            row.driver.driver_number,
            row.driver.full_name.as_deref().unwrap_or("-"),
            row.driver.team_name.as_deref().unwrap_or("-"),
            row.total_points,
        );
        for result in &row.results {
            let cell = match result {
                Some(r) if r.dnf => "DNF".to_string(),
                Some(r) if r.dns => "DNS".to_string(),
                Some(r) if r.dsq => "DSQ".to_string(),
                Some(r) => r.position.map_or_else(|| "-".to_string(), |p| p.to_string()),
                None => String::new(),
            };
            print!(" {cell:>4}");
        }
        println!();
    }

    Ok(())
}
