use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use colored::*;
use glareshield::scenario::{self, FrameReport, Scenario};
use glareshield::{AnnunciatorState, Panel, PanelLayout};
use std::time::Duration;
use tokio::time;
use tracing::{info, Level};

const NANOS_PER_SEC: u64 = 1_000_000_000;
// One tick per nanosecond is the finest period a Duration can carry
const MAX_RATE_HZ: u64 = NANOS_PER_SEC;

/// Frame period for a tick rate, or `None` when the rate is zero or too fast
/// to give a non-zero period.
fn tick_period(hz: u64) -> Option<Duration> {
    if hz == 0 || hz > MAX_RATE_HZ {
        return None;
    }
    Some(Duration::from_nanos(NANOS_PER_SEC / hz))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = App::new("glareshield")
        .version("0.1.0")
        .author("Flight Deck Systems Team")
        .about("🛩️  737-NG glareshield System Annunciator simulator")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("layout")
                .short("l")
                .long("layout")
                .value_name("FILE")
                .help("Panel layout JSON (defaults to the built-in 737-NG six-pack)")
                .takes_value(true)
                .global(true),
        )
        .arg(
            Arg::with_name("format")
                .short("f")
                .long("format")
                .value_name("FORMAT")
                .help("Output format")
                .takes_value(true)
                .possible_values(&["json", "table", "compact"])
                .default_value("table")
                .global(true),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .help("Enable debug logging")
                .global(true),
        )
        .subcommand(
            SubCommand::with_name("layout")
                .about("📋 Print the panel layout")
        )
        .subcommand(
            SubCommand::with_name("check")
                .about("✅ Validate a panel layout")
                .long_about("Checks group count, names and sub-annunciator ranges, then builds a dark panel from the layout")
        )
        .subcommand(
            SubCommand::with_name("run")
                .about("▶️  Replay a scenario against the panel")
                .arg(
                    Arg::with_name("scenario")
                        .help("Scenario JSON file")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::with_name("rate")
                        .short("r")
                        .long("rate")
                        .value_name("HZ")
                        .help("Pace frames at a fixed tick rate instead of replaying instantly")
                        .takes_value(true)
                        .validator(|v| match v.parse::<u64>().ok().and_then(tick_period) {
                            Some(_) => Ok(()),
                            None => Err(format!("Rate must be a whole number of Hz between 1 and {}", MAX_RATE_HZ)),
                        }),
                ),
        )
        .get_matches();

    let level = if matches.is_present("verbose") { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt().with_max_level(level).init();

    let layout = match matches.value_of("layout") {
        Some(path) => PanelLayout::load(path)?,
        None => PanelLayout::boeing_737ng(),
    };
    let format = matches.value_of("format").unwrap_or("table");

    match matches.subcommand() {
        ("layout", Some(_)) => print_layout(&layout, format)?,
        ("check", Some(_)) => handle_check(&layout)?,
        ("run", Some(sub_matches)) => handle_run(sub_matches, &layout, format).await?,
        _ => unreachable!("subcommand required"),
    }

    Ok(())
}

fn handle_check(layout: &PanelLayout) -> Result<(), Box<dyn std::error::Error>> {
    layout.validate()?;
    let source = layout.allocate_source();
    let panel = Panel::new(layout, &source)?;
    println!(
        "{} Layout OK: {} system annunciators over {} sub-annunciators",
        "✅".green(),
        panel.len().to_string().bright_white(),
        layout.sub_annunciator_count.to_string().bright_white()
    );
    Ok(())
}

async fn handle_run(
    matches: &ArgMatches<'_>,
    default_layout: &PanelLayout,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = matches.value_of("scenario").unwrap_or_default();
    let scenario = Scenario::load(path)?;
    let layout = scenario.layout_or(default_layout);

    let source = layout.allocate_source();
    let mut panel = Panel::new(layout, &source)?;

    let mut interval = match matches.value_of("rate") {
        Some(rate) => {
            let hz: u64 = rate.parse()?;
            let period = tick_period(hz).ok_or_else(|| format!("Unsupported tick rate: {} Hz", hz))?;
            Some(time::interval(period))
        }
        None => None,
    };

    info!(frames = scenario.frames.len(), "replaying scenario");

    for (index, frame) in scenario.frames.iter().enumerate() {
        if let Some(interval) = interval.as_mut() {
            interval.tick().await;
        }

        let report = scenario::step(&source, &mut panel, index, frame)?;
        print_frame(&report, format)?;
    }

    Ok(())
}

fn print_layout(layout: &PanelLayout, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    if format == "json" {
        println!("{}", layout.to_json()?);
        return Ok(());
    }

    println!("{}", "📋 Panel Layout".bright_cyan().bold());
    for group in &layout.groups {
        match format {
            "compact" => println!("{} {}..{}", group.name, group.begin, group.end),
            _ => println!(
                "  {:<10} {:>3}..{:<3} ({} sub-annunciators)",
                group.name.bright_white(),
                group.begin,
                group.end,
                group.end - group.begin
            ),
        }
    }
    println!("  {} sub-annunciators total", layout.sub_annunciator_count);
    Ok(())
}

fn print_frame(report: &FrameReport, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        "json" => println!("{}", serde_json::to_string(report)?),
        "compact" => {
            let lamps: String = report
                .groups
                .iter()
                .map(|group| if group.lit { '●' } else { '○' })
                .collect();
            println!("{:>5} {} {} lit", report.frame, lamps, report.lit_count());
        }
        _ => {
            println!("{} {}", "Frame".bright_cyan(), report.frame.to_string().bright_white());
            for group in &report.groups {
                let state = match group.state {
                    AnnunciatorState::Dark => "DARK".white(),
                    AnnunciatorState::Pending => "PENDING".yellow(),
                    AnnunciatorState::Lit => "LIT".bright_yellow().bold(),
                    AnnunciatorState::Overridden => "TEST".bright_red(),
                };
                let active = if group.active { "active".red() } else { "clear".green() };
                println!("  {:<10} {:<8} {}", group.name, state, active);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_period_common_rates() {
        assert_eq!(tick_period(1), Some(Duration::from_secs(1)));
        assert_eq!(tick_period(20), Some(Duration::from_millis(50)));
        assert_eq!(tick_period(2000), Some(Duration::from_micros(500)));
    }

    #[test]
    fn test_tick_period_keeps_sub_millisecond_precision() {
        // 600 Hz must not round to a 1 ms (1000 Hz) period
        let period = tick_period(600).unwrap();
        assert_eq!(period, Duration::from_nanos(1_666_666));
        assert!(period > Duration::from_millis(1));
    }

    #[test]
    fn test_tick_period_rejects_unrepresentable_rates() {
        assert_eq!(tick_period(0), None);
        assert_eq!(tick_period(MAX_RATE_HZ), Some(Duration::from_nanos(1)));
        assert_eq!(tick_period(MAX_RATE_HZ + 1), None);
        assert_eq!(tick_period(u64::MAX), None);
    }

    #[tokio::test]
    async fn test_tick_period_drives_an_interval() {
        let mut interval = time::interval(tick_period(5000).unwrap());
        interval.tick().await;
        interval.tick().await;
    }
}
