//! `horoscope` command-line shell.
//!
//! # Responsibility
//! - Drive the same page services as the Flutter shell from a terminal.
//! - Print the localized strings the UI would show.
//!
//! # Invariants
//! - State lives in the same SQLite file layout the FFI uses.
//! - `--language` applies to one invocation; `language` persists it.

use clap::{Parser, Subcommand};
use horoscope_core::db::open_db;
use horoscope_core::view::{
    ascendant_line, format_degrees, overall_synthesis, placement_roast_text, placement_title,
    roast_sections, sign_info_rows,
};
use horoscope_core::{
    default_log_level, init_logging_with, resolve_state_db_path, ActionOutcome, ApiClient,
    AppController, ChartService, CitySearchOutcome, CitySearcher, ClientConfig,
    HoroscopeService, Language, LogEcho, Page, Period, PlacementRoasts, SqliteStateRepository,
    Translations,
};
use log::info;
use rusqlite::Connection;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "horoscope", author, version, about = "(brutally) Honest horoscope")]
struct Cli {
    /// State database file (defaults to HOROSCOPE_DB_PATH or the temp dir).
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Language for this run only: English, French or Russian.
    #[arg(long, global = true)]
    language: Option<String>,

    /// Directory for rolling log files; logging is off without it.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Calculate the sign for a birth date (YYYY-MM-DD).
    Sign { date: String },
    /// Fetch the roast for a sign, in any supported language.
    Roast {
        sign: String,
        #[arg(long, default_value = "daily")]
        period: String,
    },
    /// Search birth cities.
    Cities { query: String },
    /// Calculate a birth chart.
    Chart(BirthArgs),
    /// Calculate a birth chart and stream a roast per placement.
    RoastChart(BirthArgs),
    /// Persist the UI language and refresh stored roasts.
    Language { language: String },
    /// Switch the active page (home or birth-chart).
    Page { page: String },
    /// Show the persisted state.
    Status,
}

#[derive(clap::Args, Debug)]
struct BirthArgs {
    /// YYYY-MM-DD
    date: String,
    /// HH:MM
    time: String,
    #[arg(allow_hyphen_values = true)]
    latitude: String,
    #[arg(allow_hyphen_values = true)]
    longitude: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    if let Some(log_dir) = &cli.log_dir {
        let log_dir = absolute(log_dir)?;
        init_logging_with(
            default_log_level(),
            &log_dir.to_string_lossy(),
            LogEcho::Stderr,
        )
        .map_err(|err| err.to_string())?;
    }

    let db_path = cli.db.clone().unwrap_or_else(resolve_state_db_path);
    let conn = open_db(&db_path).map_err(|err| format!("state DB open failed: {err}"))?;
    let client = ApiClient::new(ClientConfig::from_env()).map_err(|err| err.to_string())?;
    let language = match &cli.language {
        Some(raw) => parse_language(raw)?,
        None => AppController::load(SqliteStateRepository::new(&conn), client.clone())
            .map_err(|err| err.to_string())?
            .language(),
    };
    info!(
        "event=cli_command module=cli status=start command={}",
        command_name(&cli.command)
    );

    match cli.command {
        Command::Sign { date } => sign(&conn, client, language, &date).await,
        Command::Roast { sign, period } => roast(&conn, client, language, &sign, &period).await,
        Command::Cities { query } => cities(client, &query).await,
        Command::Chart(args) => chart(&conn, client, language, &args, false).await,
        Command::RoastChart(args) => chart(&conn, client, language, &args, true).await,
        Command::Language { language } => change_language(&conn, client, &language).await,
        Command::Page { page } => switch_page(&conn, client, &page),
        Command::Status => status(&conn, client, language, &db_path),
    }
}

async fn sign(
    conn: &Connection,
    client: ApiClient,
    language: Language,
    date: &str,
) -> Result<(), String> {
    let t = Translations::for_language(language);
    let mut page = HoroscopeService::load(SqliteStateRepository::new(conn), client)
        .map_err(|err| err.to_string())?;
    page.set_birth_date(date).map_err(|err| err.to_string())?;
    let outcome = page
        .calculate_sign(language)
        .await
        .map_err(|err| err.to_string())?;
    check(outcome)?;

    let form = page.form();
    println!("{}: {}", t.your_sign, form.display_sign);
    if let Some(info) = &form.sign_info {
        println!("{}", t.sign_details);
        for (label, value) in sign_info_rows(info, t) {
            println!("  {label}: {value}");
        }
    }
    Ok(())
}

async fn roast(
    conn: &Connection,
    client: ApiClient,
    language: Language,
    sign: &str,
    period: &str,
) -> Result<(), String> {
    let t = Translations::for_language(language);
    let period = Period::parse(period).ok_or_else(|| {
        format!("unknown period `{period}`; expected daily|tomorrow|yesterday|weekly|monthly")
    })?;
    let mut page = HoroscopeService::load(SqliteStateRepository::new(conn), client)
        .map_err(|err| err.to_string())?;
    page.select_sign(sign).map_err(|err| err.to_string())?;
    page.set_period(period).map_err(|err| err.to_string())?;
    let outcome = page.fetch_roast(language).await.map_err(|err| err.to_string())?;
    check(outcome)?;

    let form = page.form();
    println!("{} {} - {}", form.display_sign, t.horoscope, period.label(t));
    if let Some(roast) = &form.roast {
        for (label, text) in roast_sections(roast, t) {
            match label {
                Some(label) => println!("\n{label}\n{text}"),
                None => println!("\n{text}"),
            }
        }
    }
    Ok(())
}

async fn cities(client: ApiClient, query: &str) -> Result<(), String> {
    let min_chars = client.config().search_min_chars;
    let searcher = CitySearcher::new(client);
    match searcher.search(query).await {
        CitySearchOutcome::Suggestions(suggestions) => {
            for city in suggestions {
                println!(
                    "{}\t{}\t{}",
                    city.display_name, city.latitude, city.longitude
                );
            }
            Ok(())
        }
        CitySearchOutcome::TooShort => {
            Err(format!("query must be at least {min_chars} characters"))
        }
        CitySearchOutcome::Superseded | CitySearchOutcome::Failed => {
            Err("city search failed".to_string())
        }
    }
}

async fn chart(
    conn: &Connection,
    client: ApiClient,
    language: Language,
    args: &BirthArgs,
    with_roasts: bool,
) -> Result<(), String> {
    let t = Translations::for_language(language);
    let mut page = ChartService::load(SqliteStateRepository::new(conn), client)
        .map_err(|err| err.to_string())?;
    page.set_birth_date(&args.date).map_err(|err| err.to_string())?;
    page.set_birth_time(&args.time).map_err(|err| err.to_string())?;
    page.set_use_city_search(false)
        .map_err(|err| err.to_string())?;
    page.set_latitude(&args.latitude)
        .map_err(|err| err.to_string())?;
    page.set_longitude(&args.longitude)
        .map_err(|err| err.to_string())?;

    let outcome = if with_roasts {
        let mut printed = BTreeSet::new();
        page.roast_chart(language, |roasts| print_new_roasts(roasts, &mut printed))
            .await
    } else {
        page.calculate_chart(language).await
    }
    .map_err(|err| err.to_string())?;
    if outcome == ActionOutcome::Skipped {
        return Err(t.invalid_birth_details.to_string());
    }
    check(outcome)?;

    let form = page.form();
    let Some(birth_chart) = &form.birth_chart else {
        return Err(t.error_calculating_chart.to_string());
    };
    println!("\n{}", t.birth_chart);
    for (planet, placement) in birth_chart.ordered_planets() {
        println!(
            "  {} {:<10} {:<12} {}",
            placement.symbol,
            planet,
            placement.sign,
            format_degrees(placement.sign_degrees)
        );
    }
    if let Some(ascendant) = &birth_chart.ascendant {
        println!("{}: {}", t.ascendant, ascendant_line(ascendant));
    }
    println!("{}: {}", t.birth_chart_wheel, form.chart_image_url);

    if with_roasts {
        if let Some(synthesis) = overall_synthesis(&form.placement_roasts) {
            println!("\n{}\n{synthesis}", t.overall);
        }
        for (planet, placement) in birth_chart.ordered_planets() {
            println!("\n{}", placement_title(planet, placement, language));
            println!(
                "{}",
                placement_roast_text(Some(&form.placement_roasts), planet, false, t)
            );
        }
    }
    Ok(())
}

fn print_new_roasts(roasts: &PlacementRoasts, printed: &mut BTreeSet<String>) {
    for (planet, roast) in roasts {
        if printed.insert(planet.clone()) {
            eprintln!("[{planet}] {roast}");
        }
    }
}

async fn change_language(conn: &Connection, client: ApiClient, raw: &str) -> Result<(), String> {
    let language = parse_language(raw)?;
    let mut app = AppController::load(SqliteStateRepository::new(conn), client)
        .map_err(|err| err.to_string())?;
    let refresh = app
        .change_language(language)
        .await
        .map_err(|err| err.to_string())?;
    println!(
        "{}: {} (horoscope refreshed: {}, chart refreshed: {})",
        app.translations().language,
        language.native_label(),
        refresh.horoscope,
        refresh.chart
    );
    Ok(())
}

fn switch_page(conn: &Connection, client: ApiClient, raw: &str) -> Result<(), String> {
    let page =
        Page::parse(raw).ok_or_else(|| format!("unknown page `{raw}`; expected home|birth-chart"))?;
    let mut app = AppController::load(SqliteStateRepository::new(conn), client)
        .map_err(|err| err.to_string())?;
    let switched = app.switch_page(page).map_err(|err| err.to_string())?;
    let t = app.translations();
    let label = match page {
        Page::Home => t.home,
        Page::BirthChart => t.birth_chart,
    };
    println!("{label}{}", if switched { "" } else { " (unchanged)" });
    Ok(())
}

fn status(
    conn: &Connection,
    client: ApiClient,
    language: Language,
    db_path: &std::path::Path,
) -> Result<(), String> {
    let t = Translations::for_language(language);
    let app = AppController::load(SqliteStateRepository::new(conn), client.clone())
        .map_err(|err| err.to_string())?;
    let horoscope = HoroscopeService::load(SqliteStateRepository::new(conn), client.clone())
        .map_err(|err| err.to_string())?;
    let chart = ChartService::load(SqliteStateRepository::new(conn), client)
        .map_err(|err| err.to_string())?;

    println!("db: {}", db_path.display());
    println!("page: {}", app.page().as_str());
    println!("{}: {}", t.language, app.language().native_label());

    let form = horoscope.form();
    println!("\n{}", t.sign_calculator);
    println!("  {}: {}", t.enter_birth_date, form.birth_date);
    println!("  {}: {}", t.your_sign, form.display_sign);
    println!("  {}", form.period.label(t));

    let form = chart.form();
    println!("\n{}", t.birth_chart_calculator);
    println!("  {} {}", form.birth_date, form.birth_time);
    if let Some(city) = &form.selected_city {
        println!("  {}: {}", t.selected, city.display_name);
    }
    println!(
        "  {}: {}  {}: {}",
        t.latitude, form.latitude, t.longitude, form.longitude
    );
    if let Some(birth_chart) = &form.birth_chart {
        println!(
            "  {} planets, {} roasts",
            birth_chart.planets.len(),
            form.placement_roasts.len()
        );
    }
    Ok(())
}

fn check(outcome: ActionOutcome) -> Result<(), String> {
    match outcome {
        ActionOutcome::Failed(message) => Err(message),
        ActionOutcome::Completed | ActionOutcome::Skipped => Ok(()),
    }
}

fn parse_language(raw: &str) -> Result<Language, String> {
    Language::parse(raw)
        .ok_or_else(|| format!("unknown language `{raw}`; expected English|French|Russian"))
}

fn absolute(path: &std::path::Path) -> Result<PathBuf, String> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .map_err(|err| format!("cannot resolve `{}`: {err}", path.display()))
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Sign { .. } => "sign",
        Command::Roast { .. } => "roast",
        Command::Cities { .. } => "cities",
        Command::Chart(_) => "chart",
        Command::RoastChart(_) => "roast-chart",
        Command::Language { .. } => "language",
        Command::Page { .. } => "page",
        Command::Status => "status",
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_language, Cli, Command};
    use clap::Parser;

    #[test]
    fn global_flags_follow_subcommands() {
        let cli = Cli::parse_from([
            "horoscope",
            "roast",
            "Bélier",
            "--period",
            "weekly",
            "--language",
            "French",
        ]);
        assert_eq!(cli.language.as_deref(), Some("French"));
        match cli.command {
            Command::Roast { sign, period } => {
                assert_eq!(sign, "Bélier");
                assert_eq!(period, "weekly");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn negative_coordinates_are_positional() {
        let cli = Cli::parse_from([
            "horoscope",
            "roast-chart",
            "1990-06-15",
            "12:00",
            "-33.8688",
            "-151.2093",
        ]);
        match cli.command {
            Command::RoastChart(args) => {
                assert_eq!(args.latitude, "-33.8688");
                assert_eq!(args.longitude, "-151.2093");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn language_accepts_native_labels() {
        assert!(parse_language("Русский").is_ok());
        assert!(parse_language("Klingon").is_err());
    }
}
