use anyhow::{bail, Context, Result};
use courseviewer::catalog::Course;
use courseviewer::{logging, CatalogClient, FilterCriteria, Session, ViewerConfig};
use std::path::Path;
use tracing::{info, warn};

/// Environment variable naming an optional JSON config file.
const CONFIG_ENV: &str = "COURSEVIEWER_CONFIG";

const USAGE: &str = "usage: courseviewer [TERM_CODE [subject=..] [number=..] [title=..] [attribute=..]]";

#[tokio::main]
async fn main() -> Result<()> {
    logging::init("info");

    let config = match std::env::var(CONFIG_ENV) {
        Ok(path) => {
            let mut config = ViewerConfig::load_from_file(Path::new(&path))
                .with_context(|| format!("Failed to load {}", path))?;
            config.apply_env();
            config
        }
        Err(_) => ViewerConfig::from_env_or_default(),
    };
    info!(base_url = %config.service.base_url, "Starting course viewer");

    let client = CatalogClient::new(&config.service)?;
    let mut session = Session::new();
    session
        .refresh_terms(&client)
        .await
        .context("Could not fetch terms from the server")?;

    let mut args = std::env::args().skip(1);
    let Some(term_code) = args.next() else {
        for term in session.terms() {
            println!("{}  {}", term.code, term.description);
        }
        return Ok(());
    };
    let criteria = parse_filters(args)?;

    if let Err(e) = session.load_term(&client, &term_code, false).await {
        if !e.needs_refresh() {
            bail!("{}", e.user_message());
        }
        warn!(error = %e, "No cached data for term, requesting a refresh");
        session
            .load_term(&client, &term_code, true)
            .await
            .map_err(|e| anyhow::anyhow!(e.user_message()))?;
    }

    session.apply_filters(criteria);
    let filtered = session.filtered();
    for category in filtered.sorted_categories() {
        let courses = filtered.get(category).unwrap_or_default();
        println!("== {} ({})", category, courses.len());
        for course in courses {
            println!("  {}", describe(course));
        }
    }
    Ok(())
}

fn parse_filters(args: impl Iterator<Item = String>) -> Result<FilterCriteria> {
    let mut criteria = FilterCriteria::new();
    for arg in args {
        let Some((key, value)) = arg.split_once('=') else {
            bail!("expected key=value, got {:?}\n{}", arg, USAGE);
        };
        criteria = match key {
            "subject" => criteria.with_subject(value),
            "number" => criteria.with_course_number(value),
            "title" => criteria.with_title(value),
            "attribute" => criteria.with_attribute(value),
            _ => bail!("unknown filter {:?}\n{}", key, USAGE),
        };
    }
    Ok(criteria)
}

fn describe(course: &Course) -> String {
    let slot = match course.primary_meeting() {
        Some(meeting) if meeting.is_online() => "Online".to_string(),
        Some(meeting) if meeting.is_scheduled() => format!(
            "{} - {}  {}",
            meeting.format_begin(),
            meeting.format_end(),
            meeting.building
        ),
        _ => "TBD".to_string(),
    };
    format!(
        "{}-{}  {}  ({} cr)  {}",
        course.display_code(),
        course.section,
        course.course_name,
        course.credits,
        slot
    )
}
