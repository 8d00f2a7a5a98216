//! Output formatting helpers.

use anyhow::Result;
use chrono::SecondsFormat;
use colored::Colorize;
use serde::Serialize;

use pollcache::{CollectionSnapshot, LoadOutcome};
use pollcache_core::PollVote;

/// Print a success message.
pub fn success(msg: &str) {
    eprintln!("{} {}", "✓".green(), msg);
}

/// Print an error message.
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a labeled field.
pub fn field(label: &str, value: &str) {
    println!("{}: {}", label.dimmed(), value);
}

/// Print a value as compact JSON.
pub fn json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string(value)?;
    println!("{}", json);
    Ok(())
}

/// Wire view of a collection snapshot.
#[derive(Debug, Serialize)]
struct SnapshotView<'a> {
    items: &'a [PollVote],
    loading: bool,
    has_next_page: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Print a collection snapshot, as one JSON line or as a listing.
pub fn snapshot(snapshot: &CollectionSnapshot, as_json: bool) -> Result<()> {
    let error = snapshot.error.as_ref().map(|err| err.to_string());

    if as_json {
        return json(&SnapshotView {
            items: &snapshot.items,
            loading: snapshot.loading,
            has_next_page: snapshot.has_next_page,
            error,
        });
    }

    if snapshot.items.is_empty() {
        println!("{}", "No items.".dimmed());
    }
    for vote in &snapshot.items {
        println!("{}", vote_line(vote));
    }
    field("has_next_page", &snapshot.has_next_page.to_string());
    field("loading", &snapshot.loading.to_string());
    if let Some(error) = error {
        field("error", &error.red().to_string());
    }
    Ok(())
}

/// Report the outcome of a `load-more` step on stderr.
pub fn load_outcome(outcome: &LoadOutcome) {
    match outcome {
        LoadOutcome::Loaded {
            added,
            has_next_page,
        } => success(&format!("Loaded {} item(s), more: {}", added, has_next_page)),
        LoadOutcome::Skipped(reason) => {
            eprintln!("{} {:?}", "Skipped load:".dimmed(), reason)
        }
        LoadOutcome::Failed(err) => error(&format!("Load failed: {}", err)),
    }
}

fn vote_line(vote: &PollVote) -> String {
    let body = match (&vote.answer_text, &vote.option_id) {
        (Some(text), _) => format!("{} {}", "ANSWER".cyan(), text),
        (None, Some(option)) => format!("{} {}", "VOTE".green(), option),
        (None, None) => "VOTE".green().to_string(),
    };
    let user = vote.user_id.as_ref().map(|u| u.as_str()).unwrap_or("-");

    format!(
        "{} {} {} {}",
        vote.id,
        body,
        user.dimmed(),
        vote.created_at
            .to_rfc3339_opts(SecondsFormat::Secs, true)
            .dimmed()
    )
}
