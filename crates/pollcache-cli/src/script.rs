//! Fixture and replay script formats.
//!
//! A fixture is a JSON document `{"votes": [...]}` seeding the backend. A
//! script is JSON Lines, one step per line, tagged by `step`:
//!
//! ```text
//! {"step":"load-more"}
//! {"step":"cast","vote":{"id":"v9","option_id":"optA","created_at":"2024-05-01T10:00:00Z"}}
//! {"step":"answer","user_id":"alice","text":"tacos"}
//! {"step":"change","vote_id":"v9","option_id":"optB"}
//! {"step":"remove","vote_id":"v9"}
//! {"step":"fail-next","message":"connection reset"}
//! {"step":"show"}
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use pollcache_core::{OptionId, PollVote, UserId, VoteId};

/// Records seeded into the backend before the collection is activated.
#[derive(Debug, Default, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub votes: Vec<PollVote>,
}

/// One scripted action.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "step", rename_all = "kebab-case")]
pub enum Step {
    /// Fetch the next page.
    LoadMore,
    /// Store a vote or answer and publish a cast event.
    Cast { vote: PollVote },
    /// Add a free-text answer.
    Answer { user_id: UserId, text: String },
    /// Move a vote to another option.
    Change { vote_id: VoteId, option_id: OptionId },
    /// Delete a vote or answer.
    Remove { vote_id: VoteId },
    /// Make the next page fetch fail.
    FailNext {
        #[serde(default = "default_failure")]
        message: String,
    },
    /// Print the collection.
    Show,
}

fn default_failure() -> String {
    "injected failure".to_string()
}

pub async fn load_fixture(path: &Path) -> Result<Fixture> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read fixture {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid fixture {}", path.display()))
}

pub async fn load_script(path: &Path) -> Result<Vec<Step>> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read script {}", path.display()))?;
    parse_script(&text).with_context(|| format!("Invalid script {}", path.display()))
}

/// Parse JSON Lines steps, skipping blank lines.
pub fn parse_script(text: &str) -> Result<Vec<Step>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str(line).with_context(|| format!("line {}: {}", index + 1, line.trim()))
        })
        .collect()
}
