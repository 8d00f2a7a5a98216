//! Replay command implementation.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{ArgGroup, Args};
use tracing::info;

use pollcache::{CollectionConfig, LiveCollection};
use pollcache_core::error::FetchError;
use pollcache_core::{OptionId, PollId, PollVote, Scope};
use pollcache_memory::MemoryPollStore;

use crate::output;
use crate::script::{self, Step};

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("scope").required(true).args(["answers", "option"])))]
pub struct ReplayArgs {
    /// JSON fixture with the votes to seed ({"votes": [...]})
    #[arg(long)]
    pub fixture: PathBuf,

    /// Poll to track
    #[arg(long)]
    pub poll: String,

    /// Track the poll's free-text answers
    #[arg(long)]
    pub answers: bool,

    /// Track the votes cast for this option
    #[arg(long)]
    pub option: Option<String>,

    /// Items per page
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Do not fetch the first page on activation
    #[arg(long)]
    pub no_auto_load: bool,

    /// JSON Lines script of steps to replay
    #[arg(long)]
    pub script: Option<PathBuf>,

    /// Print snapshots as JSON
    #[arg(long)]
    pub json: bool,
}

impl ReplayArgs {
    fn scope(&self, poll_id: PollId) -> Result<Scope> {
        match &self.option {
            Some(option) => Ok(Scope::OptionVotes {
                poll_id,
                option_id: OptionId::new(option.as_str()).context("Invalid option id")?,
            }),
            None => Ok(Scope::Answers { poll_id }),
        }
    }

    fn config(&self) -> CollectionConfig {
        let config = CollectionConfig::default().with_load_first_page(!self.no_auto_load);
        match self.page_size {
            Some(size) => config.with_page_size(Some(size)),
            None => config,
        }
    }
}

pub async fn run(args: ReplayArgs) -> Result<()> {
    let poll_id = PollId::new(args.poll.as_str()).context("Invalid poll id")?;
    let scope = args.scope(poll_id.clone())?;

    let fixture = script::load_fixture(&args.fixture).await?;
    let steps = match &args.script {
        Some(path) => script::load_script(path).await?,
        None => Vec::new(),
    };

    let store = MemoryPollStore::new();
    let seeded = fixture.votes.len();
    for vote in fixture.votes {
        let vote = owned_by(vote, &poll_id);
        let id = vote.id.clone();
        store
            .insert(vote)
            .with_context(|| format!("Failed to seed vote {}", id))?;
    }
    info!(votes = seeded, scope = %scope, "Seeded fixture");

    let collection = LiveCollection::new(
        scope,
        Arc::new(store.fetcher(poll_id.clone())),
        Arc::new(store.clone()),
        args.config(),
    );
    collection.activate().await;

    for step in steps {
        apply(&step, &collection, &store, &poll_id, args.json)
            .await
            .with_context(|| format!("Step failed: {:?}", step))?;
    }

    output::snapshot(&collection.snapshot(), args.json)?;
    collection.close();
    Ok(())
}

async fn apply(
    step: &Step,
    collection: &LiveCollection,
    store: &MemoryPollStore,
    poll_id: &PollId,
    as_json: bool,
) -> Result<()> {
    match step {
        Step::LoadMore => {
            let outcome = collection.load_more().await;
            output::load_outcome(&outcome);
        }
        Step::Cast { vote } => {
            store.cast(owned_by(vote.clone(), poll_id))?;
        }
        Step::Answer { user_id, text } => {
            store.add_answer(poll_id, user_id, text);
        }
        Step::Change { vote_id, option_id } => {
            store.change_vote(vote_id, option_id)?;
        }
        Step::Remove { vote_id } => {
            store.remove_vote(vote_id)?;
        }
        Step::FailNext { message } => {
            store.fail_next_fetch(FetchError::transport(message));
        }
        Step::Show => output::snapshot(&collection.snapshot(), as_json)?,
    }
    Ok(())
}

/// Votes without a poll belong to the replayed one.
fn owned_by(vote: PollVote, poll_id: &PollId) -> PollVote {
    if vote.poll_id.is_some() {
        vote
    } else {
        vote.with_poll(poll_id.clone())
    }
}
