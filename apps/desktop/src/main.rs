use std::{path::PathBuf, sync::Arc};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    load_settings, ClientSettings, CreationController, DataUrlFileReader, EditOutcome,
    HttpPostService, ListingController,
};
use shared::domain::{Post, PostId};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "postboard", about = "Create, list, edit, and delete posts")]
struct Cli {
    /// Overrides `api_base_url` from postboard.toml and the environment.
    #[arg(long, global = true)]
    api_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    List {
        #[arg(long)]
        json: bool,
    },
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        image: Option<PathBuf>,
    },
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, conflicts_with = "clear_image")]
        image: Option<PathBuf>,
        #[arg(long)]
        clear_image: bool,
    },
    Delete {
        id: String,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn summarize(post: &Post) -> String {
    let image = if post.image.is_some() { " [image]" } else { "" };
    let first_line = post.description.lines().next().unwrap_or_default();
    format!("{}  {}{image}\n    {first_line}", post.id, post.title)
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let settings = match cli.api_url {
        Some(api_base_url) => ClientSettings {
            api_base_url: client_core::config::normalize_base_url(&api_base_url),
        },
        None => load_settings(),
    };
    let service = Arc::new(HttpPostService::from_settings(&settings)?);
    let file_reader = Arc::new(DataUrlFileReader);
    tracing::debug!(base_url = %service.base_url(), "using post service");

    match cli.command {
        Command::List { json } => {
            let mut listing = ListingController::new(service, file_reader);
            listing.refresh().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(listing.items())?);
            } else if listing.items().is_empty() {
                println!("no posts");
            } else {
                for post in listing.items() {
                    println!("{}", summarize(post));
                }
            }
        }
        Command::Create {
            title,
            description,
            image,
        } => {
            let mut creation = CreationController::new(service, file_reader);
            creation.attach_image(image.as_deref()).await?;
            let draft = creation.draft_mut();
            draft.title = title;
            draft.description = description;
            let draft = creation.draft().clone();
            match creation.submit(draft).await? {
                Some(post) => println!("created {}", post.id),
                None => println!("created"),
            }
        }
        Command::Update {
            id,
            title,
            description,
            image,
            clear_image,
        } => {
            let id = PostId::new(id);
            let mut listing = ListingController::new(service, file_reader);
            listing.refresh().await?;
            let target = listing
                .post(&id)
                .cloned()
                .ok_or_else(|| anyhow!("no post with id {id}"))?;
            listing.begin_edit(&target);
            listing.attach_edit_image(image.as_deref()).await?;

            let mut working_copy = listing
                .editing()
                .map(|session| session.working_copy.clone())
                .context("edit session closed unexpectedly")?;
            if let Some(title) = title {
                working_copy.title = title;
            }
            if let Some(description) = description {
                working_copy.description = description;
            }
            if clear_image {
                working_copy.image = None;
            }
            let outcome = listing.submit_edit(working_copy).await?;
            if let EditOutcome::SavedWithStaleListing(err) = outcome {
                tracing::warn!("post updated but listing could not be reloaded: {err}");
            }
            println!("updated {id}");
        }
        Command::Delete { id } => {
            let id = PostId::new(id);
            let mut listing = ListingController::new(service, file_reader);
            listing.delete_post(&id).await?;
            println!("deleted {id}");
        }
    }

    Ok(())
}
