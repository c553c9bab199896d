//! CLI subcommands: `search`, `list`, `fetch`, `publish`, `relays`.

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use serde::Serialize;
use snip_core::{dedup_relays, RelayDescriptor, SearchFilter, SignerConfig, SnippetConfig, SnippetDraft};
use snip_relay::{signer_from_config, EventStore, NostrRelayPool, SnippetClient};
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use crate::output;

pub const NSEC_ENV: &str = "SNIPSTR_NSEC";

#[derive(Subcommand, Debug)]
pub enum SnippetCommands {
    /// Search snippets by free text and filters
    Search {
        /// Free-text query (may be empty to list by filters only)
        #[arg(num_args = 0..)]
        query: Vec<String>,
        /// Language, e.g. rust, py, ts
        #[arg(short, long)]
        language: Option<String>,
        /// Category tag (repeatable; any match)
        #[arg(short, long = "tag")]
        tags: Vec<String>,
        /// Author npub or hex pubkey
        #[arg(short, long)]
        author: Option<String>,
        /// Maximum number of results
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        /// Extra relay to include (repeatable)
        #[arg(short, long = "relay")]
        relays: Vec<String>,
    },
    /// List snippets published by an author (defaults to your identity)
    List {
        /// Author npub or hex pubkey
        author: Option<String>,
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        #[arg(short, long = "relay")]
        relays: Vec<String>,
    },
    /// Fetch one snippet by event id (hex or note1)
    Fetch {
        id: String,
        #[arg(short, long = "relay")]
        relays: Vec<String>,
    },
    /// Publish a file (or `-` for stdin) as a snippet
    Publish {
        file: String,
        #[command(flatten)]
        draft: DraftArgs,
        #[arg(short, long = "relay")]
        relays: Vec<String>,
    },
    /// Show configured relays, optionally probing NIP-50 support
    Relays {
        #[arg(long)]
        probe: bool,
    },
}

/// Snippet metadata flags for `publish`.
#[derive(Args, Debug, Default)]
pub struct DraftArgs {
    /// Title; defaults to the file name
    #[arg(long)]
    title: Option<String>,
    /// Language; guessed from the extension when omitted
    #[arg(short, long)]
    language: Option<String>,
    #[arg(long)]
    extension: Option<String>,
    #[arg(short, long)]
    description: Option<String>,
    #[arg(long)]
    runtime: Option<String>,
    #[arg(long)]
    license: Option<String>,
    /// Source repository URL
    #[arg(long)]
    repo: Option<String>,
    /// Dependency (repeatable)
    #[arg(long = "dep")]
    deps: Vec<String>,
    /// Category tag (repeatable)
    #[arg(short, long = "tag")]
    tags: Vec<String>,
}

impl DraftArgs {
    /// Draft for `content`, filling title and extension from the file name.
    pub fn into_draft(self, file: &str, content: String) -> SnippetDraft {
        let path = Path::new(file);
        let from_file = file != "-";
        let title = self.title.or_else(|| {
            from_file
                .then(|| path.file_name())
                .flatten()
                .map(|n| n.to_string_lossy().into_owned())
        });
        let extension = self.extension.or_else(|| {
            from_file
                .then(|| path.extension())
                .flatten()
                .map(|e| e.to_string_lossy().into_owned())
        });
        SnippetDraft {
            content,
            title,
            language: self.language,
            extension,
            description: self.description,
            runtime: self.runtime,
            license: self.license,
            repo: self.repo,
            dependencies: self.deps,
            tags: self.tags,
        }
    }
}

#[derive(Debug, Serialize)]
struct RelayReport<'a> {
    relays: &'a [String],
    search_relays: &'a [String],
    index_relays: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    probed: Option<Vec<RelayDescriptor>>,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Client for read-only commands. A local key, if configured, supplies the
/// identity; a bunker is only contacted when publishing.
async fn read_client(config: &SnippetConfig) -> Result<SnippetClient> {
    let pool = Arc::new(NostrRelayPool::with_http_timeout(config.timeouts.probe())?);
    let client = SnippetClient::new(pool, Arc::new(EventStore::new()), config)?;
    let env_nsec = std::env::var(NSEC_ENV).ok();
    if env_nsec.is_some() || config.signer.nsec.is_some() {
        let local = SignerConfig {
            nsec: config.signer.nsec.clone(),
            bunker: None,
        };
        if let Some(signer) = signer_from_config(&local, env_nsec.as_deref(), config.timeouts.publish())? {
            return Ok(client.with_signer(signer).await?);
        }
    }
    Ok(client)
}

async fn publish_client(config: &SnippetConfig) -> Result<SnippetClient> {
    let pool = Arc::new(NostrRelayPool::with_http_timeout(config.timeouts.probe())?);
    let client = SnippetClient::new(pool, Arc::new(EventStore::new()), config)?;
    let env_nsec = std::env::var(NSEC_ENV).ok();
    let signer = signer_from_config(&config.signer, env_nsec.as_deref(), config.timeouts.publish())?
        .context("Publishing needs a signer: set `signer.nsec`, `signer.bunker` or SNIPSTR_NSEC")?;
    Ok(client.with_signer(signer).await?)
}

fn read_source(file: &str) -> Result<String> {
    if file == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read snippet from stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(file).with_context(|| format!("Failed to read {file}"))
}

pub async fn handle_command(cmd: SnippetCommands, config: &SnippetConfig, json: bool) -> Result<()> {
    match cmd {
        SnippetCommands::Search {
            query,
            language,
            tags,
            author,
            limit,
            relays,
        } => {
            let client = read_client(config).await?;
            let filter = SearchFilter {
                query: query.join(" "),
                language,
                tags,
                author,
                limit,
            };
            let result = client.search(&filter, &relays).await?;
            if json {
                print_json(&result)?;
            } else {
                println!("{}", output::format_search(&result));
            }
        }

        SnippetCommands::List {
            author,
            limit,
            relays,
        } => {
            let client = read_client(config).await?;
            let snippets = match author {
                Some(author) => client.list_by_author(&author, limit, &relays).await?,
                None => match client.identity() {
                    Some(pk) => client.list_by_author(&pk.to_hex(), limit, &relays).await?,
                    None => bail!("No author given and no identity configured (`pubkey` or a signer)"),
                },
            };
            if json {
                print_json(&snippets)?;
            } else {
                println!("{}", output::format_list(&snippets));
            }
        }

        SnippetCommands::Fetch { id, relays } => {
            let client = read_client(config).await?;
            match client.fetch_by_id(&id, &relays).await? {
                Some(snippet) if json => print_json(&snippet)?,
                Some(snippet) => println!("{}", output::format_full(&snippet)),
                None if json => println!("null"),
                None => println!("No snippet found for id: {id}"),
            }
        }

        SnippetCommands::Publish {
            file,
            draft,
            relays,
        } => {
            let draft = draft.into_draft(&file, read_source(&file)?);
            draft.validate()?;
            let client = publish_client(config).await?;
            let outcome = client.publish(&draft, &relays).await?;
            if json {
                print_json(&outcome)?;
            } else {
                println!("{}", output::format_publish(&outcome));
            }
        }

        SnippetCommands::Relays { probe } => {
            let client = read_client(config).await?;
            let resolver = client.resolver();
            let relays = resolver.configured_relays();
            let search_relays = resolver.configured_search_relays();
            let index_relays = resolver.configured_index_relays();
            let probed = if probe {
                let all = dedup_relays(search_relays.iter().chain(relays));
                Some(client.prober().probe_all(&all).await)
            } else {
                None
            };

            let report = RelayReport {
                relays,
                search_relays,
                index_relays,
                probed,
            };
            if json {
                print_json(&report)?;
            } else {
                println!("📡 Relays:");
                for url in report.relays {
                    println!("   {url}");
                }
                println!("🔎 Search relays:");
                for url in report.search_relays {
                    println!("   {url}");
                }
                println!("📇 Index relays:");
                for url in report.index_relays {
                    println!("   {url}");
                }
                if let Some(ref probed) = report.probed {
                    println!("🧪 Probe results:");
                    for descriptor in probed {
                        println!("   {}", output::format_relay(descriptor));
                    }
                }
            }
        }
    }

    Ok(())
}
