//! `mediator kb` - manage the retrieved-document store.

use anyhow::{Context, Result, bail};
use clap::Subcommand;
use mediator_core::MediatorConfig;
use mediator_runtime::KnowledgeBase;
use std::path::PathBuf;

#[derive(Subcommand, Debug)]
pub enum KbCommand {
    /// Add a document (re-ingesting an id replaces it for lookups)
    Ingest {
        doc_id: String,

        /// Document text
        text: Option<String>,

        /// Read the document text from a file
        #[arg(long, conflicts_with = "text")]
        file: Option<PathBuf>,
    },

    /// List stored documents
    List,

    /// Print one document
    Show { doc_id: String },
}

pub fn execute(config: &MediatorConfig, cmd: KbCommand) -> Result<()> {
    let kb = KnowledgeBase::new(&config.knowledge_base.path);

    match cmd {
        KbCommand::Ingest {
            doc_id,
            text,
            file,
        } => {
            let text = match (text, file) {
                (Some(text), _) => text,
                (None, Some(path)) => std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                (None, None) => bail!("either TEXT or --file is required"),
            };
            kb.ingest(&doc_id, &text)?;
            tracing::info!(doc_id = %doc_id, path = %kb.path().display(), "Document ingested");
        }

        KbCommand::List => {
            let docs = kb.load()?;
            if docs.is_empty() {
                println!("No documents in {}", kb.path().display());
            }
            for doc in docs {
                println!("{}\t{}", doc.doc_id, preview(&doc.text, 60));
            }
        }

        KbCommand::Show { doc_id } => match kb.get(&doc_id)? {
            Some(doc) => println!("{}", serde_json::to_string_pretty(&doc)?),
            None => bail!("document '{}' not found in {}", doc_id, kb.path().display()),
        },
    }

    Ok(())
}

/// First `max` characters on one line.
fn preview(text: &str, max: usize) -> String {
    let flat = text.replace(['\n', '\r'], " ");
    if flat.chars().count() <= max {
        flat
    } else {
        let cut: String = flat.chars().take(max).collect();
        format!("{}...", cut)
    }
}
