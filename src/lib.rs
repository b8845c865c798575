//! # org2comment Library
//!
//! This crate keeps the `;;; Commentary:` section of an Emacs Lisp file in
//! sync with an Org document:
//!
//! - Find the region between `;;; Commentary:` and `;;; Code:`
//! - Render the Org document to plain text through an export engine
//! - Comment out every rendered line and splice the block into the region
//! - Remember which Org document belongs to the file in its local variables
//!
//! ## Usage
//!
//! ### To update a file on disk:
//!
//! ```rust,no_run
//! use org2comment::{Backend, BufferSet, ByPathRequest, CommandExporter, CommentFormatter};
//! use org2comment::{Context, Engine, NonInteractive, Renderer, convert_by_path};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let renderer = Renderer::new(CommandExporter::new(Engine::Emacs), Backend::default());
//!     let formatter = CommentFormatter::default();
//!     let mut buffers = BufferSet::new();
//!     let mut prompter = NonInteractive { save_cache: true };
//!
//!     let request = ByPathRequest {
//!         target: Some("foo.el".into()),
//!         companion: Some("README.org".into()),
//!     };
//!     let ctx = Context {
//!         renderer: &renderer,
//!         formatter: &formatter,
//!         buffers: &mut buffers,
//!         prompter: &mut prompter,
//!     };
//!
//!     convert_by_path(request, ctx).await?;
//!     Ok(())
//! }
//! ```

pub mod buffer;
pub mod cache;
pub mod cli;
pub mod document;
pub mod error;
pub mod filewalker;
pub mod flow;
pub mod formatter;
pub mod locator;
pub mod lock;
pub mod prompt;
pub mod render;
pub mod sink;
pub mod splicer;
pub mod utils;

pub use buffer::{Buffer, BufferSet};
pub use cli::{Config, Mode};
pub use error::Error;
pub use flow::{ByPathRequest, Context, ConversionReport, convert_by_path, convert_in_place};
pub use formatter::CommentFormatter;
pub use locator::{RegionBounds, locate};
pub use prompt::{NonInteractive, Prompter};
pub use render::{Backend, CommandExporter, Engine, Exporter, Renderer};
pub use sink::SinkOutcome;
pub use splicer::splice;

use anyhow::{Context as _, Result};
use log::{debug, info};
#[cfg(feature = "prompt")]
use std::io::IsTerminal;
use std::ops::Range;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Runs one conversion as described by `config`.
pub async fn run(config: Config) -> Result<()> {
    let renderer = Renderer::new(CommandExporter::new(config.engine), config.backend.clone());
    let formatter = CommentFormatter::new(config.comment_token.as_str());

    match &config.mode {
        Mode::Sync { target, companion } => {
            // paths typed on the command line are relative to the shell, not the target
            let companion = companion.as_deref().map(std::path::absolute).transpose()?;

            let mut buffers = BufferSet::new();
            let mut prompter = prompter_for(&config);

            let report = convert_by_path(
                ByPathRequest {
                    target: target.clone(),
                    companion,
                },
                Context {
                    renderer: &renderer,
                    formatter: &formatter,
                    buffers: &mut buffers,
                    prompter: prompter.as_mut(),
                },
            )
            .await?;

            if report.cache_saved {
                info!("Remembered the Org document in {}", report.target.display());
            }
        }
        Mode::Pipe { companion } => {
            let mut input = String::new();
            tokio::io::stdin()
                .read_to_string(&mut input)
                .await
                .context("Failed to read target from stdin")?;

            let companion_text = document::read_text(companion)?;
            let companion = Buffer::visiting(companion, companion_text);
            let mut target = Buffer::scratch(input);

            let report_range: &mut dyn FnMut(Range<usize>) = &mut |range| {
                debug!("Inserted commentary at bytes {}..{}", range.start, range.end);
            };

            convert_in_place(
                &renderer,
                &formatter,
                &companion,
                &mut target,
                Some(report_range),
            )
            .await?;

            let mut stdout = tokio::io::stdout();
            stdout
                .write_all(target.text().as_bytes())
                .await
                .context("Failed to write result to stdout")?;
            stdout.flush().await?;
        }
    }

    Ok(())
}

#[cfg(feature = "prompt")]
fn prompter_for(config: &Config) -> Box<dyn Prompter> {
    if config.interactive && std::io::stdin().is_terminal() {
        Box::new(prompt::TerminalPrompter {
            assume_yes: config.assume_yes,
        })
    } else {
        debug!("Prompts disabled");
        Box::new(NonInteractive {
            save_cache: config.assume_yes,
        })
    }
}

#[cfg(not(feature = "prompt"))]
fn prompter_for(config: &Config) -> Box<dyn Prompter> {
    Box::new(NonInteractive {
        save_cache: config.assume_yes,
    })
}
