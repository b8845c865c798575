//! The two conversions: an open target buffer, or a target given by path.
//!
//! Both are straight compositions of locate, render, format, splice and
//! deliver. Every question is answered and every read done before the target
//! text changes, so backing out of a prompt leaves nothing modified.

use crate::buffer::{Buffer, BufferSet};
use crate::cache::{cached_value, get_cached, set_cached};
use crate::document::read_text;
use crate::error::Error;
use crate::filewalker::collect_companions;
use crate::formatter::CommentFormatter;
use crate::locator::locate;
use crate::prompt::Prompter;
use crate::render::{CompanionSource, Exporter, Renderer};
use crate::sink::{Delivery, SinkOutcome, deliver};
use crate::splicer::splice;
use crate::utils::{normalize, parent_dir, relative_path, resolve_against};
use anyhow::Result;
use log::{debug, info};
use std::ops::Range;
use std::path::{Path, PathBuf};

/// What one conversion did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionReport {
    pub target: PathBuf,
    /// The companion that was rendered; `None` when it came from a buffer.
    pub companion: Option<PathBuf>,
    /// Whether the companion path was newly remembered in the target.
    pub cache_saved: bool,
    pub outcome: SinkOutcome,
    /// Byte range of the new region in the updated text.
    pub inserted: Range<usize>,
}

/// Shared collaborators of a conversion.
pub struct Context<'a, E> {
    pub renderer: &'a Renderer<E>,
    pub formatter: &'a CommentFormatter,
    pub buffers: &'a mut BufferSet,
    pub prompter: &'a mut dyn Prompter,
}

/// Updates the commentary of an open `target` buffer from an open `companion`.
///
/// The companion's buffer text is rendered as-is; no file is looked up. On
/// success the cursor moves to the start of the new region and `highlight`,
/// when given, receives the inserted range.
pub async fn convert_in_place<E: Exporter>(
    renderer: &Renderer<E>,
    formatter: &CommentFormatter,
    companion: &Buffer,
    target: &mut Buffer,
    highlight: Option<&mut dyn FnMut(Range<usize>)>,
) -> Result<Range<usize>> {
    let bounds = locate(target.text()).ok_or_else(|| Error::MalformedTarget {
        path: target.path().map(Path::to_path_buf).unwrap_or_default(),
    })?;
    debug!("Commentary region: {}..{}", bounds.start, bounds.end);

    let rendered = renderer
        .render(CompanionSource::Text(companion.text()))
        .await?;

    let (updated, inserted) = splice(target.text(), bounds, &rendered, formatter);

    target.replace_contents(updated, (bounds.start, bounds.end), inserted.len());
    target.set_cursor(inserted.start);

    if let Some(highlight) = highlight {
        highlight(inserted.clone());
    }

    Ok(inserted)
}

/// Arguments of [`convert_by_path`].
#[derive(Debug, Clone, Default)]
pub struct ByPathRequest {
    /// Target file; asked for when `None`.
    pub target: Option<PathBuf>,
    /// Companion override; relative paths resolve against the target's directory.
    pub companion: Option<PathBuf>,
}

/// Updates the commentary of a target file that need not be open.
///
/// The companion is taken from the request, then from the cache stored in
/// the target, then from the prompter. When nothing was cached the user is
/// offered to remember the companion; an accepted offer is written together
/// with the new commentary.
pub async fn convert_by_path<E: Exporter>(
    request: ByPathRequest,
    ctx: Context<'_, E>,
) -> Result<ConversionReport> {
    let target = match request.target {
        Some(target) => target,
        None => ctx.prompter.target_path()?.ok_or(Error::MissingTarget)?,
    };
    let target = absolute(&target)?;
    let target_dir = parent_dir(&target);

    let original = match ctx.buffers.find(&target) {
        Some(buffer) => {
            debug!("Using open buffer for {}", target.display());
            buffer.text().to_owned()
        }
        None => read_text(&target)?,
    };

    let had_cache = cached_value(&original).is_some();

    let companion = match request.companion {
        Some(path) => resolve_against(&target_dir, &path),
        None => match get_cached(&original, &target_dir) {
            Some(path) => {
                debug!("Using cached companion {}", path.display());
                path
            }
            None => {
                let candidates = collect_companions(&target_dir)?;
                let chosen = ctx
                    .prompter
                    .companion_path(&target, &candidates)?
                    .ok_or_else(|| Error::MissingCompanion {
                        path: target.clone(),
                    })?;
                resolve_against(&target_dir, &chosen)
            }
        },
    };
    let companion = absolute(&companion)?;

    let mut text = original.clone();
    let mut cache_saved = false;
    if !had_cache {
        let relative = relative_path(&target_dir, &companion);
        if ctx.prompter.confirm_save(&target, &relative)? {
            text = set_cached(&text, &relative);
            cache_saved = true;
        }
    }

    let bounds = locate(&text).ok_or_else(|| Error::MalformedTarget {
        path: target.clone(),
    })?;

    let rendered = ctx
        .renderer
        .render(CompanionSource::File(&companion))
        .await?;

    let (updated, inserted) = splice(&text, bounds, &rendered, ctx.formatter);

    let outcome = deliver(
        Delivery {
            path: &target,
            text: &updated,
            old_region: (bounds.start, bounds.end),
            new_len: inserted.len(),
        },
        ctx.buffers,
    )?;

    if outcome != SinkOutcome::Locked {
        info!(
            "Rendered {} into {}",
            companion.display(),
            target.display()
        );
    }

    Ok(ConversionReport {
        target,
        companion: Some(companion),
        cache_saved: cache_saved && outcome != SinkOutcome::Locked,
        outcome,
        inserted,
    })
}

fn absolute(path: &Path) -> Result<PathBuf> {
    Ok(normalize(&std::path::absolute(path)?))
}
