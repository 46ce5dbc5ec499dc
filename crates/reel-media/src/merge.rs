//! N-way merge reducer.
//!
//! Folds a list of assets into one by repeated crossfade pair joins:
//! `((a + b) + c) + d`. Playback order always follows input order.

use reel_models::MediaRef;
use std::collections::VecDeque;
use tracing::{debug, info};

use crate::context::MediaContext;
use crate::crossfade::{join, Crossfade};
use crate::error::{MediaError, MediaResult};
use crate::fs_utils::copy_file;
use crate::ledger::TempArtifacts;

/// Merge `inputs` in order into `dest`.
///
/// Each join result goes back to the front of the work queue, so `N` inputs
/// take exactly `N - 1` joins. Intermediate join outputs are deleted as soon
/// as they have been consumed and the surviving result is copied to `dest`;
/// nothing but `dest` is left behind, on success or failure.
pub async fn merge(
    ctx: &MediaContext,
    inputs: &[MediaRef],
    dest: &MediaRef,
    crossfade: Crossfade,
) -> MediaResult<MediaRef> {
    if inputs.len() < 2 {
        return Err(MediaError::configuration(format!(
            "merge needs at least two inputs, got {}",
            inputs.len()
        )));
    }

    let mut temps = TempArtifacts::new(ctx.root());
    let result = reduce(ctx, inputs, dest, crossfade, &mut temps).await;
    temps.cleanup().await;
    result
}

async fn reduce(
    ctx: &MediaContext,
    inputs: &[MediaRef],
    dest: &MediaRef,
    crossfade: Crossfade,
    temps: &mut TempArtifacts,
) -> MediaResult<MediaRef> {
    let mut queue: VecDeque<MediaRef> = inputs.iter().cloned().collect();
    let mut intermediates: Vec<MediaRef> = Vec::new();
    let total_joins = inputs.len() - 1;
    let mut joins = 0;

    while queue.len() >= 2 {
        let (first, second) = match (queue.pop_front(), queue.pop_front()) {
            (Some(first), Some(second)) => (first, second),
            _ => break,
        };

        let joined = temps.reserve(dest, "tmp");
        join(ctx, &first, &second, &joined, crossfade).await?;
        joins += 1;
        debug!(join = joins, total = total_joins, output = %joined, "Merged pair");

        for consumed in [&first, &second] {
            if let Some(pos) = intermediates.iter().position(|r| r == consumed) {
                intermediates.swap_remove(pos);
                temps.release(consumed).await;
            }
        }

        intermediates.push(joined.clone());
        queue.push_front(joined);
    }

    let merged = queue
        .pop_front()
        .ok_or_else(|| MediaError::configuration("merge produced no output"))?;

    copy_file(ctx.resolve(&merged), ctx.output_path(dest).await?).await?;

    info!(inputs = inputs.len(), joins, dest = %dest, "Merge complete");
    Ok(dest.clone())
}
