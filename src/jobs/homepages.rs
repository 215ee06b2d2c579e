use crate::jobs::JobSummary;
use crate::problems::{Problem, ProblemKind};
use crate::resolver::{Probe, ResolvedUrl, Resolver, Scheme};
use crate::storage::{AssociationRecord, Storage};
use crate::ResolveError;
use serde_json::json;
use tokio_util::sync::CancellationToken;

/// Resolves the raw homepage of every stored association
///
/// Records are processed in number order; cancellation is checked between
/// records.
pub async fn update_homepages<S, P>(
    store: &mut S,
    resolver: &Resolver<P>,
    cancel: &CancellationToken,
) -> crate::Result<JobSummary>
where
    S: Storage,
    P: Probe,
{
    let records = store.list_associations(0, None)?;
    tracing::info!("Resolving homepages of {} associations", records.len());

    let mut summary = JobSummary::default();
    for record in &records {
        if cancel.is_cancelled() {
            tracing::warn!("Homepage update cancelled after {} records", summary.processed);
            summary.cancelled = true;
            break;
        }
        summary.merge(&resolve_record(store, resolver, record).await?);
    }

    tracing::info!("Homepage update finished: {}", summary);
    Ok(summary)
}

/// Resolves the raw homepage of one stored association
pub async fn resolve_association<S, P>(
    store: &mut S,
    resolver: &Resolver<P>,
    number: &str,
) -> crate::Result<JobSummary>
where
    S: Storage,
    P: Probe,
{
    let record = store.get_association(number)?;
    resolve_record(store, resolver, &record).await
}

async fn resolve_record<S, P>(
    store: &mut S,
    resolver: &Resolver<P>,
    record: &AssociationRecord,
) -> crate::Result<JobSummary>
where
    S: Storage,
    P: Probe,
{
    let mut summary = JobSummary {
        processed: 1,
        ..Default::default()
    };

    let raw = match record.raw_homepage.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => raw,
        _ => {
            tracing::debug!("{} has no homepage", record.number);
            store.set_homepage(&record.number, &ResolvedUrl::Unreachable)?;
            summary.skipped = 1;
            return Ok(summary);
        }
    };

    let problem = match resolver.resolve(raw).await {
        Ok(resolved) if resolved.is_reachable() => {
            tracing::info!(
                "{}: homepage {} ({})",
                record.number,
                resolved.url().unwrap_or_default(),
                resolved.scheme().map(|s| s.as_str()).unwrap_or_default()
            );
            store.set_homepage(&record.number, &resolved)?;
            summary.updated = 1;

            if let Some(problem) = review_resolved(&record.number, raw, &resolved) {
                store.record_problem(&problem)?;
                summary.problems = 1;
            }
            return Ok(summary);
        }
        Ok(_) => {
            tracing::warn!("{}: homepage '{}' is unreachable", record.number, raw);
            Problem::new(
                &record.number,
                ProblemKind::HomepageUnreachable,
                json!({ "homepage": raw }),
            )
        }
        Err(ResolveError::InvalidInput(reason)) => {
            tracing::warn!("{}: homepage '{}' rejected: {}", record.number, raw, reason);
            Problem::new(
                &record.number,
                ProblemKind::HomepageInvalid,
                json!({ "homepage": raw, "reason": reason }),
            )
        }
        Err(e) => return Err(e.into()),
    };

    store.set_homepage(&record.number, &ResolvedUrl::Unreachable)?;
    store.record_problem(&problem)?;
    summary.problems = 1;
    Ok(summary)
}

/// Flags a reachable homepage that is HTTP-only or written differently
/// in the registry than the URL it resolved to
fn review_resolved(number: &str, raw: &str, resolved: &ResolvedUrl) -> Option<Problem> {
    let url = resolved.url()?;

    let (kind, reason) = if resolved.scheme() == Some(Scheme::Http) {
        (
            ProblemKind::HomepageInsecure,
            "homepage should be available over https://".to_string(),
        )
    } else if !url.starts_with(raw) {
        (
            ProblemKind::HomepageMismatch,
            format!("homepage should be registered as {}", url),
        )
    } else {
        return None;
    };

    tracing::warn!("{}: {}", number, reason);
    Some(Problem::new(
        number,
        kind,
        json!({ "homepage": raw, "resolved": url, "reason": reason }),
    ))
}
