use crate::config::CrawlerConfig;
use crate::crawler::SiteCrawler;
use crate::jobs::JobSummary;
use crate::problems::{Problem, ProblemKind};
use crate::storage::{AssociationRecord, Storage};
use crate::url::validate_http_url;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Window over the stored associations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Paging {
    pub skip: u32,
    pub limit: Option<u32>,
}

/// Crawls the homepage of every association in `paging` for its imprint
///
/// Associations without a resolved homepage are skipped. A cancelled run
/// stops after the current crawl and records no problem for it.
pub async fn refresh_imprints<S: Storage>(
    store: &mut S,
    crawler: &SiteCrawler,
    config: &CrawlerConfig,
    paging: Paging,
    cancel: &CancellationToken,
) -> crate::Result<JobSummary> {
    let records = store.list_associations(paging.skip, paging.limit)?;
    tracing::info!(
        "Refreshing imprints of {} associations (budget {} pages each)",
        records.len(),
        config.max_pages
    );

    let mut summary = JobSummary::default();
    for record in &records {
        if cancel.is_cancelled() {
            summary.cancelled = true;
            break;
        }
        summary.merge(&refresh_record(store, crawler, config, record, cancel).await?);
    }

    if summary.cancelled {
        tracing::warn!("Imprint refresh cancelled: {}", summary);
    } else {
        tracing::info!("Imprint refresh finished: {}", summary);
    }
    Ok(summary)
}

/// Crawls the homepage of one stored association for its imprint
pub async fn refresh_imprint<S: Storage>(
    store: &mut S,
    crawler: &SiteCrawler,
    config: &CrawlerConfig,
    number: &str,
    cancel: &CancellationToken,
) -> crate::Result<JobSummary> {
    let record = store.get_association(number)?;
    refresh_record(store, crawler, config, &record, cancel).await
}

async fn refresh_record<S: Storage>(
    store: &mut S,
    crawler: &SiteCrawler,
    config: &CrawlerConfig,
    record: &AssociationRecord,
    cancel: &CancellationToken,
) -> crate::Result<JobSummary> {
    let mut summary = JobSummary {
        processed: 1,
        ..Default::default()
    };

    let Some(homepage) = record.homepage.as_deref() else {
        tracing::debug!("{} has no resolved homepage", record.number);
        summary.skipped = 1;
        return Ok(summary);
    };

    let root = match Url::parse(homepage) {
        Ok(root) => root,
        Err(e) => {
            tracing::warn!(
                "{}: stored homepage {} is unparsable: {}",
                record.number,
                homepage,
                e
            );
            summary.skipped = 1;
            return Ok(summary);
        }
    };

    let keywords = config.keywords.as_slice();
    let found = crawler
        .find_link_by_keyword_with_cancel(&root, keywords, config.max_pages, cancel)
        .await;

    if cancel.is_cancelled() {
        summary.cancelled = true;
        return Ok(summary);
    }

    let problem = match found {
        Some(link) => match validate_http_url(link.as_str()) {
            Ok(imprint) => {
                tracing::info!("{}: imprint {}", record.number, imprint);
                store.set_imprint(&record.number, imprint.as_str())?;
                summary.updated = 1;
                return Ok(summary);
            }
            Err(e) => {
                tracing::warn!(
                    "{}: imprint candidate {} rejected: {}",
                    record.number,
                    link,
                    e
                );
                Problem::new(
                    &record.number,
                    ProblemKind::ImprintInvalidUrl,
                    json!({
                        "homepage": homepage,
                        "imprint": link.as_str(),
                        "reason": e.to_string(),
                    }),
                )
            }
        },
        None => {
            tracing::warn!("{}: no imprint found on {}", record.number, homepage);
            Problem::new(
                &record.number,
                ProblemKind::ImprintNotFound,
                json!({ "homepage": homepage, "keywords": config.keywords }),
            )
        }
    };

    store.record_problem(&problem)?;
    summary.problems = 1;
    Ok(summary)
}
