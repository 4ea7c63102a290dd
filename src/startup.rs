use std::{path::Path, time::Duration};

use crate::{
    configuration::Settings,
    domain::{
        extraction::ExtractionResult,
        product_query::ProductQuery,
        verdict::{compare, ComparisonVerdict, PricePredicate},
    },
    error::RunError,
    services::{BrowserPage, Droid, SessionSource, SiteExtractor},
};

/// Runs both extractions concurrently and compares their prices.
///
/// Neither side is cancelled when the other fails; the verdict is only
/// produced once both have finished.
pub async fn compare_prices<L: BrowserPage, R: BrowserPage>(
    query: &ProductQuery,
    predicate: PricePredicate,
    left: (&SiteExtractor, &L),
    right: (&SiteExtractor, &R),
) -> ComparisonVerdict {
    let (left_extractor, left_page) = left;
    let (right_extractor, right_page) = right;

    let (left_result, right_result) = tokio::join!(
        left_extractor.extract(left_page, query),
        right_extractor.extract(right_page, query),
    );

    for result in [&left_result, &right_result] {
        match result {
            Ok(reading) => log::info!("{} price: ₹{}", reading.retailer, reading.price),
            Err(e) => log::error!("{}", e),
        }
    }

    compare(
        ExtractionResult::from(left_result),
        ExtractionResult::from(right_result),
        predicate,
    )
}

pub async fn run(configuration: &Settings) -> Result<ComparisonVerdict, RunError> {
    let droid = Droid::new(&configuration.browser)?;
    run_with_sessions(configuration, &droid).await
}

/// Opens both pages from `sessions`, compares within the run budget and
/// releases every session on all exit paths.
pub async fn run_with_sessions<S: SessionSource>(
    configuration: &Settings,
    sessions: &S,
) -> Result<ComparisonVerdict, RunError> {
    let artifact_dir = Path::new(&configuration.run.artifact_dir);
    let excerpt_len = configuration.run.markup_excerpt_len;

    let left = SiteExtractor::from_settings(
        &configuration.retailers.left,
        artifact_dir,
        excerpt_len,
    )
    .map_err(|e| RunError::Config(format!("{}: {}", configuration.retailers.left.name, e)))?;
    let right = SiteExtractor::from_settings(
        &configuration.retailers.right,
        artifact_dir,
        excerpt_len,
    )
    .map_err(|e| RunError::Config(format!("{}: {}", configuration.retailers.right.name, e)))?;

    let query = ProductQuery::new(configuration.run.query.clone());
    let predicate = configuration.run.predicate;
    let budget = Duration::from_secs(configuration.run.timeout_secs);

    log::info!(
        "Comparing \"{}\" on {} and {} (expecting {} {} {})",
        query,
        left.name(),
        right.name(),
        left.name(),
        predicate,
        right.name()
    );

    let outcome = tokio::time::timeout(budget, async {
        let (left_page, right_page) =
            tokio::try_join!(sessions.open_page(), sessions.open_page())?;

        let verdict =
            compare_prices(&query, predicate, (&left, &left_page), (&right, &right_page)).await;
        Ok::<_, RunError>(verdict)
    })
    .await;

    // Sessions opened inside the timed block are tracked by the source, so this
    // also covers a timed-out or half-opened run.
    sessions.release().await;

    match outcome {
        Ok(result) => result,
        Err(_) => {
            log::error!("Run exceeded its {:?} budget", budget);
            Err(RunError::Timeout(budget))
        }
    }
}
