//! Financial event collection: paginated category-keyed pages flattened into
//! normalized events.

use log::{debug, info};
use std::collections::HashSet;

use sellerledger_core::finances::{flatten_page, FinancialEvent, FlattenContext};
use sellerledger_core::sync::{SyncWarning, SyncWarningKind};
use sellerledger_marketplace::{FinancialEventsQuery, MarketplaceApiClient, MarketplaceError};

use crate::report::EventDiagnostics;

#[derive(Debug, Clone, Default)]
pub struct EventCollection {
    /// In upstream order, without repeats.
    pub events: Vec<FinancialEvent>,
    pub diagnostics: EventDiagnostics,
    pub warnings: Vec<SyncWarning>,
}

pub struct FinancialEventCollector<'a> {
    client: &'a dyn MarketplaceApiClient,
    max_pages: u32,
}

impl<'a> FinancialEventCollector<'a> {
    pub fn new(client: &'a dyn MarketplaceApiClient, max_pages: u32) -> Self {
        Self { client, max_pages }
    }

    pub async fn collect(
        &self,
        query: &FinancialEventsQuery,
        context: &FlattenContext,
    ) -> Result<EventCollection, MarketplaceError> {
        let mut collection = EventCollection::default();
        let mut seen: HashSet<String> = HashSet::new();
        let mut next_token: Option<String> = None;

        loop {
            if collection.diagnostics.pages_fetched >= self.max_pages {
                collection.diagnostics.page_limit_hit = true;
                collection.warnings.push(SyncWarning::new(
                    SyncWarningKind::PageLimitHit,
                    format!(
                        "Stopped financial events pagination after {} pages",
                        self.max_pages
                    ),
                ));
                break;
            }

            let page = self
                .client
                .get_financial_events(query, next_token.as_deref())
                .await?;
            collection.diagnostics.pages_fetched += 1;

            let flattened = flatten_page(&page.payload, context);
            debug!(
                "Financial events page {} flattened to {} events ({} dropped)",
                collection.diagnostics.pages_fetched,
                flattened.events.len(),
                flattened.dropped
            );
            collection.diagnostics.entries_dropped += flattened.dropped;

            for event in flattened.events {
                if seen.insert(event.event_key.clone()) {
                    collection.events.push(event);
                } else {
                    collection.diagnostics.duplicates_dropped += 1;
                }
            }

            match page.next_token {
                Some(token) => next_token = Some(token),
                None => break,
            }
        }

        collection.diagnostics.events_fetched = collection.events.len();
        info!(
            "Collected {} financial events over {} pages ({} repeats dropped)",
            collection.events.len(),
            collection.diagnostics.pages_fetched,
            collection.diagnostics.duplicates_dropped
        );

        Ok(collection)
    }
}
