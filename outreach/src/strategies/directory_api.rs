//! Directory-API strategy: one directory query, then paced channel sends

use std::sync::Arc;

use shared::{process_debug, process_info, process_warn, CampaignTarget, OutreachStatus, ProcessId, StrategyKind};

use super::{Acquisition, CampaignContext, StopReason};
use crate::core::{DelayPolicy, SearchFilters};
use crate::error::{OutreachError, OutreachResult};
use crate::traits::{ContactDirectory, OutreachChannel};

pub struct DirectoryApiStrategy {
    directory: Arc<dyn ContactDirectory>,
    channel: Arc<dyn OutreachChannel>,
    /// Send templated notes and use the profile's randomised delay
    personalized: bool,
    /// Apply title/industry/exclusion/min-connection filtering after the query
    advanced_filters: bool,
    /// Delay between sends when not personalised
    fixed_delay: DelayPolicy,
}

impl DirectoryApiStrategy {
    pub fn new(directory: Arc<dyn ContactDirectory>, channel: Arc<dyn OutreachChannel>) -> Self {
        Self {
            directory,
            channel,
            personalized: true,
            advanced_filters: true,
            fixed_delay: DelayPolicy::DIRECTORY_DEFAULT,
        }
    }

    pub fn with_personalization(mut self, personalized: bool) -> Self {
        self.personalized = personalized;
        self
    }

    pub fn with_advanced_filters(mut self, advanced_filters: bool) -> Self {
        self.advanced_filters = advanced_filters;
        self
    }

    pub fn with_fixed_delay(mut self, delay: DelayPolicy) -> Self {
        self.fixed_delay = delay;
        self
    }

    pub async fn acquire(&self, target: &CampaignTarget, ctx: CampaignContext<'_>) -> OutreachResult<Acquisition> {
        let company = target.company_name.as_str();
        let limit = target.max_connections;
        if limit == 0 {
            return Ok(Acquisition::nothing());
        }

        let filters = if self.advanced_filters {
            SearchFilters::for_target(target)
        } else {
            SearchFilters::default()
        };
        let found = self
            .directory
            .search(company, limit, &filters)
            .await
            .map_err(|e| OutreachError::strategy(StrategyKind::Api, e.to_string()))?;
        let found_count = found.len();
        let candidates = ctx.targeting.select(found, target, self.advanced_filters);

        process_info!(
            ProcessId::current(),
            "🔎 {}: directory returned {} people, {} after targeting",
            company,
            found_count,
            candidates.len()
        );

        let delay = if self.personalized {
            ctx.targeting.attempt_delay()
        } else {
            self.fixed_delay
        };

        let mut sent = 0;
        let mut attempted = 0;
        let mut failed = 0;
        let mut stop = StopReason::Exhausted;

        for candidate in &candidates {
            if sent >= limit {
                stop = StopReason::MaxReached;
                break;
            }
            if attempted > 0 {
                delay.pause().await;
            }
            if !ctx.ledger.can_send().await? {
                stop = StopReason::LimitReached;
                break;
            }

            let message = if self.personalized {
                ctx.targeting.note_for(target, candidate)
            } else {
                String::new()
            };

            attempted += 1;
            let status = match self.channel.connect(&candidate.id, &message).await {
                Ok(true) => {
                    sent += 1;
                    process_debug!(
                        ProcessId::current(),
                        "🤝 {}: invitation sent to {} ({})",
                        company,
                        candidate.full_name(),
                        candidate.title
                    );
                    OutreachStatus::Sent
                }
                Ok(false) => {
                    failed += 1;
                    OutreachStatus::Failed
                }
                Err(e) => {
                    failed += 1;
                    process_warn!(
                        ProcessId::current(),
                        "⚠️ {}: invitation to {} failed: {}",
                        company,
                        candidate.id,
                        e
                    );
                    OutreachStatus::Failed
                }
            };
            ctx.ledger
                .record_attempt(company, Some(&candidate.id), &candidate.full_name(), status)
                .await?;
        }

        if attempted > 0 && failed == attempted {
            return Err(OutreachError::strategy(
                StrategyKind::Api,
                format!("all {attempted} connection attempts at {company} failed"),
            ));
        }

        Ok(Acquisition { sent, attempted, stop })
    }
}
