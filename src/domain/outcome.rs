use super::error::UpdateError;
use super::image::{ImageDigest, ImageReference};

/// Result of comparing a running container's image with the latest pulled one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    NotRunning,
    UpToDate,
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// What happened to one service during a run.
#[derive(Debug)]
pub enum ServiceOutcome {
    NotRunning,
    UpToDate {
        digest: ImageDigest,
    },
    /// No local image matched the reference after the pull, so there was
    /// nothing to compare against. The container was left alone.
    Unverified {
        reference: ImageReference,
    },
    Updated {
        from: ImageDigest,
        to: ImageDigest,
    },
    Failed(UpdateError),
}

impl ServiceOutcome {
    pub fn severity(&self) -> Severity {
        match self {
            Self::UpToDate { .. } | Self::Updated { .. } => Severity::Info,
            Self::NotRunning | Self::Unverified { .. } => Severity::Warning,
            Self::Failed(_) => Severity::Error,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

#[derive(Debug)]
pub struct ServiceReport {
    pub service: String,
    pub outcome: ServiceOutcome,
}

impl ServiceReport {
    pub fn new(service: impl Into<String>, outcome: ServiceOutcome) -> Self {
        Self {
            service: service.into(),
            outcome,
        }
    }

    pub fn severity(&self) -> Severity {
        self.outcome.severity()
    }
}

/// Every report produced by a batch, in processing order.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub reports: Vec<ServiceReport>,
}

impl BatchSummary {
    pub fn push(&mut self, report: ServiceReport) {
        self.reports.push(report);
    }

    pub fn get(&self, service: &str) -> Option<&ServiceReport> {
        self.reports.iter().find(|r| r.service == service)
    }

    pub fn updated(&self) -> usize {
        self.count(|o| matches!(o, ServiceOutcome::Updated { .. }))
    }

    pub fn up_to_date(&self) -> usize {
        self.count(|o| matches!(o, ServiceOutcome::UpToDate { .. }))
    }

    pub fn not_running(&self) -> usize {
        self.count(|o| matches!(o, ServiceOutcome::NotRunning))
    }

    pub fn unverified(&self) -> usize {
        self.count(|o| matches!(o, ServiceOutcome::Unverified { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(ServiceOutcome::is_failure)
    }

    fn count(&self, pred: impl Fn(&ServiceOutcome) -> bool) -> usize {
        self.reports.iter().filter(|r| pred(&r.outcome)).count()
    }
}
