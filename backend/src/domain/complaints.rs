//! The complaint collection: filing, listing, lifecycle changes and the
//! derived dashboard data.

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::Serialize;
use tracing::info;

use super::complaint::{
    Complaint, ComplaintEdit, ComplaintId, ComplaintStatus, NewComplaint, Priority,
};
use super::defaults::default_complaints;
use super::persisted::{HydrationIssueKind, HydrationReport, Hydrated, hydrate_key, persist};
use super::ports::{KeyValueStore, StoreKey};
use super::{Error, User, UserId};

/// Maximum number of entries in a notification feed.
pub const NOTIFICATION_LIMIT: usize = 20;

/// Administrator listing filter; every criterion is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComplaintFilter {
    /// Exact status match.
    pub status: Option<ComplaintStatus>,
    /// Exact priority match.
    pub priority: Option<Priority>,
    /// Case-insensitive exact category match.
    pub category: Option<String>,
    /// Filing user.
    pub owner: Option<UserId>,
    /// Case-insensitive substring over id, title and description.
    pub search: Option<String>,
}

impl ComplaintFilter {
    fn matches(&self, complaint: &Complaint) -> bool {
        self.status.is_none_or(|status| complaint.status() == status)
            && self
                .priority
                .is_none_or(|priority| complaint.priority() == priority)
            && self.category.as_deref().is_none_or(|category| {
                complaint
                    .category()
                    .as_ref()
                    .eq_ignore_ascii_case(category.trim())
            })
            && self
                .owner
                .as_ref()
                .is_none_or(|owner| complaint.is_owned_by(owner))
            && self
                .search
                .as_deref()
                .map(str::trim)
                .filter(|needle| !needle.is_empty())
                .is_none_or(|needle| complaint.matches_text(needle))
    }
}

/// Which complaints a [`ComplaintStats`] covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatsScope {
    /// Every complaint on the desk.
    Desk,
    /// Complaints filed by one user.
    Owner(UserId),
}

/// Per-status counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    /// Complaints awaiting triage.
    pub submitted: usize,
    /// Complaints being handled.
    pub in_progress: usize,
    /// Closed complaints.
    pub resolved: usize,
}

/// Per-priority counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityCounts {
    /// Low-priority complaints.
    pub low: usize,
    /// Medium-priority complaints.
    pub medium: usize,
    /// High-priority complaints.
    pub high: usize,
}

/// Count of complaints in one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCount {
    /// Category name.
    pub category: String,
    /// Complaints in it.
    pub count: usize,
}

/// Aggregates behind the dashboard charts and progress rings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintStats {
    /// Complaints in scope.
    pub total: usize,
    /// Breakdown by status.
    pub by_status: StatusCounts,
    /// Breakdown by priority.
    pub by_priority: PriorityCounts,
    /// Largest first, ties broken alphabetically.
    pub by_category: Vec<CategoryCount>,
}

impl ComplaintStats {
    fn tally<'a>(complaints: impl Iterator<Item = &'a Complaint>) -> Self {
        let mut stats = Self::default();
        let mut categories: BTreeMap<String, usize> = BTreeMap::new();
        for complaint in complaints {
            stats.total += 1;
            match complaint.status() {
                ComplaintStatus::Submitted => stats.by_status.submitted += 1,
                ComplaintStatus::InProgress => stats.by_status.in_progress += 1,
                ComplaintStatus::Resolved => stats.by_status.resolved += 1,
            }
            match complaint.priority() {
                Priority::Low => stats.by_priority.low += 1,
                Priority::Medium => stats.by_priority.medium += 1,
                Priority::High => stats.by_priority.high += 1,
            }
            *categories
                .entry(complaint.category().as_ref().to_owned())
                .or_default() += 1;
        }
        stats.by_category = categories
            .into_iter()
            .map(|(category, count)| CategoryCount { category, count })
            .collect();
        stats
            .by_category
            .sort_by_key(|entry| Reverse(entry.count));
        stats
    }
}

/// Kind of notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A complaint was filed (administrator feed).
    Submitted,
    /// One of the user's complaints changed status.
    StatusChanged,
}

/// One entry of a derived notification feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Stable feed entry id.
    pub id: String,
    /// Complaint the entry is about.
    pub complaint_id: ComplaintId,
    /// What happened.
    pub kind: NotificationKind,
    /// Human-readable summary.
    pub message: String,
    /// When it happened.
    pub at: DateTime<Utc>,
}

fn newest_first(complaints: &mut [Complaint]) {
    complaints.sort_by_key(|complaint| Reverse((complaint.created_at(), complaint.id().number())));
}

/// Complaint collection mirrored to the `complaints` key.
pub struct ComplaintManager {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    complaints: Vec<Complaint>,
}

impl ComplaintManager {
    /// Load complaints, seeding (and persisting) the defaults on first start
    /// and recovering to them when the stored document is unusable.
    pub async fn hydrate(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        report: &mut HydrationReport,
    ) -> Self {
        let complaints =
            match hydrate_key::<Vec<Complaint>>(store.as_ref(), StoreKey::Complaints, report).await
            {
                Hydrated::Loaded(complaints) => complaints,
                Hydrated::Recovered => default_complaints(),
                Hydrated::Absent => {
                    let seeded = default_complaints();
                    if let Err(err) = persist(store.as_ref(), StoreKey::Complaints, &seeded).await
                    {
                        report.record(
                            StoreKey::Complaints,
                            HydrationIssueKind::SeedNotPersisted {
                                message: err.message().to_owned(),
                            },
                        );
                    }
                    seeded
                }
            };
        Self {
            store,
            clock,
            complaints,
        }
    }

    /// Number of complaints on the desk.
    pub fn len(&self) -> usize {
        self.complaints.len()
    }

    /// Whether the desk has no complaints.
    pub fn is_empty(&self) -> bool {
        self.complaints.is_empty()
    }

    fn next_id(&self) -> Result<ComplaintId, Error> {
        let highest = self
            .complaints
            .iter()
            .map(Complaint::id)
            .max_by_key(|id| id.number());
        match highest {
            None => Ok(ComplaintId::from_number(1)),
            Some(id) => id.checked_next().ok_or_else(|| {
                Error::conflict(format!(
                    "complaint numbers are exhausted after {id}; no further complaints can be filed"
                ))
            }),
        }
    }

    async fn commit(&mut self, complaints: Vec<Complaint>) -> Result<(), Error> {
        persist(self.store.as_ref(), StoreKey::Complaints, &complaints).await?;
        self.complaints = complaints;
        Ok(())
    }

    fn not_found(id: &ComplaintId) -> Error {
        Error::not_found(format!("complaint {id} not found"))
    }

    fn find_mut<'a>(
        complaints: &'a mut [Complaint],
        id: &ComplaintId,
    ) -> Result<&'a mut Complaint, Error> {
        complaints
            .iter_mut()
            .find(|complaint| complaint.id() == id)
            .ok_or_else(|| Self::not_found(id))
    }

    /// File a complaint on behalf of `owner`.
    pub async fn create(&mut self, owner: &User, input: NewComplaint) -> Result<Complaint, Error> {
        let complaint = Complaint::file(
            self.next_id()?,
            input,
            owner.id().clone(),
            owner.name().clone(),
            self.clock.utc(),
        );
        let mut complaints = self.complaints.clone();
        complaints.push(complaint.clone());
        self.commit(complaints).await?;
        info!(complaint_id = %complaint.id(), owner_id = %owner.id(), "complaint filed");
        Ok(complaint)
    }

    /// Complaints filed by `owner_id`, newest first.
    pub fn list_for_owner(&self, owner_id: &UserId) -> Vec<Complaint> {
        self.list(&ComplaintFilter {
            owner: Some(owner_id.clone()),
            ..ComplaintFilter::default()
        })
    }

    /// Complaints matching `filter`, newest first.
    pub fn list(&self, filter: &ComplaintFilter) -> Vec<Complaint> {
        let mut matching: Vec<_> = self
            .complaints
            .iter()
            .filter(|complaint| filter.matches(complaint))
            .cloned()
            .collect();
        newest_first(&mut matching);
        matching
    }

    /// Look a complaint up by id.
    pub fn get(&self, id: &ComplaintId) -> Result<&Complaint, Error> {
        self.complaints
            .iter()
            .find(|complaint| complaint.id() == id)
            .ok_or_else(|| Self::not_found(id))
    }

    /// Look a complaint up on behalf of `actor`, who must own it or be an
    /// administrator.
    pub fn get_for(&self, actor: &User, id: &ComplaintId) -> Result<&Complaint, Error> {
        let complaint = self.get(id)?;
        if actor.is_admin() || complaint.is_owned_by(actor.id()) {
            Ok(complaint)
        } else {
            Err(Error::forbidden("complaint belongs to another user"))
        }
    }

    /// Move a complaint to `status`. Administrators only.
    pub async fn update_status(
        &mut self,
        actor: &User,
        id: &ComplaintId,
        status: ComplaintStatus,
        note: Option<String>,
    ) -> Result<Complaint, Error> {
        if !actor.is_admin() {
            return Err(Error::forbidden("administrator role required"));
        }
        let from = self.get(id)?.status();
        if from == status {
            return Err(Error::invalid_request(format!(
                "complaint {id} is already {}",
                status.label()
            )));
        }
        let mut complaints = self.complaints.clone();
        let updated = {
            let target = Self::find_mut(&mut complaints, id)?;
            target.transition(status, actor.id().clone(), note, self.clock.utc());
            target.clone()
        };
        self.commit(complaints).await?;
        info!(complaint_id = %id, %from, to = %status, actor_id = %actor.id(), "status changed");
        Ok(updated)
    }

    /// Edit a complaint's details.
    ///
    /// The owner may edit while the complaint is still submitted;
    /// administrators may edit at any time.
    pub async fn update_details(
        &mut self,
        actor: &User,
        id: &ComplaintId,
        edit: ComplaintEdit,
    ) -> Result<Complaint, Error> {
        let current = self.get(id)?;
        if !actor.is_admin() {
            if !current.is_owned_by(actor.id()) {
                return Err(Error::forbidden("complaint belongs to another user"));
            }
            if current.status() != ComplaintStatus::Submitted {
                return Err(Error::conflict(format!(
                    "complaint {id} can no longer be edited"
                )));
            }
        }
        let mut complaints = self.complaints.clone();
        let updated = {
            let target = Self::find_mut(&mut complaints, id)?;
            target.apply_edit(edit, self.clock.utc());
            target.clone()
        };
        self.commit(complaints).await?;
        info!(complaint_id = %id, actor_id = %actor.id(), "complaint edited");
        Ok(updated)
    }

    /// Dashboard aggregates for `scope`.
    pub fn stats(&self, scope: &StatsScope) -> ComplaintStats {
        match scope {
            StatsScope::Desk => ComplaintStats::tally(self.complaints.iter()),
            StatsScope::Owner(owner) => ComplaintStats::tally(
                self.complaints
                    .iter()
                    .filter(|complaint| complaint.is_owned_by(owner)),
            ),
        }
    }

    /// Derived feed for `user`, newest first, at most
    /// [`NOTIFICATION_LIMIT`] entries.
    ///
    /// Administrators hear about every filed complaint; users hear about
    /// status changes on their own complaints.
    pub fn notifications_for(&self, user: &User) -> Vec<Notification> {
        // Keyed by (time, complaint number, history position) so ties
        // order numerically rather than by id text.
        let mut feed: Vec<(DateTime<Utc>, u32, usize, Notification)> = if user.is_admin() {
            self.complaints
                .iter()
                .map(|complaint| {
                    let at = complaint.created_at();
                    let notification = Notification {
                        id: format!("{}-filed", complaint.id()),
                        complaint_id: complaint.id().clone(),
                        kind: NotificationKind::Submitted,
                        message: format!("New complaint {} submitted", complaint.id()),
                        at,
                    };
                    (at, complaint.id().number(), 0, notification)
                })
                .collect()
        } else {
            self.complaints
                .iter()
                .filter(|complaint| complaint.is_owned_by(user.id()))
                .flat_map(|complaint| {
                    complaint
                        .history()
                        .iter()
                        .enumerate()
                        .map(|(index, change)| {
                            let position = index + 1;
                            let notification = Notification {
                                id: format!("{}-{position}", complaint.id()),
                                complaint_id: complaint.id().clone(),
                                kind: NotificationKind::StatusChanged,
                                message: format!(
                                    "Complaint {} {}",
                                    complaint.id(),
                                    change.to.label()
                                ),
                                at: change.changed_at,
                            };
                            (change.changed_at, complaint.id().number(), position, notification)
                        })
                })
                .collect()
        };
        feed.sort_by_key(|(at, number, position, _)| Reverse((*at, *number, *position)));
        feed.into_iter()
            .take(NOTIFICATION_LIMIT)
            .map(|(.., notification)| notification)
            .collect()
    }
}
