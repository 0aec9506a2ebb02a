//! An index over committed events for O(1)-ish conflict checks: is a
//! resource busy at a given date/time, does a team already have an event
//! that day (C7).

use crate::model::{EventId, ResourceId, ScheduledEvent, TeamId};
use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

#[derive(Clone, Debug, Default)]
pub struct ConflictIndex {
    by_resource_date: BTreeMap<(ResourceId, NaiveDate), Vec<EventId>>,
    by_team_date: BTreeMap<(TeamId, NaiveDate), Vec<EventId>>,
    events: BTreeMap<EventId, ScheduledEvent>,
}

impl ConflictIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, event: ScheduledEvent) {
        if let Some(field_id) = &event.field_id {
            self.by_resource_date
                .entry((ResourceId::Field(field_id.clone()), event.date))
                .or_default()
                .push(event.id.clone());
        }
        if let Some(cage_id) = &event.cage_id {
            self.by_resource_date
                .entry((ResourceId::Cage(cage_id.clone()), event.date))
                .or_default()
                .push(event.id.clone());
        }
        for team in event.teams() {
            self.by_team_date
                .entry((team, event.date))
                .or_default()
                .push(event.id.clone());
        }
        self.events.insert(event.id.clone(), event);
    }

    /// True if placing an event of `[start, end)` on `resource_id`/`date`
    /// would overlap an already-committed event on that same resource.
    pub fn resource_busy(&self, resource_id: &ResourceId, date: NaiveDate, start: u16, end: u16) -> bool {
        let Some(ids) = self.by_resource_date.get(&(resource_id.clone(), date)) else {
            return false;
        };
        ids.iter()
            .filter_map(|id| self.events.get(id))
            .any(|e| start < e.end_minute && e.start_minute < end)
    }

    /// True if `team_id` already has any event on `date` (used for the
    /// one-event-per-team-per-day style invariants beyond plain overlap).
    pub fn team_has_event_on(&self, team_id: &TeamId, date: NaiveDate) -> bool {
        self.by_team_date.contains_key(&(team_id.clone(), date))
    }

    pub fn team_events_on(&self, team_id: &TeamId, date: NaiveDate) -> Vec<&ScheduledEvent> {
        self.by_team_date
            .get(&(team_id.clone(), date))
            .map(|ids| ids.iter().filter_map(|id| self.events.get(id)).collect())
            .unwrap_or_default()
    }

    /// Every already-committed event sharing `resource_id` and `date`,
    /// regardless of which team(s) it belongs to (used by `timeAdjacency`).
    pub fn resource_events_on(&self, resource_id: &ResourceId, date: NaiveDate) -> Vec<&ScheduledEvent> {
        self.by_resource_date
            .get(&(resource_id.clone(), date))
            .map(|ids| ids.iter().filter_map(|id| self.events.get(id)).collect())
            .unwrap_or_default()
    }

    /// Total events ever committed against `resource_id`, across all dates,
    /// feeding the `resourceUtilization` factor's usage/capacity ratio.
    pub fn resource_event_count(&self, resource_id: &ResourceId) -> usize {
        self.by_resource_date
            .iter()
            .filter(|((r, _), _)| r == resource_id)
            .map(|(_, ids)| ids.len())
            .sum()
    }

    pub fn all_events(&self) -> impl Iterator<Item = &ScheduledEvent> {
        self.events.values()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn remove(&mut self, event_id: &EventId) -> Option<ScheduledEvent> {
        let event = self.events.remove(event_id)?;
        if let Some(field_id) = &event.field_id {
            if let Some(ids) = self.by_resource_date.get_mut(&(ResourceId::Field(field_id.clone()), event.date)) {
                ids.retain(|id| id != event_id);
            }
        }
        if let Some(cage_id) = &event.cage_id {
            if let Some(ids) = self.by_resource_date.get_mut(&(ResourceId::Cage(cage_id.clone()), event.date)) {
                ids.retain(|id| id != event_id);
            }
        }
        for team in event.teams() {
            if let Some(ids) = self.by_team_date.get_mut(&(team, event.date)) {
                ids.retain(|id| id != event_id);
            }
        }
        Some(event)
    }

    pub fn team_dates(&self, team_id: &TeamId) -> BTreeSet<NaiveDate> {
        self.by_team_date
            .keys()
            .filter(|(t, _)| t == team_id)
            .map(|(_, d)| *d)
            .collect()
    }
}
