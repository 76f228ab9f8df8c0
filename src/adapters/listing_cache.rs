use std::collections::HashMap;

use crate::{
    adapters::view::ListView,
    domain::{filters::FilterState, models::file::FileRecord},
};

/// Handle for one in-flight listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub key: FilterState,
    pub seq: u64,
}

#[derive(Debug, Clone)]
struct CachedListing {
    seq: u64,
    outcome: Result<Vec<FileRecord>, String>,
}

/// Listing results keyed by committed filter snapshot.
///
/// Each request gets a sequence number. A response only lands if it is the
/// newest for its key and was issued after the last invalidation, and only
/// the entry for the active key is ever rendered, so a slow response for a
/// superseded filter can never replace newer results.
#[derive(Debug, Default)]
pub struct ListingCache {
    active: FilterState,
    next_seq: u64,
    valid_from: u64,
    entries: HashMap<FilterState, CachedListing>,
}

impl ListingCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_active(&mut self, key: FilterState) {
        self.active = key;
    }

    pub fn begin(&mut self) -> FetchTicket {
        let seq = self.next_seq;
        self.next_seq += 1;
        FetchTicket {
            key: self.active.clone(),
            seq,
        }
    }

    /// Marks every cached listing stale and starts the refetch for the active
    /// key in one step. The active entry stays rendered until the refetch
    /// replaces it; entries for other keys are dropped.
    pub fn invalidate_and_begin(&mut self) -> FetchTicket {
        self.valid_from = self.next_seq;
        let active = self.active.clone();
        self.entries.retain(|key, _| *key == active);
        self.begin()
    }

    /// Stores a response. Returns `false` when it was discarded as stale.
    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        outcome: Result<Vec<FileRecord>, String>,
    ) -> bool {
        if ticket.seq < self.valid_from {
            return false;
        }
        if let Some(existing) = self.entries.get(&ticket.key) {
            if existing.seq > ticket.seq {
                return false;
            }
        }
        self.entries.insert(
            ticket.key,
            CachedListing {
                seq: ticket.seq,
                outcome,
            },
        );
        true
    }

    pub fn files(&self) -> Option<&[FileRecord]> {
        match self.entries.get(&self.active).map(|entry| &entry.outcome) {
            Some(Ok(files)) => Some(files.as_slice()),
            _ => None,
        }
    }

    pub fn view(&self) -> ListView {
        match self.entries.get(&self.active) {
            None => ListView::Loading,
            Some(entry) => match &entry.outcome {
                Err(message) => ListView::Error(message.clone()),
                Ok(files) if files.is_empty() => ListView::Empty,
                Ok(files) => ListView::Populated(files.clone()),
            },
        }
    }
}
