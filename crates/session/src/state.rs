//! The view model: one plain struct, explicit update methods.

use catalog::NamedCollection;
use formats::GeoJsonDocument;

use crate::selection::SelectionId;
use crate::submit::{SUBMIT_PROMPT_TEXT, SubmitGate};

/// Pending upload bundle: the name field plus the validated document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Submission {
    pub name: String,
    pub geojson: Option<GeoJsonDocument>,
}

impl Submission {
    /// Both required fields present; the only gate allowed to reach the
    /// network.
    pub fn is_submittable(&self) -> bool {
        !self.name.is_empty() && self.geojson.is_some()
    }
}

/// Ticket identifying one upload validation in flight.
///
/// Tickets are handed out in increasing order and only the newest one may
/// commit its result, so a slow validation can never clobber a newer file
/// choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadTicket(u64);

impl UploadTicket {
    /// Raw value for carrying the ticket across the FFI boundary.
    pub fn into_raw(self) -> u64 {
        self.0
    }

    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    /// The ticket was the newest; the result was committed.
    Applied,
    /// A newer upload began first; the result was dropped.
    Stale,
}

/// Whether a committed update moved the active selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionChange {
    Changed,
    Unchanged,
}

/// Outcome of swapping in a freshly fetched collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListApplied {
    /// True when the active stored entry no longer exists and the
    /// selection was cleared.
    pub selection_cleared: bool,
}

/// Everything the UI renders, in one place: the pending submission, the
/// active selection, the inline-feedback flag and the stored list.
#[derive(Debug, Default)]
pub struct ViewState {
    submission: Submission,
    active: Option<SelectionId>,
    validated: bool,
    remote: Option<NamedCollection>,
    list_loading: bool,
    upload_seq: u64,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submission(&self) -> &Submission {
        &self.submission
    }

    /// Mirrors the name field as the user types.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.submission.name = name.into();
    }

    /// True once the user has tried to submit at least once. The form shows
    /// inline requirement feedback from then on and never hides it again.
    pub fn validated(&self) -> bool {
        self.validated
    }

    pub fn active(&self) -> Option<&SelectionId> {
        self.active.as_ref()
    }

    pub fn remote(&self) -> Option<&NamedCollection> {
        self.remote.as_ref()
    }

    pub fn list_loading(&self) -> bool {
        self.list_loading
    }

    /// Starts a new upload validation, invalidating every earlier ticket.
    pub fn begin_upload(&mut self) -> UploadTicket {
        self.upload_seq += 1;
        UploadTicket(self.upload_seq)
    }

    /// True while `ticket` is still the newest upload.
    pub fn upload_is_current(&self, ticket: UploadTicket) -> bool {
        ticket.0 == self.upload_seq
    }

    /// Commits a validated upload: the document becomes the pending
    /// submission and the active selection. A committed upload replaces
    /// whatever was pending, so the driver must re-sync the map even when
    /// the selection id is unchanged.
    pub fn accept_upload(&mut self, ticket: UploadTicket, doc: GeoJsonDocument) -> UploadOutcome {
        if !self.upload_is_current(ticket) {
            return UploadOutcome::Stale;
        }
        self.submission.geojson = Some(doc);
        self.active = Some(SelectionId::PendingUpload);
        UploadOutcome::Applied
    }

    /// Commits a failed upload validation. Nothing in the state changes
    /// either way (a rejected file leaves the previous pending document
    /// alone); the outcome only tells the driver whether the rejection is
    /// still worth reporting.
    pub fn reject_upload(&mut self, ticket: UploadTicket) -> UploadOutcome {
        if self.upload_is_current(ticket) {
            UploadOutcome::Applied
        } else {
            UploadOutcome::Stale
        }
    }

    /// Moves the active selection. Re-selecting the current choice is a
    /// no-op, matching radio-input semantics.
    pub fn select(&mut self, id: SelectionId) -> SelectionChange {
        if self.active.as_ref() == Some(&id) {
            return SelectionChange::Unchanged;
        }
        self.active = Some(id);
        SelectionChange::Changed
    }

    /// The document the map should show, if the selection resolves.
    pub fn active_document(&self) -> Option<&GeoJsonDocument> {
        match self.active.as_ref()? {
            SelectionId::PendingUpload => self.submission.geojson.as_ref(),
            SelectionId::Stored(name) => self.remote.as_ref()?.get(name),
        }
    }

    pub fn begin_list_fetch(&mut self) {
        self.list_loading = true;
    }

    /// Swaps in a freshly fetched collection. A stored selection whose
    /// name vanished is cleared; a pending upload is never affected.
    pub fn apply_list(&mut self, collection: NamedCollection) -> ListApplied {
        let mut selection_cleared = false;
        if let Some(SelectionId::Stored(name)) = &self.active {
            if !collection.contains(name) {
                self.active = None;
                selection_cleared = true;
            }
        }
        self.remote = Some(collection);
        self.list_loading = false;
        ListApplied { selection_cleared }
    }

    /// A failed fetch keeps whatever list was already on screen.
    pub fn fail_list(&mut self) {
        self.list_loading = false;
    }

    /// Form submit handler: turns on inline feedback unconditionally, then
    /// gates on completeness. Only a complete submission may prompt.
    pub fn request_submit(&mut self) -> SubmitGate {
        self.validated = true;
        if self.submission.is_submittable() {
            SubmitGate::Prompt(SUBMIT_PROMPT_TEXT)
        } else {
            SubmitGate::Blocked
        }
    }

    /// Runs once the user acknowledges a successful submission: the pending
    /// bundle is cleared so the form starts over. The map keeps whatever it
    /// is showing; the overlay only moves on the next committed selection.
    /// Returns true when the pending-upload selection was cleared with it.
    pub fn apply_submit_success(&mut self) -> bool {
        self.submission = Submission::default();
        if self.active == Some(SelectionId::PendingUpload) {
            self.active = None;
            true
        } else {
            false
        }
    }
}
