//! Client-side session: the view model, its selection observer and the
//! map/dialog choreography around it.
//!
//! Everything in this crate is plain host-testable state. Browser
//! specifics live in the viewer app and the `client` crate.

pub mod config;
pub mod selection;
pub mod state;
pub mod submit;
pub mod sync;

pub use selection::{SelectionId, SelectionWatchers, WatcherId};
pub use state::{ListApplied, SelectionChange, Submission, UploadOutcome, UploadTicket, ViewState};
pub use submit::{
    DEFAULT_ERROR_TEXT, PromptAnswer, SUBMIT_PROMPT_TEXT, SUBMIT_SUCCESS_TEXT,
    SUBMIT_WAITING_TEXT, SubmitConclusion, SubmitFlow, SubmitGate, SubmitPhase,
    run_confirmed_submit,
};
pub use sync::{CameraFlight, FLY_TO_DURATION_S, FLY_TO_ZOOM, MapPort, sync_map_to_selection};
