//! The confirm-then-run submission flow and its dialog texts.

use client::{GeoJsonApi, SubmitBody};

use crate::state::Submission;

/// Confirmation prompt shown before anything leaves the browser.
pub const SUBMIT_PROMPT_TEXT: &str = "Are you sure want to submit your data?";

/// Modal text while the POST is in flight.
pub const SUBMIT_WAITING_TEXT: &str = "Please wait a moment...";

/// Acknowledgment when the server did not send its own message.
pub const SUBMIT_SUCCESS_TEXT: &str = "Success submit data!";

/// Default shown by the shell's error dialog when no text is supplied.
pub const DEFAULT_ERROR_TEXT: &str = "500: Something went wrong!";

/// Answer of the submit handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitGate {
    /// A required field is missing: inline feedback only, no dialog, no
    /// request.
    Blocked,
    /// Complete submission: show this confirmation prompt.
    Prompt(&'static str),
}

/// Where one submission attempt stands with the dialog collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitPhase {
    #[default]
    Idle,
    /// The confirmation prompt is on screen.
    Prompting,
    /// The POST is in flight behind the waiting modal.
    Waiting,
}

/// What the driver must do after the prompt was answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PromptAnswer {
    /// There was no prompt to answer; a late or duplicate callback.
    #[default]
    Ignored,
    /// User declined. Nothing happens, state stays as it was.
    Cancelled,
    /// User confirmed: show the waiting modal and run the POST.
    Confirmed { waiting_text: &'static str },
}

/// Tracks one submission attempt through its dialog sequence. Illegal
/// transitions are refused, so a double click or a late shell callback can
/// never start a second POST.
#[derive(Debug, Default)]
pub struct SubmitFlow {
    phase: SubmitPhase,
}

impl SubmitFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> SubmitPhase {
        self.phase
    }

    /// Idle -> Prompting. False while an attempt is already running.
    pub fn begin_prompt(&mut self) -> bool {
        if self.phase != SubmitPhase::Idle {
            return false;
        }
        self.phase = SubmitPhase::Prompting;
        true
    }

    /// Prompting -> Waiting (confirmed) or Idle (cancelled).
    pub fn answer_prompt(&mut self, confirmed: bool) -> PromptAnswer {
        if self.phase != SubmitPhase::Prompting {
            return PromptAnswer::Ignored;
        }
        if confirmed {
            self.phase = SubmitPhase::Waiting;
            PromptAnswer::Confirmed {
                waiting_text: SUBMIT_WAITING_TEXT,
            }
        } else {
            self.phase = SubmitPhase::Idle;
            PromptAnswer::Cancelled
        }
    }

    /// Waiting -> Idle once the POST settled, either way.
    pub fn finish(&mut self) -> bool {
        if self.phase != SubmitPhase::Waiting {
            return false;
        }
        self.phase = SubmitPhase::Idle;
        true
    }
}

/// Outcome of a confirmed submission, ready for the shell's dialogs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitConclusion {
    /// Show the acknowledgment. Once acknowledged the driver resets the
    /// form and refreshes the list.
    Succeeded { ack_text: String },
    /// Show the error dialog. The pending submission is kept for a retry.
    Failed { dialog_text: String },
}

/// Sends the confirmed submission. The acknowledgment text prefers the
/// server's `message`; failures map to the submit dialog cascade (server
/// message, then transport message, then the generic fallback).
pub async fn run_confirmed_submit(
    submission: &Submission,
    api: &impl GeoJsonApi,
) -> SubmitConclusion {
    let Some(geojson) = submission.geojson.clone() else {
        return SubmitConclusion::Failed {
            dialog_text: client::FALLBACK_ERROR_TEXT.to_string(),
        };
    };
    let body = SubmitBody {
        name: submission.name.clone(),
        geojson,
    };
    match api.submit(&body).await {
        Ok(ack) => SubmitConclusion::Succeeded {
            ack_text: ack
                .message
                .unwrap_or_else(|| SUBMIT_SUCCESS_TEXT.to_string()),
        },
        Err(e) => SubmitConclusion::Failed {
            dialog_text: e.user_message(),
        },
    }
}

#[cfg(test)]
mod tests {
    use client::{ApiError, GeoJsonApi, InMemoryApi};
    use formats::GeoJsonDocument;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::state::ViewState;

    const DOC: &str = r#"{"type":"FeatureCollection","features":[{"geometry":{"type":"Point","coordinates":[112.0,-7.5]}}]}"#;

    fn loaded_state(name: &str) -> ViewState {
        let mut state = ViewState::new();
        let ticket = state.begin_upload();
        state.accept_upload(ticket, GeoJsonDocument::parse(DOC).unwrap());
        state.set_name(name);
        state
    }

    #[test]
    fn incomplete_submission_never_reaches_the_prompt() {
        let mut state = ViewState::new();
        state.set_name("jatim");
        let mut flow = SubmitFlow::new();

        assert_eq!(state.request_submit(), SubmitGate::Blocked);
        assert_eq!(flow.phase(), SubmitPhase::Idle);
        assert_eq!(flow.answer_prompt(true), PromptAnswer::Ignored);
    }

    #[test]
    fn flow_refuses_reentrant_prompts_and_late_callbacks() {
        let mut flow = SubmitFlow::new();

        assert!(flow.begin_prompt());
        assert!(!flow.begin_prompt());

        assert_eq!(
            flow.answer_prompt(true),
            PromptAnswer::Confirmed {
                waiting_text: SUBMIT_WAITING_TEXT
            }
        );
        assert_eq!(flow.answer_prompt(true), PromptAnswer::Ignored);
        assert!(flow.finish());
        assert!(!flow.finish());
        assert_eq!(flow.phase(), SubmitPhase::Idle);
    }

    #[test]
    fn cancelling_the_prompt_posts_nothing() {
        let mut state = loaded_state("jatim");
        let mut flow = SubmitFlow::new();
        let api = InMemoryApi::new();

        assert_eq!(state.request_submit(), SubmitGate::Prompt(SUBMIT_PROMPT_TEXT));
        assert!(flow.begin_prompt());
        assert_eq!(flow.answer_prompt(false), PromptAnswer::Cancelled);

        assert_eq!(api.submit_count(), 0);
        assert_eq!(flow.phase(), SubmitPhase::Idle);
        assert!(state.submission().is_submittable());
    }

    #[test]
    fn confirmed_submission_posts_exactly_once() {
        let mut state = loaded_state("jatim");
        let mut flow = SubmitFlow::new();
        let api = InMemoryApi::new();

        assert_eq!(state.request_submit(), SubmitGate::Prompt(SUBMIT_PROMPT_TEXT));
        assert!(flow.begin_prompt());
        assert_eq!(
            flow.answer_prompt(true),
            PromptAnswer::Confirmed {
                waiting_text: SUBMIT_WAITING_TEXT
            }
        );

        let conclusion = pollster::block_on(run_confirmed_submit(state.submission(), &api));
        assert!(flow.finish());

        assert_eq!(
            conclusion,
            SubmitConclusion::Succeeded {
                ack_text: SUBMIT_SUCCESS_TEXT.to_string()
            }
        );
        assert_eq!(api.submit_count(), 1);
        let sent = &api.submissions()[0];
        assert_eq!(sent.name, "jatim");
        assert_eq!(sent.geojson, GeoJsonDocument::parse(DOC).unwrap());
    }

    #[test]
    fn server_ack_message_wins_over_the_default() {
        let state = loaded_state("jatim");
        let api = InMemoryApi::new();
        api.set_submit_message(Some("Saved to db"));

        let conclusion = pollster::block_on(run_confirmed_submit(state.submission(), &api));
        assert_eq!(
            conclusion,
            SubmitConclusion::Succeeded {
                ack_text: "Saved to db".to_string()
            }
        );
    }

    #[test]
    fn acknowledged_success_resets_then_refetches() {
        let mut state = loaded_state("jatim");
        let api = InMemoryApi::new();

        let conclusion = pollster::block_on(run_confirmed_submit(state.submission(), &api));
        assert!(matches!(conclusion, SubmitConclusion::Succeeded { .. }));

        state.apply_submit_success();
        let listed = pollster::block_on(api.fetch_list()).unwrap();
        state.apply_list(listed);

        assert_eq!(state.submission().name, "");
        assert_eq!(state.submission().geojson, None);
        assert!(state.remote().is_some_and(|c| c.contains("jatim")));
        assert_eq!(api.list_call_count(), 1);
    }

    #[test]
    fn failed_submission_keeps_the_bundle_for_a_retry() {
        let mut state = loaded_state("jatim");
        let api = InMemoryApi::new();
        api.fail_next_submit(ApiError::Http {
            status: 409,
            message: Some("Name already exists".to_string()),
        });

        let conclusion = pollster::block_on(run_confirmed_submit(state.submission(), &api));
        assert_eq!(
            conclusion,
            SubmitConclusion::Failed {
                dialog_text: "Name already exists".to_string()
            }
        );
        assert!(state.submission().is_submittable());
        assert_eq!(state.request_submit(), SubmitGate::Prompt(SUBMIT_PROMPT_TEXT));

        let retry = pollster::block_on(run_confirmed_submit(state.submission(), &api));
        assert!(matches!(retry, SubmitConclusion::Succeeded { .. }));
        assert_eq!(api.submit_count(), 1);
    }

    #[test]
    fn failure_dialog_uses_the_transport_text_when_the_body_has_none() {
        let state = loaded_state("jatim");
        let api = InMemoryApi::new();
        api.fail_next_submit(ApiError::Timeout { ms: 30_000 });

        let conclusion = pollster::block_on(run_confirmed_submit(state.submission(), &api));
        assert_eq!(
            conclusion,
            SubmitConclusion::Failed {
                dialog_text: "timeout of 30000ms exceeded".to_string()
            }
        );
    }

    #[test]
    fn missing_document_fails_without_touching_the_network() {
        let mut state = ViewState::new();
        state.set_name("jatim");
        let api = InMemoryApi::new();

        let conclusion = pollster::block_on(run_confirmed_submit(state.submission(), &api));
        assert_eq!(
            conclusion,
            SubmitConclusion::Failed {
                dialog_text: client::FALLBACK_ERROR_TEXT.to_string()
            }
        );
        assert_eq!(api.submit_count(), 0);
    }
}
