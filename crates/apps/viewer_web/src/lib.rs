use std::cell::RefCell;

use console_error_panic_hook::set_once;
use wasm_bindgen::prelude::*;

use client::{GeoJsonApi, HttpApi, RequestConfig};
use formats::GeoJsonDocument;
use session::config::{
    APP_TITLE, BASE_LAYERS, CURRENT_INPUT_LABEL, FILE_FIELD_FEEDBACK, FILE_FIELD_LABEL,
    INITIAL_CENTER, INITIAL_ZOOM, LIST_CAPTION, NAME_FIELD_FEEDBACK, NAME_FIELD_LABEL,
    NAME_FIELD_PLACEHOLDER, SUBMIT_BUTTON_LABEL,
};
use session::{
    CameraFlight, DEFAULT_ERROR_TEXT, MapPort, PromptAnswer, SUBMIT_WAITING_TEXT, SelectionChange,
    SelectionId, SelectionWatchers, SubmitConclusion, SubmitFlow, SubmitGate, UploadOutcome,
    UploadTicket, ViewState, run_confirmed_submit, sync_map_to_selection,
};

#[wasm_bindgen]
extern "C" {
    // Leaflet hooks the shell installs as globals before init_app.
    fn shell_map_fly_to(lat_deg: f64, lng_deg: f64, zoom: u32, duration_s: f64, animate: bool);
    fn shell_overlay_clear();
    fn shell_overlay_set_geojson(geojson_text: &str);
}

#[derive(Debug)]
struct AppState {
    view: ViewState,
    flow: SubmitFlow,
    api: HttpApi,
    map_ready: bool,
}

thread_local! {
    static STATE: RefCell<AppState> = RefCell::new(AppState {
        view: ViewState::new(),
        flow: SubmitFlow::new(),
        api: HttpApi::new(RequestConfig::default()),
        map_ready: false,
    });
    static WATCHERS: RefCell<SelectionWatchers> = RefCell::new(SelectionWatchers::new());
}

/// Safe TLS access helper that returns a default on teardown instead of panicking.
/// Use this for all STATE accesses to prevent hot-reload crashes.
fn with_state<F, R>(f: F) -> R
where
    F: FnOnce(&RefCell<AppState>) -> R,
    R: Default,
{
    STATE.try_with(f).unwrap_or_default()
}

fn with_watchers<F, R>(f: F) -> R
where
    F: FnOnce(&RefCell<SelectionWatchers>) -> R,
    R: Default,
{
    WATCHERS.try_with(f).unwrap_or_default()
}

fn log(msg: &str) {
    web_sys::console::log_1(&JsValue::from_str(msg));
}

fn log_error(msg: &str) {
    web_sys::console::error_1(&JsValue::from_str(msg));
}

fn set_prop(obj: &js_sys::Object, key: &str, value: &JsValue) {
    let _ = js_sys::Reflect::set(obj, &JsValue::from_str(key), value);
}

fn set_str(obj: &js_sys::Object, key: &str, value: &str) {
    set_prop(obj, key, &JsValue::from_str(value));
}

fn set_bool(obj: &js_sys::Object, key: &str, value: bool) {
    set_prop(obj, key, &JsValue::from_bool(value));
}

fn set_f64(obj: &js_sys::Object, key: &str, value: f64) {
    set_prop(obj, key, &JsValue::from_f64(value));
}

/// Leaflet as the synchronizer drives it, via the shell hooks.
struct ShellMap {
    ready: bool,
}

impl MapPort for ShellMap {
    fn is_ready(&self) -> bool {
        self.ready
    }

    fn clear_overlay(&mut self) {
        shell_overlay_clear();
    }

    fn fly_to(&mut self, flight: CameraFlight) {
        shell_map_fly_to(
            flight.center.lat_deg,
            flight.center.lng_deg,
            flight.zoom as u32,
            flight.duration_s,
            flight.animate,
        );
    }

    fn set_overlay(&mut self, doc: &GeoJsonDocument) {
        shell_overlay_set_geojson(&doc.to_json_string());
    }
}

/// Runs the map synchronizer against the shell hooks.
fn sync_shell_map() {
    with_state(|state| {
        let s = state.borrow();
        let mut map = ShellMap { ready: s.map_ready };
        if let Some(flight) = sync_map_to_selection(&s.view, &mut map) {
            log(&format!(
                "map: flew to ({:.6}, {:.6}) zoom {}",
                flight.center.lat_deg, flight.center.lng_deg, flight.zoom
            ));
        }
    });
}

/// One notification per committed selection change.
fn notify_selection_changed() {
    let current = with_state(|state| state.borrow().view.active().cloned());
    with_watchers(|watchers| watchers.borrow_mut().notify(current.as_ref()));
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    set_once();
    Ok(())
}

/// Resets the session and returns the fixed chrome the shell renders:
/// initial view, base layers, captions and form texts. The shell must
/// install the `shell_*` map hooks before calling this.
#[wasm_bindgen]
pub fn init_app() -> Result<JsValue, JsValue> {
    with_state(|state| {
        let mut s = state.borrow_mut();
        s.view = ViewState::new();
        s.flow = SubmitFlow::new();
        s.map_ready = false;
    });
    with_watchers(|watchers| {
        let mut w = watchers.borrow_mut();
        *w = SelectionWatchers::new();
        w.subscribe(|_| sync_shell_map());
    });
    log("app: session reset");

    let config = js_sys::Object::new();
    set_f64(&config, "centerLat", INITIAL_CENTER.lat_deg);
    set_f64(&config, "centerLng", INITIAL_CENTER.lng_deg);
    set_f64(&config, "zoom", INITIAL_ZOOM as f64);
    set_str(&config, "title", APP_TITLE);
    set_str(&config, "listCaption", LIST_CAPTION);
    set_str(&config, "currentInputLabel", CURRENT_INPUT_LABEL);
    set_str(&config, "errorDialogDefault", DEFAULT_ERROR_TEXT);

    let form = js_sys::Object::new();
    set_str(&form, "fileLabel", FILE_FIELD_LABEL);
    set_str(&form, "fileFeedback", FILE_FIELD_FEEDBACK);
    set_str(&form, "nameLabel", NAME_FIELD_LABEL);
    set_str(&form, "namePlaceholder", NAME_FIELD_PLACEHOLDER);
    set_str(&form, "nameFeedback", NAME_FIELD_FEEDBACK);
    set_str(&form, "submitLabel", SUBMIT_BUTTON_LABEL);
    set_prop(&config, "form", &form);

    let layers = js_sys::Array::new();
    for (index, layer) in BASE_LAYERS.iter().enumerate() {
        let o = js_sys::Object::new();
        set_str(&o, "name", layer.name);
        set_str(&o, "url", layer.url_template);
        set_str(&o, "attribution", layer.attribution);
        set_bool(&o, "checked", index == 0);
        layers.push(&o);
    }
    set_prop(&config, "baseLayers", &layers);

    Ok(config.into())
}

/// The shell calls this once Leaflet and the overlay layer exist. Catches
/// up on any selection committed before the map was ready.
#[wasm_bindgen]
pub fn map_mounted() {
    with_state(|state| {
        state.borrow_mut().map_ready = true;
    });
    notify_selection_changed();
}

/// Starts a new upload and returns its ticket. Call this before reading
/// the file, so a slow read can never clobber a newer choice.
#[wasm_bindgen]
pub fn begin_upload() -> f64 {
    with_state(|state| state.borrow_mut().view.begin_upload().into_raw() as f64)
}

/// Completes an upload with the file's text. The returned object tells the
/// shell what to do: show the validation-error dialog and clear the file
/// input, or nothing at all for a stale result.
#[wasm_bindgen]
pub fn finish_upload(ticket: f64, geojson_text: String) -> Result<JsValue, JsValue> {
    let ticket = UploadTicket::from_raw(ticket as u64);
    let result = js_sys::Object::new();

    match GeoJsonDocument::parse(&geojson_text) {
        Ok(doc) => {
            let features = doc.feature_count();
            let content_id = doc.content_id();
            let applied = with_state(|state| {
                let mut s = state.borrow_mut();
                s.view.accept_upload(ticket, doc) == UploadOutcome::Applied
            });
            if applied {
                log(&format!("upload: accepted {features} features ({content_id})"));
                notify_selection_changed();
                set_bool(&result, "ok", true);
                set_bool(&result, "stale", false);
                set_f64(&result, "featureCount", features as f64);
                set_str(&result, "contentId", &content_id);
            } else {
                log("upload: stale result dropped");
                set_bool(&result, "ok", false);
                set_bool(&result, "stale", true);
            }
        }
        Err(e) => {
            let applied = with_state(|state| {
                state.borrow_mut().view.reject_upload(ticket) == UploadOutcome::Applied
            });
            if applied {
                log_error(&format!("upload: rejected: {e}"));
                set_bool(&result, "ok", false);
                set_bool(&result, "stale", false);
                set_str(&result, "errorDialog", &e.to_string());
                set_bool(&result, "clearFileInput", true);
            } else {
                log("upload: stale rejection dropped");
                set_bool(&result, "ok", false);
                set_bool(&result, "stale", true);
            }
        }
    }
    Ok(result.into())
}

/// Mirrors the name field as the user types.
#[wasm_bindgen]
pub fn set_name(name: String) {
    with_state(|state| state.borrow_mut().view.set_name(name));
}

/// Form submit handler. Returns the confirmation prompt the shell must
/// show, or the inline-feedback outcome when the bundle is incomplete.
#[wasm_bindgen]
pub fn request_submit() -> Result<JsValue, JsValue> {
    #[derive(Default)]
    struct Gate {
        prompt: Option<&'static str>,
        busy: bool,
    }

    let gate = with_state(|state| {
        let mut s = state.borrow_mut();
        match s.view.request_submit() {
            SubmitGate::Blocked => Gate::default(),
            SubmitGate::Prompt(text) => {
                if s.flow.begin_prompt() {
                    Gate {
                        prompt: Some(text),
                        busy: false,
                    }
                } else {
                    Gate {
                        prompt: None,
                        busy: true,
                    }
                }
            }
        }
    });

    let result = js_sys::Object::new();
    set_bool(&result, "validated", true);
    if let Some(text) = gate.prompt {
        set_str(&result, "prompt", text);
        set_str(&result, "waitingText", SUBMIT_WAITING_TEXT);
    } else if gate.busy {
        set_bool(&result, "busy", true);
    } else {
        set_bool(&result, "blocked", true);
    }
    Ok(result.into())
}

/// Completes the prompt. On confirmation the POST runs while the shell's
/// waiting modal is on screen; the resolved object names the dialog to
/// show next.
#[wasm_bindgen]
pub async fn submit_confirmed(confirmed: bool) -> Result<JsValue, JsValue> {
    let result = js_sys::Object::new();

    let answer = with_state(|state| state.borrow_mut().flow.answer_prompt(confirmed));
    match answer {
        PromptAnswer::Ignored => {
            set_str(&result, "status", "ignored");
        }
        PromptAnswer::Cancelled => {
            log("submit: cancelled at prompt");
            set_str(&result, "status", "cancelled");
        }
        PromptAnswer::Confirmed { .. } => {
            let ctx = with_state(|state| {
                let s = state.borrow();
                Some((s.view.submission().clone(), s.api.clone()))
            });
            let Some((submission, api)) = ctx else {
                set_str(&result, "status", "ignored");
                return Ok(result.into());
            };

            let conclusion = run_confirmed_submit(&submission, &api).await;
            with_state(|state| {
                state.borrow_mut().flow.finish();
            });
            match conclusion {
                SubmitConclusion::Succeeded { ack_text } => {
                    log("submit: accepted by server");
                    set_str(&result, "status", "success");
                    set_str(&result, "message", &ack_text);
                }
                SubmitConclusion::Failed { dialog_text } => {
                    log_error(&format!("submit: failed: {dialog_text}"));
                    set_str(&result, "status", "error");
                    set_str(&result, "message", &dialog_text);
                }
            }
        }
    }
    Ok(result.into())
}

/// Runs when the user dismisses the success dialog: clears the pending
/// bundle and asks the shell to reset its form element and refresh the
/// list. The map keeps whatever it is showing.
#[wasm_bindgen]
pub fn acknowledge_submit_success() -> Result<JsValue, JsValue> {
    let cleared = with_state(|state| state.borrow_mut().view.apply_submit_success());
    log("submit: acknowledged, form reset");

    let result = js_sys::Object::new();
    set_bool(&result, "resetForm", true);
    set_bool(&result, "refreshList", true);
    set_bool(&result, "selectionCleared", cleared);
    Ok(result.into())
}

/// Fetches the stored collection. The shell shows its spinner while the
/// promise is pending and the error dialog on failure.
#[wasm_bindgen]
pub async fn refresh_list() -> Result<JsValue, JsValue> {
    let api = with_state(|state| {
        let mut s = state.borrow_mut();
        s.view.begin_list_fetch();
        Some(s.api.clone())
    });
    let result = js_sys::Object::new();
    let Some(api) = api else {
        set_bool(&result, "ok", false);
        set_str(&result, "errorDialog", DEFAULT_ERROR_TEXT);
        return Ok(result.into());
    };

    match api.fetch_list().await {
        Ok(collection) => {
            let outcome = with_state(move |state| {
                let mut s = state.borrow_mut();
                let applied = s.view.apply_list(collection);
                let names: Vec<String> = s
                    .view
                    .remote()
                    .map(|c| c.names().map(str::to_string).collect())
                    .unwrap_or_default();
                Some((names, applied.selection_cleared))
            });
            let (names, cleared) = outcome.unwrap_or_default();
            log(&format!("list: loaded {} entries", names.len()));
            if cleared {
                notify_selection_changed();
            }

            set_bool(&result, "ok", true);
            let arr = js_sys::Array::new();
            for name in &names {
                arr.push(&JsValue::from_str(name));
            }
            set_prop(&result, "names", &arr);
            set_bool(&result, "selectionCleared", cleared);
        }
        Err(e) => {
            with_state(|state| state.borrow_mut().view.fail_list());
            log_error(&format!("list: fetch failed: {e}"));
            set_bool(&result, "ok", false);
            set_str(&result, "errorDialog", &e.transport_message());
        }
    }
    Ok(result.into())
}

/// Radio click on a stored entry. True when the selection moved.
#[wasm_bindgen]
pub fn select_stored(name: String) -> bool {
    let changed = with_state(|state| {
        state.borrow_mut().view.select(SelectionId::Stored(name)) == SelectionChange::Changed
    });
    if changed {
        notify_selection_changed();
    }
    changed
}

/// Radio click on the pending-upload entry. True when the selection moved.
#[wasm_bindgen]
pub fn select_current_input() -> bool {
    let changed = with_state(|state| {
        state.borrow_mut().view.select(SelectionId::PendingUpload) == SelectionChange::Changed
    });
    if changed {
        notify_selection_changed();
    }
    changed
}

/// Sidebar state: entry names in stored order, whether the pending radio
/// exists, which radio is checked and whether the spinner runs.
#[wasm_bindgen]
pub fn list_state() -> Result<JsValue, JsValue> {
    let result = js_sys::Object::new();
    with_state(|state| {
        let s = state.borrow();
        let names = js_sys::Array::new();
        if let Some(remote) = s.view.remote() {
            for name in remote.names() {
                names.push(&JsValue::from_str(name));
            }
        }
        set_prop(&result, "names", &names);
        set_bool(
            &result,
            "hasPendingUpload",
            s.view.submission().geojson.is_some(),
        );
        set_bool(&result, "loading", s.view.list_loading());
        set_bool(&result, "validated", s.view.validated());
        match s.view.active() {
            Some(SelectionId::PendingUpload) => {
                set_str(&result, "checked", "pending");
            }
            Some(SelectionId::Stored(name)) => {
                set_str(&result, "checked", "stored");
                set_str(&result, "checkedName", name);
            }
            None => {}
        }
    });
    Ok(result.into())
}
