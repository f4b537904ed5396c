pub mod runner;

pub use runner::StageRunner;

/// Random seed from the browser, for stages that shuffle (mazes, toy layout).
pub fn browser_seed() -> u64 {
    let hi = (js_sys::Math::random() * u32::MAX as f64) as u64;
    let lo = (js_sys::Math::random() * u32::MAX as f64) as u64;
    (hi << 32) | lo
}

/// Install the panic hook and the console logger. Safe to call repeatedly.
pub fn install_logging() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
}

/// Generate all `#[wasm_bindgen]` exports for one day's stage.
///
/// Generates:
/// - `thread_local!` storage for the StageRunner
/// - `with_runner()` helper function
/// - All wasm-bindgen exports (stage_init, stage_tick, input handlers, buffer accessors)
///
/// # Usage
///
/// ```ignore
/// use wasm_bindgen::prelude::*;
/// use keepsake_engine::*;
///
/// keepsake_web::export_stage!(ProposeDay, "propose-day");
/// keepsake_web::export_stage!(ScrollDay, "kiss-day", |m: &SceneManifest| m.scroll_day("kiss"));
/// ```
///
/// # Arguments
///
/// - `$stage_type`: The stage struct type that implements `keepsake_engine::Stage`
/// - `$stage_name`: A string literal used in log messages
/// - `$build`: Optional `Fn(&SceneManifest) -> keepsake_engine::Result<$stage_type>`;
///   defaults to `<$stage_type>::default()`
#[macro_export]
macro_rules! export_stage {
    ($stage_type:ty, $stage_name:literal) => {
        $crate::export_stage!($stage_type, $stage_name, |_: &SceneManifest| {
            Ok::<$stage_type, KeepsakeError>(<$stage_type>::default())
        });
    };

    ($stage_type:ty, $stage_name:literal, $build:expr) => {
        use std::cell::RefCell;

        thread_local! {
            static RUNNER: RefCell<Option<$crate::StageRunner<$stage_type>>> = RefCell::new(None);
        }

        fn with_runner<R>(f: impl FnOnce(&mut $crate::StageRunner<$stage_type>) -> R) -> Option<R> {
            RUNNER.with(|cell| match cell.borrow_mut().as_mut() {
                Some(runner) => Some(f(runner)),
                None => {
                    log::warn!("{}: not initialized, call stage_init() first", $stage_name);
                    None
                }
            })
        }

        /// Build the stage from a manifest (empty string for defaults) and enter its first phase.
        #[wasm_bindgen]
        pub fn stage_init(manifest_json: &str) -> bool {
            $crate::install_logging();

            let manifest = if manifest_json.trim().is_empty() {
                SceneManifest::default()
            } else {
                SceneManifest::from_json(manifest_json).unwrap_or_else(|e| {
                    log::warn!("{}: {}, using defaults", $stage_name, e);
                    SceneManifest::default()
                })
            };

            let build = $build;
            let stage = match build(&manifest) {
                Ok(stage) => stage,
                Err(e) => {
                    log::error!("{}: stage construction failed: {}", $stage_name, e);
                    return false;
                }
            };

            let runner = $crate::StageRunner::new(stage, $crate::browser_seed());
            RUNNER.with(|cell| {
                *cell.borrow_mut() = Some(runner);
            });

            with_runner(|r| r.init());
            log::info!("{}: initialized", $stage_name);
            true
        }

        #[wasm_bindgen]
        pub fn stage_tick(dt: f32) {
            with_runner(|r| r.tick(dt));
        }

        #[wasm_bindgen]
        pub fn stage_pointer_down(x: f32, y: f32) {
            with_runner(|r| r.push_input(InputEvent::PointerDown { x, y }));
        }

        #[wasm_bindgen]
        pub fn stage_pointer_up(x: f32, y: f32) {
            with_runner(|r| r.push_input(InputEvent::PointerUp { x, y }));
        }

        #[wasm_bindgen]
        pub fn stage_pointer_move(x: f32, y: f32) {
            with_runner(|r| r.push_input(InputEvent::PointerMove { x, y }));
        }

        #[wasm_bindgen]
        pub fn stage_key_down(key_code: u32) {
            with_runner(|r| r.push_input(InputEvent::KeyDown { key_code }));
        }

        #[wasm_bindgen]
        pub fn stage_key_up(key_code: u32) {
            with_runner(|r| r.push_input(InputEvent::KeyUp { key_code }));
        }

        #[wasm_bindgen]
        pub fn stage_scroll(offset: f32, viewport: f32, content: f32) {
            with_runner(|r| r.push_input(InputEvent::Scroll { offset, viewport, content }));
        }

        #[wasm_bindgen]
        pub fn stage_custom_event(kind: u32, a: f32, b: f32, c: f32) {
            with_runner(|r| r.push_input(InputEvent::Custom { kind, a, b, c }));
        }

        // ---- State accessors ----

        #[wasm_bindgen]
        pub fn get_phase() -> u32 {
            with_runner(|r| r.phase()).unwrap_or(0)
        }

        #[wasm_bindgen]
        pub fn get_finished() -> bool {
            with_runner(|r| r.is_finished()).unwrap_or(false)
        }

        #[wasm_bindgen]
        pub fn get_buffer_ptr() -> *const f32 {
            with_runner(|r| r.buffer_ptr()).unwrap_or(std::ptr::null())
        }

        // ---- Capacity accessors ----

        #[wasm_bindgen]
        pub fn get_max_outputs() -> u32 {
            with_runner(|r| r.max_outputs()).unwrap_or(0)
        }

        #[wasm_bindgen]
        pub fn get_max_cues() -> u32 {
            with_runner(|r| r.max_cues()).unwrap_or(0)
        }

        #[wasm_bindgen]
        pub fn get_max_events() -> u32 {
            with_runner(|r| r.max_events()).unwrap_or(0)
        }

        #[wasm_bindgen]
        pub fn get_buffer_total_floats() -> u32 {
            with_runner(|r| r.buffer_total_floats()).unwrap_or(0)
        }
    };
}
