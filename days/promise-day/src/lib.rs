use wasm_bindgen::prelude::*;
use keepsake_engine::*;

keepsake_web::export_stage!(ScrollDay, "promise-day", |m: &SceneManifest| m.scroll_day("promise"));
