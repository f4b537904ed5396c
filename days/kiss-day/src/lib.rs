use wasm_bindgen::prelude::*;
use keepsake_engine::*;

// Timeline "kiss" from the manifest, or the built-in preset
keepsake_web::export_stage!(ScrollDay, "kiss-day", |m: &SceneManifest| m.scroll_day("kiss"));
