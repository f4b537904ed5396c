use wasm_bindgen::prelude::*;
use keepsake_engine::*;

keepsake_web::export_stage!(TeddyDay, "teddy-day", |m: &SceneManifest| {
    Ok::<_, KeepsakeError>(m.teddy_day())
});
