use wasm_bindgen::prelude::*;
use keepsake_engine::*;

keepsake_web::export_stage!(ChocolateDay, "chocolate-day", |m: &SceneManifest| {
    Ok::<_, KeepsakeError>(m.chocolate_day())
});
