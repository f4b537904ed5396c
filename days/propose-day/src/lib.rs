use wasm_bindgen::prelude::*;
use keepsake_engine::*;

keepsake_web::export_stage!(ProposeDay, "propose-day");
