use totem::{AppConfig, run};

fn main() {
    env_logger::init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "assets/avatar.glb".to_string());

    // Warm the byte cache so the loader thread skips disk I/O. A miss here
    // is not fatal; the load itself will report the real error.
    if let Err(e) = totem::asset::prefetch(&path) {
        log::warn!("prefetch of {path:?} failed: {e}");
    }

    run(AppConfig::new().title("Totem").size(900, 700).asset(path));
}
