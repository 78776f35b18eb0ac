use std::path::Path;

use fusen::{Stage, export, state::Dimension};

#[allow(clippy::unwrap_used)]
fn main() {
    let stage = Stage::new();
    stage.load_system_fonts();
    if stage.is_empty() {
        println!("No system fonts found; rows will render without text.");
    }

    // Point the generic sans-serif fallback at an installed family, so the
    // preset stacks resolve on hosts without the named Japanese fonts.
    {
        let mut fonts = stage.font_store.lock();
        let family = fonts
            .faces()
            .find_map(|face| face.families.first().map(|(name, _)| name.clone()));
        if let Some(name) = family {
            fonts.set_sans_serif_family(name);
        }
    }

    stage.set_raw_text(
        "牛乳を買う\n\
         原稿を送る\n\
         散歩に行く",
    );
    stage.set_outline_width(6.0);
    stage.update_dimension(Dimension::MaxWidth, "720");

    // Layout
    let layout = stage.layout();
    println!(
        "Layout: natural={}x{} scale={:.3} output={}x{}",
        layout.natural_width,
        layout.natural_height,
        layout.scale,
        layout.output_width,
        layout.output_height
    );

    // Render
    let timer = std::time::Instant::now();
    let pixmap = stage.render();
    let elapsed = timer.elapsed();

    println!(
        "Rendered image: width={} height={} (elapsed: {:.2?})",
        pixmap.width, pixmap.height, elapsed
    );

    if pixmap.width == 0 || pixmap.height == 0 {
        println!("Pixmap is empty; nothing to write.");
        return;
    }

    // Ensure debug directory exists
    std::fs::create_dir_all("debug").expect("failed to create debug directory");

    let path = export::save_png(&pixmap, Path::new("debug"))
        .expect("failed to save checklist image");

    println!("Saved checklist image to {}", path.display());
}
