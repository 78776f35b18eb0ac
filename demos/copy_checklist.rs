use fusen::{Stage, export::CopyStatus};

fn main() {
    let stage = Stage::new();
    stage.load_system_fonts();
    if stage.is_empty() {
        println!("No system fonts found; rows will render without text.");
    }

    if !stage.clipboard_supported() {
        println!("No clipboard available on this host; nothing to do.");
        return;
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
        "打ち合わせ資料を準備\n\
         請求書を送付\n\
         週報を書く",
    );

    match stage.copy_image() {
        CopyStatus::Success => println!("Copied the checklist image to the clipboard."),
        _ => println!("Copying failed; check the log output for details."),
    }
}
