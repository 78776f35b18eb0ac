//! # Fusen
//!
//! A checklist-image renderer for Rust: lay out a short checklist, draw it
//! with checkbox glyphs and outlined text, and export a transparent PNG.
//!
//! ## Overview
//!
//! The core of the library is the [`Stage`], which coordinates font loading,
//! state edits, layout, rasterization, and export. The stage measures every
//! row with real font metrics, sizes the canvas naturally, scales the whole
//! image uniformly to fit the configured bounds (never above 1), and draws
//! each row as a checkbox plus a two-pass outlined text run.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use fusen::Stage;
//!
//! // 1. Create a Stage and load fonts
//! let stage = Stage::new();
//! stage.load_system_fonts();
//!
//! // 2. Edit the checklist state
//! stage.set_raw_text("Buy milk\nWalk the dog");
//! stage.set_outline_width(4.0);
//!
//! // 3. Layout and render
//! let layout = stage.layout();
//! println!("output: {}x{}", layout.output_width, layout.output_height);
//!
//! // 4. Export
//! // stage.save_image(...) / stage.copy_image() / stage.export_png()
//! ```
//!
//! ## Features
//!
//! *   **Natural sizing**: the canvas grows with the widest measured row and
//!     the row count, with minimum floors for tiny content.
//! *   **Fit-to-bounds scaling**: one uniform factor for the whole image,
//!     shrink-only.
//! *   **Outlined text**: a dilated coverage pass under the fill pass, so
//!     outlines read well at any scale.
//! *   **Persistent preferences**: normalized state records that survive
//!     restarts, with internal locking for safe concurrent use.

pub mod export;
pub mod font_store;
pub mod layout;
pub mod measure;
pub mod renderer;
pub mod stage;
pub mod state;
pub mod storage;
pub mod style;

// common re-exports
pub use font_store::FontStore;
pub use stage::Stage;
pub use state::StageState;

// re-export dependencies
pub use fontdb;
pub use fontdue;
pub use parking_lot;

#[cfg(feature = "clipboard")]
pub use arboard;
