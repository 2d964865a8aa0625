//! Shared type definitions for the solder-joint failure animation.
//!
//! This crate is the single source of truth for the values exchanged
//! between the animation clock and whatever presents it. Types defined
//! here flow downstream to `TypeScript` via `ts-rs` so a browser presenter
//! can consume the same snapshot shape the engine produces.
//!
//! # Modules
//!
//! - [`enums`] -- Phases, loading families, fracture kinds, and the
//!   scenario tag [`SimulationMode`]
//! - [`structs`] -- The per-frame [`Snapshot`] handed to presenters

pub mod enums;
pub mod structs;

pub use enums::{
    BendFracture, Family, FractureKind, ModeParseError, Phase, PullFracture, SimulationMode,
};
pub use structs::Snapshot;

#[cfg(test)]
mod tests {
    //! Binding generation for the browser presenter.

    #[test]
    fn export_bindings() {
        // ts-rs writes the `.ts` files to `bindings/` relative to the
        // crate root when `export_all` is called.
        use ts_rs::TS;

        let _ = crate::enums::Phase::export_all();
        let _ = crate::enums::Family::export_all();
        let _ = crate::enums::FractureKind::export_all();
        let _ = crate::enums::BendFracture::export_all();
        let _ = crate::enums::PullFracture::export_all();
        let _ = crate::enums::SimulationMode::export_all();
        let _ = crate::structs::Snapshot::export_all();
    }
}
