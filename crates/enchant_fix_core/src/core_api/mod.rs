mod error;
mod load_order;
mod patcher;
mod store;
pub mod text_repair;
mod types;
pub mod well_known_perks;

pub use error::{CoreError, CoreErrorCode};
pub use load_order::{DEFAULT_PATCH_NAME, LoadOrderStore, Plugin};
pub use patcher::{Patcher, RequiredPerk, missing_perks, resolve_required_perks};
pub use store::RecordStore;
pub use types::{
    NameField, NameWriteBack, PatchReport, PatchSettings, PatchedRecord, RecordOutcome,
};
pub use well_known_perks::{REQUIRED_PERKS, WellKnownPerk};
