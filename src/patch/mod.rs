use std::error::Error;
use std::fmt;

pub mod add_key_check;

use crate::game_config::{GameConfig, GameRegion, GameVersion};
use crate::rom::Rom;

// The engine owns the byte-level patching; handlers only get to run it.
pub type PatchCallback<'a> = &'a mut dyn FnMut() -> Result<(), Box<dyn Error>>;

#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchCategory {
    Bugfix,
    ImprovementTweak,
    NewMechanic,
    Utility,
    Other,
}

impl PatchCategory {
    pub fn label(&self) -> &'static str {
        match self {
            PatchCategory::Bugfix => "Bugfixes",
            PatchCategory::ImprovementTweak => "Improvements and Tweaks",
            PatchCategory::NewMechanic => "New Mechanics",
            PatchCategory::Utility => "Utilities",
            PatchCategory::Other => "Other",
        }
    }
}

#[derive(Debug)]
pub enum PatchError {
    UnsupportedConfiguration(GameVersion, GameRegion),
    UnapplyNotSupported,
}

impl fmt::Display for PatchError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PatchError::UnsupportedConfiguration(version, region) => {
                write!(f, "unsupported game configuration: {:?} {:?}", version, region)
            }
            PatchError::UnapplyNotSupported => {
                write!(f, "this patch does not support unapplying")
            }
        }
    }
}

impl Error for PatchError {}

pub trait PatchHandler {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn author(&self) -> &'static str;
    fn version(&self) -> &'static str;
    fn category(&self) -> PatchCategory;

    // Names of patches that must be applied before this one.
    fn depends_on(&self) -> &'static [&'static str] {
        &[]
    }

    fn is_applied(&self, rom: &Rom, config: &GameConfig) -> Result<bool, Box<dyn Error>>;

    fn apply(
        &self,
        apply: PatchCallback,
        rom: &Rom,
        config: &GameConfig,
    ) -> Result<(), Box<dyn Error>>;

    fn unapply(
        &self,
        unapply: PatchCallback,
        rom: &Rom,
        config: &GameConfig,
    ) -> Result<(), Box<dyn Error>>;
}

pub const PATCH_HANDLERS: &[&dyn PatchHandler] = &[&add_key_check::AddKeyCheck];
