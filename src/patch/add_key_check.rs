use std::error::Error;

use crate::game_config::{GameConfig, GameRegion, GameVersion};
use crate::patch::{PatchCallback, PatchCategory, PatchError, PatchHandler};
use crate::rom::{read_u32, Rom};

// Branch instruction overwritten by the patch.
const ORIGINAL_INSTRUCTION: u32 = 0x0A00000D;

const OFFSET_US: usize = 0x6AF00;
const OFFSET_EU: usize = 0x6B1C0;
const OFFSET_JP: usize = 0x6AC20;

pub struct AddKeyCheck;

impl PatchHandler for AddKeyCheck {
    fn name(&self) -> &'static str {
        "AddKeyCheck"
    }

    fn description(&self) -> &'static str {
        "Prevents Keys from being used on party members that are not below a Key Door!"
    }

    fn author(&self) -> &'static str {
        "Adex"
    }

    fn version(&self) -> &'static str {
        "0.1.0"
    }

    fn category(&self) -> PatchCategory {
        PatchCategory::ImprovementTweak
    }

    fn depends_on(&self) -> &'static [&'static str] {
        &["ExtraSpace"]
    }

    fn is_applied(&self, rom: &Rom, config: &GameConfig) -> Result<bool, Box<dyn Error>> {
        if config.game_version != GameVersion::EoS {
            return Err(Box::new(PatchError::UnsupportedConfiguration(
                config.game_version,
                config.game_region,
            )));
        }

        let overlay29 = rom.get_binary(config.bin_section("overlay29")?)?;
        let offset = match config.game_region {
            GameRegion::Us => OFFSET_US,
            GameRegion::Eu => OFFSET_EU,
            GameRegion::Jp => OFFSET_JP,
        };

        Ok(read_u32(overlay29, offset)? != ORIGINAL_INSTRUCTION)
    }

    fn apply(
        &self,
        apply: PatchCallback,
        _rom: &Rom,
        _config: &GameConfig,
    ) -> Result<(), Box<dyn Error>> {
        apply()
    }

    fn unapply(
        &self,
        _unapply: PatchCallback,
        _rom: &Rom,
        _config: &GameConfig,
    ) -> Result<(), Box<dyn Error>> {
        Err(Box::new(PatchError::UnapplyNotSupported))
    }
}

#[cfg(test)]
mod tests {
    use byteorder::{ByteOrder, LittleEndian};

    use super::*;
    use crate::rom::testimg::build_image;

    fn rom_with_overlay29(game_code: &[u8; 4], offset: usize, value: u32) -> Rom {
        let mut overlay = vec![0; 0x6C000];
        LittleEndian::write_u32(&mut overlay[offset..offset + 4], value);
        Rom::new(build_image(game_code, &[], &[(29, &overlay)]))
    }

    #[test]
    fn metadata() {
        let handler = AddKeyCheck;
        assert_eq!(handler.name(), "AddKeyCheck");
        assert_eq!(handler.author(), "Adex");
        assert_eq!(handler.version(), "0.1.0");
        assert_eq!(handler.category(), PatchCategory::ImprovementTweak);
    }

    #[test]
    fn depends_on_extra_space() {
        assert_eq!(AddKeyCheck.depends_on(), &["ExtraSpace"]);
    }

    #[test]
    fn original_instruction_means_not_applied() {
        for &(code, region, offset) in &[
            (b"C2SE", GameRegion::Us, OFFSET_US),
            (b"C2SP", GameRegion::Eu, OFFSET_EU),
            (b"C2SJ", GameRegion::Jp, OFFSET_JP),
        ] {
            let rom = rom_with_overlay29(code, offset, ORIGINAL_INSTRUCTION);
            let config = GameConfig::new(GameVersion::EoS, region);
            assert!(!AddKeyCheck.is_applied(&rom, &config).unwrap());
        }
    }

    #[test]
    fn any_other_instruction_means_applied() {
        for &(code, region, offset) in &[
            (b"C2SE", GameRegion::Us, OFFSET_US),
            (b"C2SP", GameRegion::Eu, OFFSET_EU),
            (b"C2SJ", GameRegion::Jp, OFFSET_JP),
        ] {
            // mov r0, r0
            let rom = rom_with_overlay29(code, offset, 0xE1A00000);
            let config = GameConfig::new(GameVersion::EoS, region);
            assert!(AddKeyCheck.is_applied(&rom, &config).unwrap());
        }
    }

    #[test]
    fn probes_the_offset_of_the_configured_region() {
        // Sentinel at the US offset only; an EU config must not look there.
        let rom = rom_with_overlay29(b"C2SP", OFFSET_US, ORIGINAL_INSTRUCTION);
        let config = GameConfig::new(GameVersion::EoS, GameRegion::Eu);
        assert!(AddKeyCheck.is_applied(&rom, &config).unwrap());
    }

    #[test]
    fn unsupported_game_version() {
        let rom = rom_with_overlay29(b"YFYE", OFFSET_US, ORIGINAL_INSTRUCTION);
        for version in &[GameVersion::EoT, GameVersion::EoD] {
            let config = GameConfig::new(*version, GameRegion::Us);
            let err = AddKeyCheck.is_applied(&rom, &config).unwrap_err();
            assert!(matches!(
                err.downcast_ref::<PatchError>(),
                Some(PatchError::UnsupportedConfiguration(..))
            ));
        }
    }

    #[test]
    fn short_overlay_is_an_error() {
        let rom = Rom::new(build_image(b"C2SE", &[], &[(29, &[0; 16])]));
        let config = GameConfig::new(GameVersion::EoS, GameRegion::Us);
        assert!(AddKeyCheck.is_applied(&rom, &config).is_err());
    }

    #[test]
    fn apply_runs_the_callback_once() {
        let rom = rom_with_overlay29(b"C2SE", OFFSET_US, ORIGINAL_INSTRUCTION);
        let config = GameConfig::new(GameVersion::EoS, GameRegion::Us);

        let mut calls = 0;
        AddKeyCheck
            .apply(&mut || {
                calls += 1;
                Ok(())
            }, &rom, &config)
            .unwrap();
        assert_eq!(calls, 1);
    }

    #[test]
    fn apply_propagates_callback_errors() {
        let rom = rom_with_overlay29(b"C2SE", OFFSET_US, ORIGINAL_INSTRUCTION);
        let config = GameConfig::new(GameVersion::EoS, GameRegion::Us);

        let result = AddKeyCheck.apply(
            &mut || Err(Box::new(PatchError::UnapplyNotSupported) as Box<dyn Error>),
            &rom,
            &config,
        );
        assert!(result.is_err());
    }

    #[test]
    fn unapply_always_fails_without_running_the_callback() {
        let rom = rom_with_overlay29(b"C2SE", OFFSET_US, ORIGINAL_INSTRUCTION);
        let config = GameConfig::new(GameVersion::EoS, GameRegion::Us);

        let mut calls = 0;
        let err = AddKeyCheck
            .unapply(&mut || {
                calls += 1;
                Ok(())
            }, &rom, &config)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PatchError>(),
            Some(PatchError::UnapplyNotSupported)
        ));
        assert_eq!(calls, 0);
    }
}
