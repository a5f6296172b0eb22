use std::convert::TryFrom;
use std::error::Error;
use std::fmt;

use num_enum::TryFromPrimitive;

use crate::rom::Rom;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameVersion {
    EoS,
    EoT,
    EoD,
}

// The region is the last byte of the game code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u8)]
pub enum GameRegion {
    Us = b'E',
    Eu = b'P',
    Jp = b'J',
}

#[derive(Debug)]
pub struct BinSection {
    pub name: &'static str,
    pub overlay_id: Option<u16>,
}

#[derive(Debug)]
pub enum ConfigError {
    UnknownGameCode([u8; 4]),
    UnknownRegion(u8),
    UnknownSection(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::UnknownGameCode(code) => {
                write!(f, "unrecognized game code {:?}", String::from_utf8_lossy(code))
            }
            ConfigError::UnknownRegion(byte) => {
                write!(f, "unrecognized region code {:?}", *byte as char)
            }
            ConfigError::UnknownSection(name) => {
                write!(f, "no binary section named {:?}", name)
            }
        }
    }
}

impl Error for ConfigError {}

#[derive(Debug)]
pub struct GameConfig {
    pub game_version: GameVersion,
    pub game_region: GameRegion,
    bin_sections: Vec<BinSection>,
}

impl GameConfig {
    pub fn new(game_version: GameVersion, game_region: GameRegion) -> GameConfig {
        GameConfig {
            game_version,
            game_region,
            bin_sections: vec![
                BinSection { name: "arm9", overlay_id: None },
                BinSection { name: "overlay29", overlay_id: Some(29) },
            ],
        }
    }

    pub fn from_rom(rom: &Rom) -> Result<GameConfig, Box<dyn Error>> {
        let code = rom.game_code()?;

        let game_version = match &code[..3] {
            b"C2S" => GameVersion::EoS,
            b"YFY" => GameVersion::EoT,
            b"YFT" => GameVersion::EoD,
            _ => return Err(Box::new(ConfigError::UnknownGameCode(code))),
        };
        let game_region =
            GameRegion::try_from(code[3]).map_err(|_| ConfigError::UnknownRegion(code[3]))?;

        Ok(GameConfig::new(game_version, game_region))
    }

    pub fn bin_sections(&self) -> &[BinSection] {
        &self.bin_sections
    }

    pub fn bin_section(&self, name: &str) -> Result<&BinSection, ConfigError> {
        self.bin_sections
            .iter()
            .find(|section| section.name == name)
            .ok_or_else(|| ConfigError::UnknownSection(name.to_string()))
    }
}
