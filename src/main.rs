use std::env;
use std::error::Error;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process;

use crc::crc32;
use log::{info, warn};

mod game_config;
mod patch;
mod rom;

use game_config::GameConfig;
use patch::{PatchError, PATCH_HANDLERS};
use rom::Rom;

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<OsString> = env::args_os().collect();

    if args.len() != 2 {
        println!("Usage: {} <rom_path>", &env::args().next().unwrap());
        process::exit(-1);
    }

    pretty_env_logger::init();

    let rom_path = PathBuf::from(&args[1]);
    let rom = Rom::from_file(&rom_path)?;
    info!(
        "Loaded {:?} ({} bytes, CRC32=0x{:08X})",
        rom_path,
        rom.len(),
        crc32::checksum_ieee(rom.data())
    );

    let config = GameConfig::from_rom(&rom)?;
    info!(
        "Detected game: {:?} {:?}",
        config.game_version, config.game_region
    );
    for section in config.bin_sections() {
        info!("Section {}: {} bytes", section.name, rom.get_binary(section)?.len());
    }

    for &handler in PATCH_HANDLERS {
        match handler.is_applied(&rom, &config) {
            Ok(applied) => {
                println!(
                    "{} {} [{}]: {}",
                    handler.name(),
                    handler.version(),
                    handler.category().label(),
                    if applied { "applied" } else { "not applied" }
                );
            }
            Err(err) => {
                let unsupported = matches!(
                    err.downcast_ref::<PatchError>(),
                    Some(PatchError::UnsupportedConfiguration(..))
                );
                if !unsupported {
                    return Err(err);
                }
                warn!("Skipping {}: {}", handler.name(), err);
            }
        }
    }

    Ok(())
}
