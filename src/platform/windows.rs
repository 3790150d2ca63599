use std::env;
use std::io;

use tracing::info;
use winreg::enums::HKEY_CURRENT_USER;
use winreg::RegKey;

use crate::error::Error;

// Directory = right-click on a folder, Background = right-click inside one.
const MENU_KEYS: [&str; 2] = [
    r"Software\Classes\Directory\shell\FileRoulette",
    r"Software\Classes\Directory\Background\shell\FileRoulette",
];
const MENU_LABEL: &str = "Open a random file here";

pub fn register_context_menu() -> Result<(), Error> {
    let exe = env::current_exe()?;
    let exe_str = exe.to_string_lossy().into_owned();
    // %V expands to the folder the menu was invoked on.
    let command = format!("\"{}\" pick --dir \"%V\"", exe_str);

    let hkcu = RegKey::predef(HKEY_CURRENT_USER);
    for key_path in MENU_KEYS {
        let (key, _) = hkcu.create_subkey(key_path)?;
        key.set_value("", &MENU_LABEL)?;
        key.set_value("Icon", &exe_str)?;
        let (cmd_key, _) = key.create_subkey("command")?;
        cmd_key.set_value("", &command)?;
    }

    info!("Registered context menu entry '{}'", MENU_LABEL);
    Ok(())
}

pub fn unregister_context_menu() -> Result<(), Error> {
    let hkcu = RegKey::predef(HKEY_CURRENT_USER);
    for key_path in MENU_KEYS {
        match hkcu.delete_subkey_all(key_path) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }
    }

    info!("Removed context menu entry");
    Ok(())
}
