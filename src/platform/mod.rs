#[cfg(windows)]
mod windows;

use std::io;
use std::path::Path;

use crate::error::Error;

/// Hand a chosen path to the OS default application. One call per pick.
pub fn open_with_default_app(path: &Path) -> io::Result<()> {
    open::that(path)
}

/// Install the Explorer right-click menu entry (HKCU, no elevation needed).
pub fn register_context_menu() -> Result<(), Error> {
    #[cfg(windows)]
    {
        windows::register_context_menu()
    }
    #[cfg(not(windows))]
    {
        Err(Error::Unsupported(
            "the Explorer context menu is only available on Windows".to_string(),
        ))
    }
}

/// Remove the Explorer right-click menu entry. Missing keys are not an error.
pub fn unregister_context_menu() -> Result<(), Error> {
    #[cfg(windows)]
    {
        windows::unregister_context_menu()
    }
    #[cfg(not(windows))]
    {
        Err(Error::Unsupported(
            "the Explorer context menu is only available on Windows".to_string(),
        ))
    }
}
