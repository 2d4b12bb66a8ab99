pub mod change;
pub mod decide;
pub mod doc;
pub mod review;
pub mod suggest;

use std::io::Read;
use std::path::Path;

use crate::error::Result;

/// Reads command input from a file, or from stdin when the path is "-".
pub(crate) fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        Ok(std::fs::read_to_string(path)?)
    }
}
