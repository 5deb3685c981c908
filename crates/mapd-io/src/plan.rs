//! Plan output for the external visualizer.
//!
//! One line per timestep:
//!
//! ```text
//! t:(x0,y0),(x1,y1),…,(xN-1,yN-1),
//! ```
//!
//! Note the `(x, y)` component order — the inverse of the engine's `(y, x)`
//! cells — and the trailing comma after the last pair; both are what the
//! visualizer expects.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use mapd_core::Configuration;

use crate::IoError;

/// Write the whole configuration sequence to `writer` in visualizer format.
pub fn write_plan<W: Write>(mut writer: W, plan: &[Configuration]) -> Result<(), IoError> {
    for (t, config) in plan.iter().enumerate() {
        write!(writer, "{t}:")?;
        for cell in config {
            write!(writer, "({},{}),", cell.x, cell.y)?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

/// Create (or truncate) `path` and write the plan there.
pub fn save_plan(path: &Path, plan: &[Configuration]) -> Result<(), IoError> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_plan(&mut writer, plan)?;
    writer.flush()?;
    Ok(())
}
