use positioned_io2::ReadAt;
use std::io::Write;

use ext2::{Ext2Reader, Image};

pub mod report;

pub use report::{Line, ReportWriter};

/// Walks `image` and writes one line per record to `out`.
///
/// Nothing is written if the superblock or group table cannot be read.
/// Once the walk has started, lines produced before a fatal error are
/// still flushed to `out`.
pub fn dump<R: ReadAt, W: Write>(image: Image<R>, out: W) -> ext2::Result<()> {
    let reader = Ext2Reader::new(image)?;
    let mut writer = ReportWriter::new(out);

    let result = reader.scan(&mut writer);
    writer.flush()?;
    result
}
