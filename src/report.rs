use std::fmt;
use std::io::Write;

use chrono::DateTime;
use ext2::{FileType, Record, RecordSink};

/// `mm/dd/yy hh:mm:ss`, always in GMT.
const TIME_FORMAT: &str = "%m/%d/%y %H:%M:%S";

/// Formats a record as one comma-separated line, without the newline.
pub struct Line<'a>(pub &'a Record);

struct Timestamp(u32);

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match DateTime::from_timestamp(self.0 as i64, 0) {
            Some(time) => write!(f, "{}", time.format(TIME_FORMAT)),
            None => write!(f, "{}", self.0),
        }
    }
}

fn type_char(file_type: FileType) -> char {
    match file_type {
        FileType::File => 'f',
        FileType::Directory => 'd',
        FileType::Symlink => 's',
        FileType::Other => '?',
    }
}

impl fmt::Display for Line<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Record::Superblock(g) => write!(
                f,
                "SUPERBLOCK,{},{},{},{},{},{},{}",
                g.blocks_count,
                g.inodes_count,
                g.block_size,
                g.inode_size,
                g.blocks_per_group,
                g.inodes_per_group,
                g.first_ino
            ),
            Record::Group(g) => write!(
                f,
                "GROUP,{},{},{},{},{},{},{},{}",
                g.index,
                g.block_count,
                g.inode_count,
                g.free_blocks_count,
                g.free_inodes_count,
                g.block_bitmap,
                g.inode_bitmap,
                g.inode_table
            ),
            Record::FreeBlock(block) => write!(f, "BFREE,{block}"),
            Record::FreeInode(inode) => write!(f, "IFREE,{inode}"),
            Record::Inode(i) => {
                write!(
                    f,
                    "INODE,{},{},{:o},{},{},{},{},{},{},{},{}",
                    i.number,
                    type_char(i.file_type),
                    i.permissions(),
                    i.uid,
                    i.gid,
                    i.links_count,
                    Timestamp(i.ctime),
                    Timestamp(i.mtime),
                    Timestamp(i.atime),
                    i.size,
                    i.blocks
                )?;
                for block in i.block {
                    write!(f, ",{block}")?;
                }
                Ok(())
            }
            Record::DirEntry(d) => write!(
                f,
                "DIRENT,{},{},{},{},{},'{}'",
                d.parent,
                d.offset,
                d.inode,
                d.rec_len,
                d.name_len,
                String::from_utf8_lossy(&d.name)
            ),
            Record::Indirect(r) => write!(
                f,
                "INDIRECT,{},{},{},{},{}",
                r.inode, r.level, r.logical_block, r.indirect_block, r.block
            ),
        }
    }
}

/// Writes each record as one line.
pub struct ReportWriter<W: Write> {
    out: W,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RecordSink for ReportWriter<W> {
    fn record(&mut self, record: Record) -> std::io::Result<()> {
        writeln!(self.out, "{}", Line(&record))
    }
}
