use crate::structs::{DIR_ENTRY_HEADER_LEN, DirEntryHeader};
use crate::util::BytesExt;
use crate::{Ext2Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub parent: u32,
    /// Byte offset of the entry inside its directory block.
    pub offset: u32,
    pub inode: u32,
    pub rec_len: u16,
    pub name_len: u8,
    pub file_type: u8,
    pub name: Vec<u8>,
}

/// Walks the entry chain of one directory block.
///
/// Reclaimed slots (inode 0) are stepped over. A malformed record yields a
/// single [`Ext2Error::CorruptDirectory`] and ends the walk.
pub struct DirEntries {
    parent: u32,
    block: u32,
    data: Vec<u8>,
    offset: usize,
    done: bool,
}

impl DirEntries {
    pub fn new(parent: u32, block: u32, data: Vec<u8>) -> Self {
        Self {
            parent,
            block,
            data,
            offset: 0,
            done: false,
        }
    }

    fn corrupt(&mut self, reason: &'static str) -> Ext2Error {
        self.done = true;
        Ext2Error::CorruptDirectory {
            inode: self.parent,
            block: self.block,
            offset: self.offset as u32,
            reason,
        }
    }
}

impl Iterator for DirEntries {
    type Item = Result<DirEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done && self.offset < self.data.len() {
            let Some(header) = self.data.pod_at::<DirEntryHeader>(self.offset) else {
                return Some(Err(self.corrupt("entry header crosses the block end")));
            };

            let rec_len = header.rec_len as usize;
            if rec_len == 0 {
                return Some(Err(self.corrupt("zero record length")));
            }
            if rec_len > self.data.len() - self.offset {
                return Some(Err(self.corrupt("record runs past the block end")));
            }
            if header.name_len as usize > rec_len.saturating_sub(DIR_ENTRY_HEADER_LEN) {
                return Some(Err(self.corrupt("name runs past the record")));
            }

            let offset = self.offset;
            self.offset += rec_len;
            if header.inode == 0 {
                continue;
            }

            let name_start = offset + DIR_ENTRY_HEADER_LEN;
            let name = self.data[name_start..name_start + header.name_len as usize].to_vec();
            return Some(Ok(DirEntry {
                parent: self.parent,
                offset: offset as u32,
                inode: header.inode,
                rec_len: header.rec_len,
                name_len: header.name_len,
                file_type: header.file_type,
                name,
            }));
        }

        None
    }
}
