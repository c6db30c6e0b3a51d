use crate::structs::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    File,
    Directory,
    Symlink,
    Other,
}

impl FileType {
    pub fn from_mode(mode: u16) -> Self {
        // The symlink format (0xA000) shares its top bit with regular files.
        match mode & S_IFMT {
            S_IFLNK => FileType::Symlink,
            S_IFDIR => FileType::Directory,
            S_IFREG => FileType::File,
            _ => FileType::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InodeRecord {
    pub number: u32,
    pub file_type: FileType,
    pub mode: u16,
    pub uid: u32,
    pub gid: u32,
    pub links_count: u16,
    pub ctime: u32,
    pub mtime: u32,
    pub atime: u32,
    pub size: u64,
    /// Allocated size in 512-byte sectors.
    pub blocks: u32,
    pub block: [u32; EXT2_N_BLOCKS],
}

impl InodeRecord {
    /// Decodes an inode table slot, or `None` if the inode is not in use.
    pub fn decode(number: u32, raw: &Inode) -> Option<Self> {
        if raw.i_mode == 0 || raw.i_links_count == 0 {
            return None;
        }

        let file_type = FileType::from_mode(raw.i_mode);
        let size = match file_type {
            FileType::File => ((raw.i_dir_acl as u64) << 32) | raw.i_size as u64,
            _ => raw.i_size as u64,
        };

        Some(Self {
            number,
            file_type,
            mode: raw.i_mode,
            uid: ((raw.l_i_uid_high as u32) << 16) | raw.i_uid as u32,
            gid: ((raw.l_i_gid_high as u32) << 16) | raw.i_gid as u32,
            links_count: raw.i_links_count,
            ctime: raw.i_ctime,
            mtime: raw.i_mtime,
            atime: raw.i_atime,
            size,
            blocks: raw.i_blocks,
            block: raw.i_block,
        })
    }

    /// Permission bits: the low 12 bits of the mode.
    pub fn permissions(&self) -> u16 {
        self.mode & 0o7777
    }

    pub fn is_dir(&self) -> bool {
        self.file_type == FileType::Directory
    }

    /// Fast symlinks keep their target inside `i_block` instead of pointing at data blocks.
    pub fn has_inline_data(&self) -> bool {
        self.file_type == FileType::Symlink && self.blocks == 0
    }

    pub fn direct_blocks(&self) -> &[u32] {
        &self.block[..EXT2_NDIR_BLOCKS]
    }
}
