use std::io::Write;
use std::process::Command;

use bytemuck::{Pod, Zeroable};
use ext2::Image;
use ext2::structs::{BlockGroupDescriptor, DirEntryHeader, EXT2_SUPER_MAGIC, Inode, Superblock};
use tempfile::NamedTempFile;

const BLOCK: usize = 1024;

fn put<T: Pod>(image: &mut [u8], offset: usize, value: &T) {
    let bytes = bytemuck::bytes_of(value);
    image[offset..offset + bytes.len()].copy_from_slice(bytes);
}

fn dirent(image: &mut [u8], block: usize, offset: usize, inode: u32, rec_len: u16, name: &[u8]) {
    let start = block * BLOCK + offset;
    let header = DirEntryHeader {
        inode,
        rec_len,
        name_len: name.len() as u8,
        file_type: 2,
    };
    put(image, start, &header);
    image[start + 8..start + 8 + name.len()].copy_from_slice(name);
}

/// 64 blocks of 1 KiB in one group: superblock at 1, group table at 2,
/// bitmaps at 3 and 4, inode table at 5..=8, root directory data at 9.
fn crafted_image() -> Vec<u8> {
    let mut image = vec![0u8; 65 * BLOCK];

    let sb = Superblock {
        s_inodes_count: 32,
        s_blocks_count: 64,
        s_blocks_per_group: 8192,
        s_inodes_per_group: 32,
        s_magic: EXT2_SUPER_MAGIC,
        s_rev_level: 1,
        s_first_ino: 11,
        s_inode_size: 128,
        ..Superblock::zeroed()
    };
    put(&mut image, 1024, &sb);

    let group = BlockGroupDescriptor {
        bg_block_bitmap: 3,
        bg_inode_bitmap: 4,
        bg_inode_table: 5,
        bg_free_blocks_count: 55,
        bg_free_inodes_count: 21,
        ..BlockGroupDescriptor::zeroed()
    };
    put(&mut image, 2 * BLOCK, &group);

    image[3 * BLOCK] = 0xFF;
    image[3 * BLOCK + 1] = 0x01;
    image[4 * BLOCK] = 0xFF;
    image[4 * BLOCK + 1] = 0x07;

    let mut root = Inode::zeroed();
    root.i_mode = 0o040755;
    root.i_links_count = 2;
    root.i_size = 1024;
    root.i_blocks = 2;
    root.i_block[0] = 9;
    put(&mut image, 5 * BLOCK + 128, &root);

    dirent(&mut image, 9, 0, 2, 12, b".");
    dirent(&mut image, 9, 12, 2, 1012, b"..");
    image
}

fn write_image(bytes: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(bytes).unwrap();
    file.flush().unwrap();
    file
}

fn dump_to_string(bytes: &[u8]) -> String {
    let file = write_image(bytes);
    let mut out = Vec::new();
    ext2dump::dump(Image::open(file.path()).unwrap(), &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn crafted_image_round_trip() {
    let mut expected = vec![
        "SUPERBLOCK,64,32,1024,128,8192,32,11".to_string(),
        "GROUP,0,64,32,55,21,3,4,5".to_string(),
    ];
    expected.extend((10..=64).map(|b| format!("BFREE,{b}")));
    expected.extend((12..=32).map(|i| format!("IFREE,{i}")));
    expected.push(
        "INODE,2,d,755,0,0,2,01/01/70 00:00:00,01/01/70 00:00:00,01/01/70 00:00:00,1024,2,\
         9,0,0,0,0,0,0,0,0,0,0,0,0,0,0"
            .to_string(),
    );
    expected.push("DIRENT,2,0,2,12,1,'.'".to_string());
    expected.push("DIRENT,2,12,2,1012,2,'..'".to_string());

    let output = dump_to_string(&crafted_image());
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines, expected);
    assert!(!output.contains("INDIRECT"));
}

#[test]
fn indirect_directory_blocks_follow_their_pointer() {
    let mut image = crafted_image();
    // Root gains a single-indirect block at 20 pointing at directory data in 21.
    let root_slot = 5 * BLOCK + 128;
    let mut root: Inode = bytemuck::pod_read_unaligned(&image[root_slot..root_slot + 128]);
    root.i_block[12] = 20;
    put(&mut image, root_slot, &root);
    image[20 * BLOCK..20 * BLOCK + 4].copy_from_slice(&21u32.to_le_bytes());
    dirent(&mut image, 21, 0, 12, 1024, b"notes.txt");

    let output = dump_to_string(&image);
    let tail: Vec<&str> = output.lines().skip_while(|l| !l.starts_with("INODE")).collect();
    assert_eq!(
        tail[1..],
        [
            "DIRENT,2,0,2,12,1,'.'",
            "DIRENT,2,12,2,1012,2,'..'",
            "INDIRECT,2,1,12,20,21",
            "DIRENT,2,0,12,1024,9,'notes.txt'",
        ]
    );
}

#[test]
fn truncated_superblock_writes_nothing() {
    let file = write_image(&[0u8; 1500]);
    let mut out = Vec::new();
    let result = ext2dump::dump(Image::open(file.path()).unwrap(), &mut out);
    assert!(matches!(result, Err(ext2::Ext2Error::ImageTruncated { .. })));
    assert!(out.is_empty());
}

#[test]
fn usage_error_exit_code() {
    let output = Command::new(env!("CARGO_BIN_EXE_ext2dump")).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Usage"));
}

#[test]
fn missing_image_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_ext2dump"))
        .arg(dir.path().join("missing.img"))
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to open"));
}

#[test]
fn binary_prints_records() {
    let file = write_image(&crafted_image());
    let output = Command::new(env!("CARGO_BIN_EXE_ext2dump"))
        .arg(file.path())
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.lines().next(), Some("SUPERBLOCK,64,32,1024,128,8192,32,11"));
    assert_eq!(stdout.lines().count(), 2 + 55 + 21 + 1 + 2);
}
