//! Shared fixture builders for integration tests.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::io::Cursor;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use flate2::Compression;
use flate2::write::GzEncoder;
use zip::write::SimpleFileOptions;

/// Archive flavours the fixtures can produce.
#[derive(Debug, Clone, Copy)]
pub enum Kind {
    Zip,
    SevenZip,
    Tar,
    TarGz,
}

impl Kind {
    pub const ALL: [Self; 4] = [Self::Zip, Self::SevenZip, Self::Tar, Self::TarGz];

    pub fn file_name(self, stem: &str) -> String {
        match self {
            Self::Zip => format!("{stem}.zip"),
            Self::SevenZip => format!("{stem}.7z"),
            Self::Tar => format!("{stem}.tar"),
            Self::TarGz => format!("{stem}.tgz"),
        }
    }

    /// Builds an archive holding `entries`. Names ending in `/` are
    /// directories. Names are stored verbatim, `..` and absolute paths
    /// included.
    pub fn build(self, entries: &[(&str, &[u8])]) -> Vec<u8> {
        match self {
            Self::Zip => zip_bytes(entries),
            Self::SevenZip => sevenz_bytes(entries),
            Self::Tar => tar_bytes(entries),
            Self::TarGz => gzip(&tar_bytes(entries)),
        }
    }

    /// Writes the archive into `dir` and returns its path.
    pub fn write(self, dir: &Path, stem: &str, entries: &[(&str, &[u8])]) -> PathBuf {
        let path = dir.join(self.file_name(stem));
        std::fs::write(&path, self.build(entries)).expect("failed to write archive");
        path
    }
}

pub fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().unix_permissions(0o644);

    for (name, data) in entries {
        if name.ends_with('/') {
            zip.add_directory(*name, options).unwrap();
        } else {
            zip.start_file(*name, options).unwrap();
            zip.write_all(data).unwrap();
        }
    }

    zip.finish().unwrap().into_inner()
}

pub fn tar_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());

    for (name, data) in entries {
        let mut header = tar::Header::new_gnu();
        let field = &mut header.as_old_mut().name;
        field[..name.len()].copy_from_slice(name.as_bytes());
        if name.ends_with('/') {
            header.set_entry_type(tar::EntryType::Directory);
            header.set_mode(0o755);
            header.set_size(0);
        } else {
            header.set_entry_type(tar::EntryType::Regular);
            header.set_mode(0o644);
            header.set_size(data.len() as u64);
        }
        header.set_cksum();
        builder.append(&header, *data).unwrap();
    }

    builder.into_inner().unwrap()
}

pub fn sevenz_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = sevenz_rust2::ArchiveWriter::new(Cursor::new(Vec::new())).unwrap();

    for (name, data) in entries {
        if let Some(dir) = name.strip_suffix('/') {
            writer
                .push_archive_entry::<&[u8]>(sevenz_rust2::ArchiveEntry::new_directory(dir), None)
                .unwrap();
        } else {
            writer
                .push_archive_entry(sevenz_rust2::ArchiveEntry::new_file(name), Some(*data))
                .unwrap();
        }
    }

    writer.finish().unwrap().into_inner()
}

pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Lists every file under `root` as `(relative path, contents)`, sorted.
pub fn snapshot(root: &Path) -> Vec<(String, Vec<u8>)> {
    let mut files: Vec<(String, Vec<u8>)> = walkdir::WalkDir::new(root)
        .into_iter()
        .map(|e| e.unwrap())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let relative = e.path().strip_prefix(root).unwrap();
            let name = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/");
            (name, std::fs::read(e.path()).unwrap())
        })
        .collect();
    files.sort();
    files
}
