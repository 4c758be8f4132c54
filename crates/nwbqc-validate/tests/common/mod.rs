//! Fixtures: IBW files, archives and converted files built in memory.

#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;
use nwbqc_core::{Category, RawString};
use nwbqc_igor::{ByteOrder, IgorHeader, IgorWave, NumberType};
use nwbqc_validate::{DatasetRecord, MemoryContainer};

pub const FILE_ID: &str = "170106_2A-BJM";
pub const ARCHIVE: &str = "170106_2A";
pub const SWEEP: &str = "ccs__IDdepol__42";
pub const SIGNAL: [f64; 4] = [-70.0, -69.5, 12.25, f64::NAN];

pub fn ibw(base_name: &str, dx: f64, data: &[f64], note: &str) -> Vec<u8> {
    IgorWave {
        header: IgorHeader {
            version: 5,
            byte_order: ByteOrder::Little,
            number_type: NumberType::F64,
            base_name: base_name.to_string(),
            npnts: data.len(),
            dx,
            x_start: 0.0,
            data_units: "mV".to_string(),
            x_units: "s".to_string(),
            note: note.as_bytes().to_vec(),
        },
        data: data.to_vec(),
    }
    .to_ibw5()
}

/// Write `<dir>/<name>` as a tar (or gzip-compressed tar) of `entries`.
pub fn write_archive(dir: &Path, name: &str, entries: &[(String, Vec<u8>)], gzip: bool) -> PathBuf {
    let mut builder = tar::Builder::new(Vec::new());
    for (path, data) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        builder.append_data(&mut header, path, data.as_slice()).unwrap();
    }
    let mut bytes = builder.into_inner().unwrap();
    if gzip {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&bytes).unwrap();
        bytes = encoder.finish().unwrap();
    }
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

/// The standard archive: one sweep at 2 kHz with a wave note.
pub fn standard_archive(igor_dir: &Path) -> PathBuf {
    write_archive(
        igor_dir,
        &format!("{ARCHIVE}.tgz"),
        &[(
            format!("{ARCHIVE}/{SWEEP}.ibw"),
            ibw(SWEEP, 0.0005, &SIGNAL, "Stim: IDdepol"),
        )],
        true,
    )
}

pub fn sweep(rate: f64) -> DatasetRecord {
    DatasetRecord::new(SWEEP, format!("/{ARCHIVE}/{SWEEP}.ibw"))
        .with_data(SIGNAL.to_vec())
        .with_rate(rate)
        .with_gain(1.0)
}

/// A converted file whose acquisition sweep matches the standard archive.
pub fn standard_container(rate: f64) -> MemoryContainer {
    MemoryContainer::new(FILE_ID).with_dataset(
        Category::Acquisition,
        sweep(rate),
        Some(RawString::from("Stim: IDdepol")),
    )
}

/// Scratch, converted-file and archive directories of one test.
pub struct Dirs {
    pub root: tempfile::TempDir,
}

impl Dirs {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        for sub in ["scratch", "nwb", "igor"] {
            std::fs::create_dir(root.path().join(sub)).unwrap();
        }
        Self { root }
    }

    pub fn scratch(&self) -> PathBuf {
        self.root.path().join("scratch")
    }

    pub fn nwb(&self, name: &str) -> PathBuf {
        self.root.path().join("nwb").join(name)
    }

    pub fn igor(&self) -> PathBuf {
        self.root.path().join("igor")
    }

    /// Whether the scratch root holds nothing.
    pub fn scratch_is_empty(&self) -> bool {
        std::fs::read_dir(self.scratch()).unwrap().next().is_none()
    }
}
