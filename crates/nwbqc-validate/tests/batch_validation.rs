//! Many converted files on a worker pool.

mod common;

use std::path::PathBuf;
use std::sync::Mutex;

use common::{ARCHIVE, Dirs, FILE_ID};
use nwbqc_core::CoreError;
use nwbqc_validate::{
    ArchiveLocator, IgorReader, MemoryContainer, MemoryOpener, QcSession, Stage, ValidateError,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn session(dirs: &Dirs, opener: MemoryOpener) -> QcSession<MemoryOpener, IgorReader> {
    QcSession {
        opener,
        reader: IgorReader,
        archives: ArchiveLocator::new(dirs.igor(), None),
        scratch_root: dirs.scratch(),
    }
}

#[rstest]
#[case::single_thread(1)]
#[case::all_cores(0)]
fn failing_file_does_not_stop_siblings(#[case] jobs: usize) {
    let dirs = Dirs::new();
    common::standard_archive(&dirs.igor());
    let good_a = dirs.nwb("a.nwb");
    let good_b = dirs.nwb("b.nwb");
    let broken = dirs.nwb("broken.nwb");
    let opener = MemoryOpener::new()
        .with(&good_a, MemoryContainer::new("file-a").with_dataset(
            nwbqc_core::Category::Acquisition,
            common::sweep(2000.0),
            Some("Stim: IDdepol".into()),
        ))
        .with(&good_b, common::standard_container(1000.0))
        .with(&broken, common::standard_container(2000.0).without_identifier());

    let outcome = session(&dirs, opener)
        .validate_batch(&[good_a, good_b, broken.clone()], jobs, |_| {})
        .unwrap();

    assert_eq!(outcome.results.len(), 2);
    assert!(outcome.results.get("file-a").unwrap().all_passed());
    assert!(!outcome.results.get(FILE_ID).unwrap().all_passed());
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].path, broken);
    assert_eq!(outcome.failures[0].stage, Stage::Connect);
    assert!(!outcome.is_complete());
    assert!(dirs.scratch_is_empty());
}

#[test]
fn duplicate_identifiers_keep_the_first_result() {
    let dirs = Dirs::new();
    common::standard_archive(&dirs.igor());
    let first = dirs.nwb("first.nwb");
    let second = dirs.nwb("second.nwb");
    let opener = MemoryOpener::new()
        .with(&first, common::standard_container(2000.0))
        .with(&second, common::standard_container(1000.0));

    let outcome = session(&dirs, opener)
        .validate_batch(&[first, second.clone()], 1, |_| {})
        .unwrap();

    assert_eq!(outcome.results.len(), 1);
    assert!(outcome.results.get(FILE_ID).unwrap().all_passed());
    let failure = &outcome.failures[0];
    assert_eq!(failure.path, second);
    assert_eq!(failure.stage, Stage::Merge);
    assert!(matches!(
        failure.source,
        ValidateError::Core(CoreError::DuplicateIdentifier(ref id)) if id == FILE_ID
    ));
}

#[rstest]
#[case::two_workers(2)]
#[case::all_cores(0)]
fn shared_identifier_never_shares_an_extraction(#[case] jobs: usize) {
    let dirs = Dirs::new();
    common::standard_archive(&dirs.igor());
    let paths: Vec<PathBuf> = (0..8).map(|i| dirs.nwb(&format!("copy-{i}.nwb"))).collect();
    let opener = paths.iter().fold(MemoryOpener::new(), |opener, path| {
        opener.with(path, common::standard_container(2000.0))
    });

    let outcome = session(&dirs, opener).validate_batch(&paths, jobs, |_| {}).unwrap();

    assert_eq!(outcome.results.len(), 1);
    assert!(outcome.results.get(FILE_ID).unwrap().all_passed());
    assert_eq!(outcome.failures.len(), paths.len() - 1);
    for failure in &outcome.failures {
        assert_eq!(failure.file_id.as_deref(), Some(FILE_ID));
        match failure.stage {
            Stage::Extract => {
                assert!(matches!(failure.source, ValidateError::ScratchInUse { .. }));
            }
            Stage::Merge => assert!(matches!(
                failure.source,
                ValidateError::Core(CoreError::DuplicateIdentifier(_))
            )),
            other => panic!("unexpected failure at {other}: {}", failure.source),
        }
    }
    assert!(dirs.scratch_is_empty());
}

#[test]
fn progress_callback_sees_every_file() {
    let dirs = Dirs::new();
    common::write_archive(
        &dirs.igor(),
        &format!("{ARCHIVE}.tar"),
        &[(
            format!("{ARCHIVE}/{}.ibw", common::SWEEP),
            common::ibw(common::SWEEP, 0.0005, &common::SIGNAL, "Stim: IDdepol"),
        )],
        false,
    );
    let paths: Vec<PathBuf> = (0..4).map(|i| dirs.nwb(&format!("f{i}.nwb"))).collect();
    let opener = paths.iter().enumerate().fold(MemoryOpener::new(), |opener, (i, path)| {
        opener.with(
            path,
            MemoryContainer::new(format!("file-{i}")).with_dataset(
                nwbqc_core::Category::Acquisition,
                common::sweep(2000.0),
                Some("Stim: IDdepol".into()),
            ),
        )
    });
    let seen = Mutex::new(Vec::new());

    let outcome = session(&dirs, opener)
        .validate_batch(&paths, 2, |path| seen.lock().unwrap().push(path.to_path_buf()))
        .unwrap();

    let mut seen = seen.into_inner().unwrap();
    seen.sort();
    assert_eq!(seen, paths);
    assert_eq!(outcome.results.len(), 4);
    assert!(outcome.is_complete());
}

#[test]
fn validate_file_reports_unknown_path() {
    let dirs = Dirs::new();
    let path = dirs.nwb("missing.nwb");

    let error = session(&dirs, MemoryOpener::new())
        .validate_file(&path)
        .unwrap_err();

    assert_eq!(error.stage, Stage::Connect);
    assert!(matches!(error.source, ValidateError::ContainerOpen { .. }));
}
