//! Integration tests for TOML and environment configuration loading.
//!
//! Uses figment::Jail for sandboxed env var and working-directory manipulation.

use figment::{
    Figment, Jail,
    providers::{Format, Serialized, Toml},
};
use nwbqc_config::{ConfigError, QcConfig};
use pretty_assertions::assert_eq;

#[test]
fn loads_paths_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[paths]
nwb_dir = "/data/nwb"
igor_dir = "/data/igor"
mapfile = "/data/map.csv"
scratch_dir = "/scratch/nwbqc"
"#,
        )?;

        let config: QcConfig = Figment::from(Serialized::defaults(QcConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.paths.nwb_dir, "/data/nwb");
        assert_eq!(config.paths.igor_dir, "/data/igor");
        assert_eq!(
            config.paths.mapfile().as_deref(),
            Some(std::path::Path::new("/data/map.csv"))
        );
        assert_eq!(config.paths.scratch_dir, "/scratch/nwbqc");
        assert_eq!(config.paths.output_dir, ".");
        Ok(())
    });
}

#[test]
fn loads_batch_and_report_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[batch]
jobs = 4
postfix = "BJM"

[report]
write_text = false
"#,
        )?;

        let config: QcConfig = Figment::from(Serialized::defaults(QcConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.batch.jobs, 4);
        assert_eq!(config.batch.postfix, "BJM");
        assert!(!config.report.write_text);
        Ok(())
    });
}

#[test]
fn project_file_is_picked_up_by_load() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "nwbqc.toml",
            r#"
[batch]
postfix = "local"
"#,
        )?;

        let config = QcConfig::load().expect("config loads");
        assert_eq!(config.batch.postfix, "local");
        Ok(())
    });
}

#[test]
fn env_beats_project_file() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "nwbqc.toml",
            r#"
[batch]
jobs = 2
"#,
        )?;
        jail.set_env("NWBQC_BATCH__JOBS", "8");
        jail.set_env("NWBQC_PATHS__SCRATCH_DIR", "/tmp/qc-scratch");

        let config = QcConfig::load().expect("config loads");
        assert_eq!(config.batch.jobs, 8);
        assert_eq!(config.paths.scratch_dir, "/tmp/qc-scratch");
        Ok(())
    });
}

#[test]
fn empty_scratch_dir_is_invalid() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "nwbqc.toml",
            r#"
[paths]
scratch_dir = ""
"#,
        )?;

        let err = QcConfig::load().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        Ok(())
    });
}
