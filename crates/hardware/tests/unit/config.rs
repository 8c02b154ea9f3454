//! Configuration parsing and validation.

use std::io::Write;

use pretty_assertions::assert_eq;
use rstest::rstest;

use rvsmp_core::common::error::{ConfigError, SimError};
use rvsmp_core::config::{Config, LogCategories, OrderingModel, parse_u32};

#[test]
fn empty_object_takes_defaults() {
    let config = Config::from_json("{}").unwrap();
    assert_eq!(config.system.cores, 1);
    assert_eq!(config.system.mem_kb, 8);
    assert_eq!(config.system.ordering, OrderingModel::NoBuffer);
    assert_eq!(config.run.tohost, None);
    assert_eq!(config.run.pass_value, 1);
    assert!(!config.trace.log.any());
}

#[rstest]
#[case("no-buffer", OrderingModel::NoBuffer)]
#[case("buffered-strict", OrderingModel::BufferedStrict)]
#[case("buffered-bypass", OrderingModel::BufferedBypass)]
#[case("buffered-fence-nop", OrderingModel::BufferedFenceNop)]
fn ordering_names_parse(#[case] name: &str, #[case] model: OrderingModel) {
    let json = format!(r#"{{ "system": {{ "ordering": "{name}" }} }}"#);
    assert_eq!(Config::from_json(&json).unwrap().system.ordering, model);
}

#[test]
fn unknown_ordering_is_a_json_error() {
    let err = Config::from_json(r#"{ "system": { "ordering": "tso" } }"#).unwrap_err();
    assert!(matches!(err, ConfigError::Json(_)), "{err:?}");
}

#[test]
fn validation_rejects_bad_geometry() {
    assert_eq!(
        Config::from_json(r#"{ "system": { "mem_kb": 12 } }"#).unwrap_err(),
        ConfigError::MemorySize(12)
    );
    assert_eq!(
        Config::from_json(r#"{ "system": { "cores": 0 } }"#).unwrap_err(),
        ConfigError::NoCores
    );
}

#[test]
fn log_categories_parse() {
    let cats: LogCategories = "reg,trap".parse().unwrap();
    assert!(cats.reg && cats.trap && !cats.mem);
    assert_eq!("all".parse::<LogCategories>(), Ok(LogCategories::ALL));
    assert_eq!(
        "reg,bogus".parse::<LogCategories>(),
        Err(ConfigError::UnknownLogCategory("bogus".into()))
    );
    assert!(!"".parse::<LogCategories>().unwrap().any());
}

#[rstest]
#[case("0x1000", 0x1000)]
#[case("0X10", 0x10)]
#[case("4096", 4096)]
#[case("0o17", 0o17)]
#[case("0xdead_beef", 0xDEAD_BEEF)]
fn numbers_parse(#[case] text: &str, #[case] value: u32) {
    assert_eq!(parse_u32(text), Ok(value));
}

#[test]
fn out_of_range_number_is_rejected() {
    assert_eq!(
        parse_u32("0x1_0000_0000"),
        Err(ConfigError::InvalidNumber("0x1_0000_0000".into()))
    );
}

#[test]
fn config_file_is_read() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{ "system": {{ "cores": 3 }}, "run": {{ "tohost": 256, "max_cycles": 42 }} }}"#
    )
    .unwrap();
    let config = Config::from_file(file.path()).unwrap();
    assert_eq!(config.system.cores, 3);
    assert_eq!(config.run.tohost, Some(256));
    assert_eq!(config.run.max_cycles, 42);
}

#[test]
fn missing_config_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::from_file(&dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, SimError::Io { .. }), "{err:?}");
}
