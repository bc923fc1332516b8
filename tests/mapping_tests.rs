// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for descriptor-driven mapping.

use std::sync::Arc;
use treecfg::prelude::*;

mod common;

fn map(entries: &[(&str, &str)]) -> Arc<MapSource> {
    common::init_tracing();
    let mut source = MapSource::new("mem");
    for &(k, v) in entries {
        source = source.with_entry(k, v);
    }
    Arc::new(source)
}

fn server_descriptor() -> MappingDescriptor {
    MappingDescriptor::new("Server")
        .with_member(Member::new("host", Shape::scalar::<String>()))
        .with_member(Member::new("port", Shape::scalar::<u16>()).with_default("8080"))
}

#[test]
fn test_bind_server_example() {
    let config = Config::builder()
        .with_source(map(&[("server.host", "localhost"), ("server.port", "7001")]))
        .build()
        .unwrap();

    let server = config.get("server").bind(&server_descriptor()).unwrap();
    let host = server.member("host").unwrap().scalar().unwrap();
    let port = server.member("port").unwrap().scalar().unwrap();
    assert_eq!(host.get::<String>().unwrap(), "localhost");
    assert_eq!(*port.get::<u16>().unwrap(), 7001);
}

#[test]
fn test_bind_default_applies_when_unconfigured() {
    let config = Config::builder()
        .with_source(map(&[("server.host", "localhost")]))
        .build()
        .unwrap();

    let server = config.get("server").bind(&server_descriptor()).unwrap();
    let port = server.member("port").unwrap().scalar().unwrap();
    assert_eq!(*port.get::<u16>().unwrap(), 8080);
    assert_eq!(port.raw(), "8080");
}

#[test]
fn test_bind_missing_paths_named_fully_qualified() {
    let descriptor = MappingDescriptor::new("Client")
        .with_member(Member::new("endpoint", Shape::scalar::<String>()))
        .with_member(Member::new("timeoutMs", Shape::scalar::<u64>()));
    let config = Config::builder().with_source(map(&[])).build().unwrap();

    let err = config.get("other").bind(&descriptor).unwrap_err();
    match err {
        ConfigError::Mapping { missing } => {
            assert_eq!(missing, vec!["other.endpoint", "other.timeout-ms"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_bind_nested_groups_and_optionals() {
    let tls = MappingDescriptor::new("Tls")
        .with_member(Member::new("certPath", Shape::scalar::<std::path::PathBuf>()));
    let descriptor = MappingDescriptor::new("Server")
        .with_member(Member::new("host", Shape::scalar::<String>()))
        .with_member(Member::new("tls", Shape::optional(Shape::group(tls))));

    // Optional group absent: its required members do not surface as missing.
    let config = Config::builder()
        .with_source(map(&[("server.host", "h")]))
        .build()
        .unwrap();
    let bound = config.get("server").bind(&descriptor).unwrap();
    assert!(bound.member("tls").unwrap().is_absent());

    // Optional group present: it binds fully.
    let config = Config::builder()
        .with_source(map(&[("server.host", "h"), ("server.tls.cert-path", "/etc/cert.pem")]))
        .build()
        .unwrap();
    let bound = config.get("server").bind(&descriptor).unwrap();
    let cert = bound
        .member("tls")
        .unwrap()
        .member("certPath")
        .unwrap()
        .scalar()
        .unwrap();
    assert_eq!(
        cert.get::<std::path::PathBuf>().unwrap().to_str(),
        Some("/etc/cert.pem")
    );
}

#[test]
fn test_bind_lists_sets_and_maps() {
    let descriptor = MappingDescriptor::new("App")
        .with_member(Member::new("hosts", Shape::list(Shape::scalar::<String>())))
        .with_member(Member::new("ports", Shape::set(Shape::scalar::<u16>())))
        .with_member(Member::new("labels", Shape::map(Shape::scalar::<String>())));
    let config = Config::builder()
        .with_source(map(&[
            ("app.hosts.0", "alpha"),
            ("app.hosts.1", "beta"),
            ("app.ports.0", "80"),
            ("app.ports.1", "443"),
            ("app.ports.2", "80"),
            ("app.labels.env", "prod"),
            ("app.labels.tier", "web"),
        ]))
        .build()
        .unwrap();

    let bound = config.get("app").bind(&descriptor).unwrap();

    let hosts = bound.member("hosts").unwrap().list().unwrap();
    assert_eq!(hosts.len(), 2);
    assert_eq!(hosts[0].scalar().unwrap().raw(), "alpha");

    // Duplicate port collapses.
    let ports = bound.member("ports").unwrap().list().unwrap();
    assert_eq!(ports.len(), 2);

    let labels = bound.member("labels").unwrap().map().unwrap();
    assert_eq!(labels.len(), 2);
    assert_eq!(labels["env"].scalar().unwrap().raw(), "prod");
}

#[test]
fn test_binding_is_idempotent() {
    let tls = MappingDescriptor::new("Tls")
        .with_member(Member::new("certPath", Shape::scalar::<String>()));
    let descriptor = MappingDescriptor::new("Server")
        .with_member(Member::new("host", Shape::scalar::<String>()))
        .with_member(Member::new("port", Shape::scalar::<u16>()).with_default("8080"))
        .with_member(Member::new("tls", Shape::optional(Shape::group(tls))))
        .with_member(Member::new("aliases", Shape::list(Shape::scalar::<String>())))
        .with_member(Member::new("labels", Shape::map(Shape::scalar::<String>())));
    let config = Config::builder()
        .with_source(map(&[
            ("server.host", "localhost"),
            ("server.tls.cert-path", "/etc/cert.pem"),
            ("server.aliases.0", "a"),
            ("server.aliases.1", "b"),
            ("server.labels.env", "prod"),
        ]))
        .build()
        .unwrap();

    let node = config.get("server");
    let first = node.bind(&descriptor).unwrap();
    let second = node.bind(&descriptor).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_bind_uses_registered_converter() {
    #[derive(Debug, PartialEq)]
    struct LogLevel(String);

    let descriptor = MappingDescriptor::new("App")
        .with_member(Member::new("logLevel", Shape::scalar::<LogLevel>()));
    let config = Config::builder()
        .with_source(map(&[("app.log-level", "DEBUG")]))
        .with_str_converter::<LogLevel, _>(0, |raw: &str| Ok(LogLevel(raw.to_lowercase())))
        .build()
        .unwrap();

    let bound = config.get("app").bind(&descriptor).unwrap();
    let level = bound.member("logLevel").unwrap().scalar().unwrap();
    assert_eq!(level.get::<LogLevel>().unwrap().0, "debug");
}

#[test]
fn test_bind_respects_precedence_and_placeholders() {
    let config = Config::builder()
        .with_source_ordinal(
            map(&[("server.host", "fallback"), ("app.host", "${server.host}")]),
            10,
        )
        .with_source_ordinal(map(&[("server.host", "primary")]), 500)
        .build()
        .unwrap();

    let descriptor =
        MappingDescriptor::new("App").with_member(Member::new("host", Shape::scalar::<String>()));
    let bound = config.get("app").bind(&descriptor).unwrap();
    assert_eq!(
        bound.member("host").unwrap().scalar().unwrap().get::<String>().unwrap(),
        "primary"
    );
}
