//! Unit tests for target resolution

use softbackup::utils::{Connection, TargetRegistry};
use test_utils::{alpha_beta_config, ConfigBuilder, DatabaseTarget, ServerDatabase};

#[test]
fn test_registry_resolves_configured_servers() {
    let config = alpha_beta_config().build();
    let registry = TargetRegistry::build(&config.servers);

    assert_eq!(registry.len(), 2);
    assert_eq!(registry.resolve("alpha").unwrap().port, 3306);
    assert_eq!(registry.resolve("beta").unwrap().port, 3307);
    assert!(registry.resolve("gamma").is_none());
}

#[test]
fn test_duplicate_server_last_definition_wins() {
    let config = ConfigBuilder::new()
        .add_server("alpha", "10.0.0.1", 3306, None)
        .add_server("alpha", "10.0.0.99", 3310, None)
        .build();
    let registry = TargetRegistry::build(&config.servers);

    assert_eq!(registry.len(), 1);
    let server = registry.resolve("alpha").unwrap();
    assert_eq!(server.address, "10.0.0.99");
    assert_eq!(server.port, 3310);
}

#[test]
fn test_connection_for_both_target_shapes() {
    let config = alpha_beta_config()
        .add_inline_database(None, "10.0.0.9", 3306, None, "crm")
        .build();
    let registry = TargetRegistry::build(&config.servers);

    let beta = registry.connection_for(&config.databases[1]).unwrap();
    assert!(matches!(beta, Connection::Server(_)));
    assert_eq!(beta.server_name(), "beta");
    assert_eq!(beta.address(), "10.0.0.2");
    assert!(beta.encrypted_password().is_some());

    let inline = registry.connection_for(&config.databases[2]).unwrap();
    assert!(matches!(inline, Connection::Inline(_)));
    // No name given, the address stands in
    assert_eq!(inline.server_name(), "10.0.0.9");
    assert_eq!(inline.encrypted_password(), None);
}

#[test]
fn test_unknown_server_has_no_connection() {
    let registry = TargetRegistry::build(&[]);
    let target = DatabaseTarget::Server(ServerDatabase {
        server: "ghost".to_string(),
        database: "x".to_string(),
    });

    assert!(registry.is_empty());
    assert!(registry.connection_for(&target).is_none());
}
