use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        TileError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        TileError::precondition("x")
            .to_string()
            .contains("precondition failed:")
    );
    assert!(
        TileError::resource_guard("x")
            .to_string()
            .contains("resource limit exceeded:")
    );
    assert!(
        TileError::ExportInProgress
            .to_string()
            .contains("already in progress")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = TileError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
    assert!(!err.is_guard());
}

#[test]
fn guard_classification() {
    assert!(TileError::resource_guard("tiles").is_guard());
    assert!(TileError::precondition("no image").is_guard());
    assert!(!TileError::validation("zero").is_guard());
}
