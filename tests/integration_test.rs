use svcmap::error::{Result, SvcmapError};

#[test]
fn test_error_types() {
    let err = SvcmapError::ClusterQuery(
        "List nodes is not permitted at the cluster scope".to_string(),
    );
    assert!(err
        .to_string()
        .starts_with("could not collect the service map for all nodes"));

    let err = SvcmapError::ClientConnect("no kubeconfig".to_string());
    assert!(err.to_string().contains("no kubeconfig"));
}

#[test]
fn test_encoding_error_converts() {
    fn parse(raw: &str) -> Result<Vec<String>> {
        Ok(serde_json::from_str(raw)?)
    }

    assert!(matches!(parse("{"), Err(SvcmapError::Encoding(_))));
}

#[test]
fn test_version_const() {
    assert!(!svcmap::VERSION.is_empty());
}
