// Configuration parsing.

use qlogo_compiler::{BackendKind, CompileError, CompilerConfig};

#[test]
fn test_backend_names() {
    assert_eq!(BackendKind::parse("machine"), Some(BackendKind::Machine));
    assert_eq!(BackendKind::parse("Cranelift"), Some(BackendKind::Jit));
    assert_eq!(BackendKind::parse("JIT"), Some(BackendKind::Jit));
    assert_eq!(BackendKind::parse("llvm"), None);
}

#[test]
fn test_empty_object_is_default() {
    let config = CompilerConfig::from_json_str("{}").unwrap();
    assert_eq!(config, CompilerConfig::default());
}

#[test]
fn test_rejects_bad_input() {
    for text in [
        "[]",
        "not json",
        r#"{"backend": "llvm"}"#,
        r#"{"max_depth": 0}"#,
        r#"{"max_depth": -3}"#,
        r#"{"verify_ir": "yes"}"#,
        r#"{"colour": "blue"}"#,
    ] {
        match CompilerConfig::from_json_str(text) {
            Err(CompileError::Config(_)) => {}
            other => panic!("{} gave {:?}", text, other),
        }
    }
}

#[test]
fn test_error_message() {
    let err = CompilerConfig::from_json_str(r#"{"backend": "llvm"}"#).unwrap_err();
    assert!(err.to_string().starts_with("bad configuration: unknown backend"));
}
