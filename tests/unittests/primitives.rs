// The primitive table as the parser sees it.

use qlogo_compiler::primitives::{self, DataOp};
use qlogo_compiler::{Generator, RequestType};

#[test]
fn test_aliases_share_generators() {
    let pairs = [
        ("pr", "print"),
        ("fd", "forward"),
        ("bf", "butfirst"),
        ("se", "sentence"),
        ("op", "output"),
        ("lessp", "less?"),
    ];
    for (alias, name) in pairs {
        let a = primitives::lookup(alias).unwrap();
        let b = primitives::lookup(name).unwrap();
        assert_eq!(a.generator, b.generator, "{} vs {}", alias, name);
    }
}

#[test]
fn test_return_kinds() {
    let returns = |name: &str| primitives::lookup(name).unwrap().returns;
    assert_eq!(returns("sum"), RequestType::REAL);
    assert_eq!(returns("lessp"), RequestType::BOOL);
    assert_eq!(returns("print"), RequestType::NOTHING);
    assert_eq!(returns("if"), RequestType::DATUM_OR_NOTHING);
    assert_eq!(returns("first"), RequestType::DATUM);
}

#[test]
fn test_node_keeps_spelling() {
    let node = primitives::node("Sum", vec![]).unwrap();
    let ast = node.as_node().unwrap();
    assert_eq!(ast.name().print(), "Sum");
    assert_eq!(ast.key(), "SUM");
    assert_eq!(ast.generator(), Generator::Sum);
    assert!(primitives::node("nosuch", vec![]).is_none());
}

#[test]
fn test_data_ops() {
    assert_eq!(
        primitives::lookup("member?").unwrap().generator,
        Generator::Data(DataOp::MemberP)
    );
    assert_eq!(primitives::lookup("thing").unwrap().generator, Generator::Data(DataOp::Thing));
}

#[test]
fn test_input_bounds() {
    let repeat = primitives::lookup("repeat").unwrap();
    assert_eq!((repeat.min_inputs, repeat.max_inputs), (2, Some(2)));
    let throw = primitives::lookup("throw").unwrap();
    assert_eq!((throw.min_inputs, throw.default_inputs, throw.max_inputs), (1, 1, Some(2)));
    let list = primitives::lookup("list").unwrap();
    assert_eq!(list.max_inputs, None);
}
