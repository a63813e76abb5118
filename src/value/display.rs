use super::{Datum, DatumP};

const MAX_DEPTH: usize = 64;

/// Print form: a top-level list prints without brackets.
pub fn print_form(value: &DatumP) -> String {
    let mut out = String::new();
    match value.datum() {
        Datum::List(list) => write_items(&mut out, list.iter(), 0),
        _ => write_value(&mut out, value, 0),
    }
    out
}

/// Show form: lists keep their brackets.
pub fn show_form(value: &DatumP) -> String {
    let mut out = String::new();
    write_value(&mut out, value, 0);
    out
}

fn write_items(out: &mut String, items: impl Iterator<Item = DatumP>, depth: usize) {
    for (i, item) in items.enumerate() {
        if i > 0 {
            out.push(' ');
        }
        write_value(out, &item, depth + 1);
    }
}

fn write_value(out: &mut String, value: &DatumP, depth: usize) {
    if depth > MAX_DEPTH {
        out.push_str("...");
        return;
    }
    match value.datum() {
        Datum::Word(w) => out.push_str(w.text()),
        Datum::List(list) => {
            out.push('[');
            write_items(out, list.iter(), depth);
            out.push(']');
        }
        Datum::Array(array) => {
            out.push('{');
            write_items(out, array.to_vec().into_iter(), depth);
            out.push('}');
            if array.origin() != 1 {
                out.push('@');
                out.push_str(&array.origin().to_string());
            }
        }
        Datum::AstNode(node) => out.push_str(&print_form(node.name())),
        Datum::Procedure(p) => out.push_str(p.name()),
        Datum::Error(e) => out.push_str(&print_form(&e.message)),
        Datum::Goto(_) | Datum::Continuation(_) | Datum::Return(_) | Datum::Nothing => {}
    }
}
