// Property tests for the value model.

use crate::common::*;
use proptest::prelude::*;
use qlogo_compiler::value::{arena, DatumKind};
use qlogo_compiler::{DatumP, List};

fn word_list(items: &[String]) -> DatumP {
    List::from_vec(items.iter().map(|w| DatumP::word(w)).collect())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn printed_numbers_read_back(x in -1.0e12f64..1.0e12) {
        let printed = DatumP::number(x).print();
        let word = DatumP::word(&printed);
        prop_assert_eq!(word.as_word().unwrap().number(), Some(x));
    }

    #[test]
    fn butfirst_shares_tail(items in prop::collection::vec("[a-z]{1,5}", 1..8)) {
        let (mut ev, _) = setup();
        let list = word_list(&items);
        ev.set_variable("l", list.clone());
        let tail = run(&mut ev, vec![vec![p("butfirst", vec![var("l")])]])
            .unwrap()
            .unwrap();
        let expected = list.as_list().unwrap().butfirst().unwrap();
        prop_assert!(tail.ptr_eq(&expected));
        prop_assert_eq!(tail.as_list().unwrap().len(), items.len() - 1);
    }

    #[test]
    fn dropped_lists_are_released(items in prop::collection::vec("[a-z]{1,5}", 0..16)) {
        let _ = DatumP::nothing();
        let before = arena::stats();
        let list = word_list(&items);
        let during = arena::stats();
        prop_assert_eq!(
            during.kind(DatumKind::List).live,
            before.kind(DatumKind::List).live + items.len() + 1
        );
        drop(list);
        let after = arena::stats();
        prop_assert_eq!(after.live(), before.live());
        prop_assert_eq!(after.acquired() - before.acquired(), after.released() - before.released());
    }

    #[test]
    fn count_matches_length(items in prop::collection::vec("[a-z]{1,5}", 0..16)) {
        let (mut ev, _) = setup();
        ev.set_variable("l", word_list(&items));
        let count = value(&mut ev, vec![p("count", vec![var("l")])]);
        prop_assert_eq!(count, items.len().to_string());
    }
}
