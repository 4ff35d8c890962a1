use proptest::prelude::*;
use voidshell::{evaluate, parse_value, recall_next, recall_previous, Outcome, Session, Variables};

fn identifier() -> impl Strategy<Value = String> {
    "[a-z_][a-z0-9_]{0,8}".prop_filter("not a command", |name| {
        !matches!(name.as_str(), "vars" | "clear" | "help")
    })
}

fn value_text() -> impl Strategy<Value = String> {
    prop_oneof![
        any::<i32>().prop_map(|i| i.to_string()),
        (0u32..10_000, 1u32..1000).prop_map(|(a, b)| format!("{}.{}", a, b)),
        "[a-zA-Z ]{0,12}".prop_map(|s| format!("'{}'", s)),
        "[a-zA-Z]{1,12}".prop_map(|s| format!("\"{}\"", s)),
        Just("True".to_string()),
        Just("False".to_string()),
    ]
}

proptest! {
    #[test]
    fn assigned_values_read_back_formatted(name in identifier(), value in value_text()) {
        let mut session = Session::new();
        session.submit(&format!("{} = {}", name, value));

        let expected = parse_value(&value).to_repr();
        for _ in 0..2 {
            let outcome = session.submit(&name);
            prop_assert_eq!(outcome, Outcome::Output { text: expected.clone() });
        }
    }

    #[test]
    fn integer_sums_match(a in -1_000_000i64..1_000_000, b in -1_000_000i64..1_000_000) {
        let outcome = evaluate(&format!("{} + {}", a, b), &Variables::new());
        prop_assert_eq!(outcome, Outcome::Output { text: (a + b).to_string() });
    }

    #[test]
    fn recall_never_leaves_bounds(
        commands in prop::collection::vec("[a-z]{1,5}", 0..6),
        moves in prop::collection::vec(any::<bool>(), 0..20),
    ) {
        let mut cursor = None;
        for up in moves {
            let (next, text) = if up {
                recall_previous(cursor, &commands)
            } else {
                recall_next(cursor, &commands)
            };
            if let Some(i) = next {
                prop_assert!(i < commands.len());
                prop_assert_eq!(text.as_deref(), Some(commands[i].as_str()));
            }
            cursor = next;
        }
    }

    #[test]
    fn interpreter_never_panics(line in "[ -~]{0,40}") {
        let _ = evaluate(&line, &Variables::new());
    }
}
