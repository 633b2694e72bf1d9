use proptest::prelude::*;
use std::path::Path;
use unawait::{Helper, lower_source};

const ARGUMENT_NAMES: [&str; 5] = ["alpha", "beta", "gamma", "delta", "epsilon"];

fn parameter_name() -> impl Strategy<Value = String> {
    "[a-z]{1,6}".prop_map(|suffix| format!("p_{suffix}"))
}

proptest! {
    #[test]
    fn returned_await_never_allocates_a_continuation(name in parameter_name()) {
        let source = format!("async function f({name}) {{ return await {name}; }}");
        let unit = lower_source(&source, Path::new("prop.js")).expect("lowering should succeed");

        prop_assert_eq!(
            unit.code,
            format!("var f = __async(function({name}) {{\n    return {name};\n}});\n")
        );
        prop_assert!(!unit.helpers.contains(Helper::Await));
    }

    #[test]
    fn only_arguments_before_the_await_are_hoisted(
        (count, awaited) in (1usize..=5).prop_flat_map(|count| (Just(count), 0..count))
    ) {
        let arguments: Vec<String> = ARGUMENT_NAMES[..count]
            .iter()
            .enumerate()
            .map(|(index, name)| match index == awaited {
                true => "await pending".to_owned(),
                false => (*name).to_owned(),
            })
            .collect();
        let source = format!(
            "async function f() {{ return call({}); }}",
            arguments.join(", ")
        );

        let unit = lower_source(&source, Path::new("prop.js")).expect("lowering should succeed");
        let suspension = unit
            .code
            .find("__await(pending, function(_pending)")
            .expect("pending is awaited");

        prop_assert!(unit.code.contains("_call = call"));
        for (index, name) in ARGUMENT_NAMES[..count].iter().enumerate() {
            let hoisted = unit.code.find(&format!("_{name} = {name}"));
            if index < awaited {
                prop_assert!(hoisted.is_some_and(|position| position < suspension));
            } else {
                prop_assert!(hoisted.is_none());
            }
        }
    }

    #[test]
    fn arbitrary_input_never_panics(source in "[a-z0-9(){}\\[\\];,.=+*/<>!&|?: \"'\n-]{0,80}") {
        let _ = lower_source(&source, Path::new("fuzz.js"));
    }

    #[test]
    fn statements_after_awaits_keep_their_order(count in 1usize..6) {
        let body: Vec<String> = (0..count)
            .map(|index| format!("await step{}(); mark{}();", index, index))
            .collect();
        let source = format!("async function f() {{ {} }}", body.join(" "));

        let unit = lower_source(&source, Path::new("prop.js")).expect("lowering should succeed");

        let mut last = 0;
        for index in 0..count {
            let step = unit.code.find(&format!("step{index}()")).expect("step is kept");
            let mark = unit.code.find(&format!("mark{index}()")).expect("mark is kept");
            prop_assert!(last <= step && step < mark);
            last = mark;
        }
    }
}
