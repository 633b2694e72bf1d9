use crate::compiler_frontend::ast::ast_nodes::{Expression, Literal, MemberProperty, Statement};
use crate::compiler_frontend::async_lowering::bindings::for_each_name;
use crate::compiler_frontend::tokenizer::tokenizer::is_identifier_char;
use rustc_hash::FxHashSet;

// Long member chains would otherwise produce unreadable temporaries
const MAX_BASE_LENGTH: usize = 20;

/// Hands out identifiers that collide with nothing in the unit.
/// Generated names look like `_base`, `_base2`, `_base3`, ...
#[derive(Debug, Default)]
pub struct NameGenerator {
    used: FxHashSet<String>,
}

impl NameGenerator {
    pub fn from_statements(statements: &[Statement]) -> Self {
        let mut used = FxHashSet::default();
        for_each_name(statements, &mut |name, _| {
            used.insert(name.to_owned());
        });

        NameGenerator { used }
    }

    pub fn generate(&mut self, base: &str) -> String {
        let base = sanitize_base(base);

        let mut candidate = format!("_{base}");
        let mut counter = 1;
        while self.used.contains(&candidate) {
            counter += 1;
            candidate = format!("_{base}{counter}");
        }

        self.used.insert(candidate.to_owned());
        candidate
    }

    /// Names a temporary after the expression it holds:
    /// `foo.bar()` gives `_foo$bar`, `this` gives `_this`, anything opaque gives `_ref`.
    pub fn generate_based_on(&mut self, expression: &Expression) -> String {
        let mut parts = Vec::new();
        gather_name_parts(expression, &mut parts);
        self.generate(&parts.join("$"))
    }
}

fn gather_name_parts(expression: &Expression, parts: &mut Vec<String>) {
    match expression {
        Expression::Identifier(name) => parts.push(name.to_owned()),
        Expression::This => parts.push("this".to_owned()),
        Expression::Literal(Literal::String(value)) => parts.push(value.to_owned()),
        Expression::Member { object, property } => {
            gather_name_parts(object, parts);
            match property {
                MemberProperty::Named(name) => parts.push(name.to_owned()),
                MemberProperty::Computed(key) => gather_name_parts(key, parts),
            }
        }
        Expression::Call { callee, .. } | Expression::New { callee, .. } => {
            gather_name_parts(callee, parts)
        }
        Expression::Await(argument)
        | Expression::Unary { argument, .. }
        | Expression::Update { argument, .. } => gather_name_parts(argument, parts),
        Expression::Assignment { target, .. } => gather_name_parts(target, parts),
        _ => {}
    }
}

fn sanitize_base(base: &str) -> String {
    let cleaned: String = base
        .chars()
        .filter(|ch| is_identifier_char(*ch))
        .collect();

    let trimmed = cleaned
        .trim_start_matches('_')
        .trim_end_matches(|ch: char| ch.is_ascii_digit());

    let truncated: String = trimmed.chars().take(MAX_BASE_LENGTH).collect();
    if truncated.is_empty() {
        return "ref".to_owned();
    }

    truncated
}
