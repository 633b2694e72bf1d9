use rustc_hash::FxHashSet;
use serde::Serialize;

/// The combinator library that lowered code calls into.
/// Helpers are always emitted in declaration order, ahead of the program body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "&'static str")]
pub enum Helper {
    Async,
    Await,
    ForTo,
    ForIn,
    ForOf,
    Switch,
    For,
    Do,
    Try,
    Finally,
    Rethrow,
    Empty,
}

pub const ALL_HELPERS: [Helper; 12] = [
    Helper::Async,
    Helper::Await,
    Helper::ForTo,
    Helper::ForIn,
    Helper::ForOf,
    Helper::Switch,
    Helper::For,
    Helper::Do,
    Helper::Try,
    Helper::Finally,
    Helper::Rethrow,
    Helper::Empty,
];

impl Helper {
    pub fn name(self) -> &'static str {
        match self {
            Helper::Async => "__async",
            Helper::Await => "__await",
            Helper::ForTo => "__forTo",
            Helper::ForIn => "__forIn",
            Helper::ForOf => "__forOf",
            Helper::Switch => "__switch",
            Helper::For => "__for",
            Helper::Do => "__do",
            Helper::Try => "__try",
            Helper::Finally => "__finally",
            Helper::Rethrow => "__rethrow",
            Helper::Empty => "__empty",
        }
    }

    /// Other helpers this one calls at runtime.
    pub fn requires(self) -> &'static [Helper] {
        match self {
            Helper::ForTo | Helper::ForIn | Helper::ForOf => &[Helper::For],
            Helper::Switch | Helper::For | Helper::Do => &[Helper::Try],
            _ => &[],
        }
    }

    pub fn source(self) -> &'static str {
        match self {
            Helper::Async => ASYNC_SOURCE,
            Helper::Await => AWAIT_SOURCE,
            Helper::ForTo => FOR_TO_SOURCE,
            Helper::ForIn => FOR_IN_SOURCE,
            Helper::ForOf => FOR_OF_SOURCE,
            Helper::Switch => SWITCH_SOURCE,
            Helper::For => FOR_SOURCE,
            Helper::Do => DO_SOURCE,
            Helper::Try => TRY_SOURCE,
            Helper::Finally => FINALLY_SOURCE,
            Helper::Rethrow => RETHROW_SOURCE,
            Helper::Empty => EMPTY_SOURCE,
        }
    }
}

impl From<Helper> for &'static str {
    fn from(helper: Helper) -> Self {
        helper.name()
    }
}

/// Adds every helper that a used helper depends on.
pub fn close_over_requirements(used: &FxHashSet<Helper>) -> Vec<Helper> {
    let mut closed = used.to_owned();
    let mut pending: Vec<Helper> = used.iter().copied().collect();

    while let Some(helper) = pending.pop() {
        for required in helper.requires() {
            if closed.insert(*required) {
                pending.push(*required);
            }
        }
    }

    ALL_HELPERS
        .iter()
        .copied()
        .filter(|helper| closed.contains(helper))
        .collect()
}

/// Source text for a set of helpers, dependencies included, in canonical order.
pub fn render_helpers(used: &FxHashSet<Helper>) -> String {
    close_over_requirements(used)
        .into_iter()
        .map(Helper::source)
        .collect::<Vec<_>>()
        .join("")
}

const ASYNC_SOURCE: &str = r#"function __async(f) {
    return function() {
        try {
            return Promise.resolve(f.apply(this, arguments));
        } catch (e) {
            return Promise.reject(e);
        }
    };
}
"#;

const AWAIT_SOURCE: &str = r#"function __await(value, then, recover) {
    return (value && value.then ? value : Promise.resolve(value)).then(then, recover);
}
"#;

const FOR_TO_SOURCE: &str = r#"function __forTo(array, body) {
    var i = 0;
    return __for(function() { return i < array.length; }, function() { i++; }, function() { return body(i); });
}
"#;

const FOR_IN_SOURCE: &str = r#"function __forIn(target, body, check) {
    var keys = [], i = 0;
    for (var key in target) {
        keys.push(key);
    }
    return __for(check ? function() { return i < keys.length && !check(); } : function() { return i < keys.length; }, function() { i++; }, function() { return body(keys[i]); });
}
"#;

const FOR_OF_SOURCE: &str = r#"function __forOf(target, body, check) {
    if (!Array.isArray(target)) {
        var values = [];
        for (var value of target) {
            values.push(value);
        }
        target = values;
    }
    var i = 0;
    return __for(check ? function() { return i < target.length && !check(); } : function() { return i < target.length; }, function() { i++; }, function() { return body(target[i]); });
}
"#;

const SWITCH_SOURCE: &str = r#"function __switch(discriminant, cases) {
    return new Promise(function(resolve, reject) {
        var i = -1;
        var defaultIndex = -1;
        function nextCase() {
            if (++i === cases.length) {
                if (defaultIndex !== -1) {
                    i = defaultIndex;
                    dispatchCaseBody();
                } else {
                    resolve();
                }
            } else {
                var test = cases[i][0];
                if (test) {
                    __try(test).then(checkCaseTest, reject);
                } else {
                    defaultIndex = i;
                    nextCase();
                }
            }
        }
        function checkCaseTest(test) {
            if (test !== discriminant) {
                nextCase();
            } else {
                dispatchCaseBody();
            }
        }
        function dispatchCaseBody() {
            for (;;) {
                var body = cases[i][1];
                if (body) {
                    return __try(body).then(checkFallthrough, reject);
                } else if (++i === cases.length) {
                    return resolve();
                }
            }
        }
        function checkFallthrough(result) {
            var fallthroughCheck = cases[i][2];
            if (!fallthroughCheck || fallthroughCheck()) {
                resolve(result);
            } else if (++i === cases.length) {
                resolve();
            } else {
                dispatchCaseBody();
            }
        }
        nextCase();
    });
}
"#;

const FOR_SOURCE: &str = r#"function __for(test, update, body) {
    return new Promise(function(resolve, reject) {
        var result;
        cycle();
        function cycle() {
            __try(test).then(checkTestResult, reject);
        }
        function stashAndUpdate(value) {
            result = value;
            return update && update();
        }
        function checkTestResult(shouldContinue) {
            if (shouldContinue) {
                __try(body).then(stashAndUpdate).then(cycle, reject);
            } else {
                resolve(result);
            }
        }
    });
}
"#;

const DO_SOURCE: &str = r#"function __do(body, test) {
    return new Promise(function(resolve, reject) {
        cycle();
        function cycle() {
            return __try(body).then(checkTestResult, reject);
        }
        function checkTestResult(value) {
            __try(test).then(function(shouldContinue) {
                if (shouldContinue) {
                    cycle();
                } else {
                    resolve(value);
                }
            }, reject);
        }
    });
}
"#;

const TRY_SOURCE: &str = r#"function __try(body) {
    return new Promise(function(resolve) { resolve(body()); });
}
"#;

const FINALLY_SOURCE: &str = r#"function __finally(promise, finalizer) {
    return promise.then(finalizer.bind(null, false), finalizer.bind(null, true));
}
"#;

const RETHROW_SOURCE: &str = r#"function __rethrow(thrown, value) {
    if (thrown) {
        throw value;
    }
    return value;
}
"#;

const EMPTY_SOURCE: &str = r#"function __empty() {
}
"#;
