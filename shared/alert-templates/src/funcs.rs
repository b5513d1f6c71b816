//! Template functions registered next to the engine's builtins.
//!
//! Label and annotation sets are plain maps in the template data, so the
//! label-set helpers take the set as their first argument:
//! `{{ range sortedPairs .Labels }}`, `{{ labelValues .GroupLabels | join " " }}`.

use std::collections::HashMap;

use gtmpl::{Func, FuncError, Template, Value};
use regex::Regex;

const FUNCS: &[(&str, Func)] = &[
    ("toUpper", to_upper),
    ("toLower", to_lower),
    ("title", title),
    ("trimSpace", trim_space),
    ("join", join),
    ("match", match_regex),
    ("reReplaceAll", re_replace_all),
    ("sortedPairs", sorted_pairs),
    ("labelNames", label_names),
    ("labelValues", label_values),
    ("removeLabels", remove_labels),
];

/// Make every function available to `template`. Must run before parsing.
pub(crate) fn register(template: &mut Template) {
    for (name, func) in FUNCS {
        template.add_func(name, *func);
    }
}

fn error(message: String) -> FuncError {
    FuncError::Generic(message)
}

fn arity(name: &str, args: &[Value], expected: usize) -> Result<(), FuncError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(error(format!(
            "wrong number of args for {}: want {} got {}",
            name,
            expected,
            args.len()
        )))
    }
}

fn string_arg<'a>(name: &str, value: &'a Value) -> Result<&'a str, FuncError> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(error(format!("{}: expected string; found {}", name, other))),
    }
}

fn set_arg<'a>(name: &str, value: &'a Value) -> Result<&'a HashMap<String, Value>, FuncError> {
    match value {
        Value::Map(set) | Value::Object(set) => Ok(set),
        other => Err(error(format!("{}: expected label set; found {}", name, other))),
    }
}

/// Entries of a set ordered by key
fn sorted(set: &HashMap<String, Value>) -> Vec<(&String, &Value)> {
    let mut entries: Vec<_> = set.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    entries
}

fn map_string(name: &str, args: &[Value], f: impl Fn(&str) -> String) -> Result<Value, FuncError> {
    arity(name, args, 1)?;
    Ok(Value::from(f(string_arg(name, &args[0])?)))
}

fn to_upper(args: &[Value]) -> Result<Value, FuncError> {
    map_string("toUpper", args, str::to_uppercase)
}

fn to_lower(args: &[Value]) -> Result<Value, FuncError> {
    map_string("toLower", args, str::to_lowercase)
}

fn trim_space(args: &[Value]) -> Result<Value, FuncError> {
    map_string("trimSpace", args, |s| s.trim().to_string())
}

fn title(args: &[Value]) -> Result<Value, FuncError> {
    map_string("title", args, |s| {
        let mut out = String::with_capacity(s.len());
        let mut at_word_start = true;
        for c in s.chars() {
            if at_word_start && c.is_alphabetic() {
                out.extend(c.to_uppercase());
            } else {
                out.push(c);
            }
            at_word_start = !c.is_alphanumeric() && c != '_' && c != '\'';
        }
        out
    })
}

fn join(args: &[Value]) -> Result<Value, FuncError> {
    arity("join", args, 2)?;
    let separator = string_arg("join", &args[0])?;
    match &args[1] {
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().map(ToString::to_string).collect();
            Ok(Value::from(parts.join(separator)))
        }
        other => Err(error(format!("join: expected slice; found {}", other))),
    }
}

fn compile(pattern: &str) -> Result<Regex, FuncError> {
    Regex::new(pattern).map_err(|e| error(format!("invalid regular expression: {}", e)))
}

fn match_regex(args: &[Value]) -> Result<Value, FuncError> {
    arity("match", args, 2)?;
    let re = compile(string_arg("match", &args[0])?)?;
    Ok(Value::Bool(re.is_match(string_arg("match", &args[1])?)))
}

fn re_replace_all(args: &[Value]) -> Result<Value, FuncError> {
    arity("reReplaceAll", args, 3)?;
    let re = compile(string_arg("reReplaceAll", &args[0])?)?;
    let replacement = string_arg("reReplaceAll", &args[1])?;
    let text = string_arg("reReplaceAll", &args[2])?;
    Ok(Value::from(re.replace_all(text, replacement).into_owned()))
}

/// `[{Name, Value}]` ordered by name
fn sorted_pairs(args: &[Value]) -> Result<Value, FuncError> {
    arity("sortedPairs", args, 1)?;
    let pairs = sorted(set_arg("sortedPairs", &args[0])?)
        .into_iter()
        .map(|(name, value)| {
            let mut pair = HashMap::new();
            pair.insert("Name".to_string(), Value::from(name.as_str()));
            pair.insert("Value".to_string(), Value::from(value.to_string()));
            Value::Object(pair)
        })
        .collect();
    Ok(Value::Array(pairs))
}

fn label_names(args: &[Value]) -> Result<Value, FuncError> {
    arity("labelNames", args, 1)?;
    let names = sorted(set_arg("labelNames", &args[0])?)
        .into_iter()
        .map(|(name, _)| Value::from(name.as_str()))
        .collect();
    Ok(Value::Array(names))
}

fn label_values(args: &[Value]) -> Result<Value, FuncError> {
    arity("labelValues", args, 1)?;
    let values = sorted(set_arg("labelValues", &args[0])?)
        .into_iter()
        .map(|(_, value)| value.clone())
        .collect();
    Ok(Value::Array(values))
}

/// Copy of a set without the named keys: `removeLabels .CommonLabels (labelNames .GroupLabels)`
fn remove_labels(args: &[Value]) -> Result<Value, FuncError> {
    arity("removeLabels", args, 2)?;
    let mut set = set_arg("removeLabels", &args[0])?.clone();
    match &args[1] {
        Value::Array(names) => {
            for name in names {
                set.remove(&name.to_string());
            }
        }
        name => {
            set.remove(&name.to_string());
        }
    }
    Ok(Value::Map(set))
}
