//! Structural pre-scan of template sources.
//!
//! Runs before a source reaches the parser. It bounds block and parenthesis
//! nesting and collects the `template` calls made from each `define` so call
//! cycles can be rejected up front. Everything else is left to the parser.

use std::collections::HashMap;

pub(crate) const MAX_NESTING_DEPTH: usize = 50;

const LEFT_DELIM: &str = "{{";
const RIGHT_DELIM: &str = "}}";

/// Named templates a source defines, each with the templates it invokes
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct Outline {
    pub calls: HashMap<String, Vec<String>>,
}

/// One `{{ ... }}` action: its text and its deepest parenthesis nesting
struct Action<'a> {
    body: &'a str,
    parens: usize,
    len: usize,
}

/// Split the action starting right after `{{`. `None` when it never closes.
fn split_action(src: &str) -> Option<Action<'_>> {
    let trimmed = src.trim_start_matches('-').trim_start();
    if trimmed.starts_with("/*") {
        let offset = src.len() - trimmed.len();
        let close = trimmed.find("*/")?;
        let end = trimmed[close..].find(RIGHT_DELIM)?;
        return Some(Action {
            body: "",
            parens: 0,
            len: offset + close + end + RIGHT_DELIM.len(),
        });
    }

    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut depth = 0usize;
    let mut parens = 0usize;

    for (i, c) in src.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' && q != '`' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' | '`' => quote = Some(c),
            '(' => {
                depth += 1;
                parens = parens.max(depth);
            }
            ')' => depth = depth.saturating_sub(1),
            '}' if src[i..].starts_with(RIGHT_DELIM) => {
                return Some(Action {
                    body: &src[..i],
                    parens,
                    len: i + RIGHT_DELIM.len(),
                })
            }
            _ => {}
        }
    }
    None
}

/// First quoted string in `args`, used for `define`/`template`/`block` names
fn quoted_name(args: &str) -> Option<String> {
    let args = args.trim_start();
    let quote = args.chars().next().filter(|c| *c == '"' || *c == '`')?;
    let rest = &args[1..];
    rest.find(quote).map(|end| rest[..end].to_string())
}

/// Scan `src`, failing when nesting exceeds [`MAX_NESTING_DEPTH`]
pub(crate) fn outline(src: &str) -> Result<Outline, String> {
    let mut outline = Outline::default();
    // Open blocks, innermost last. `Some` for blocks that define a template.
    let mut blocks: Vec<Option<String>> = Vec::new();
    let mut rest = src;
    let mut line = 1;

    while let Some(start) = rest.find(LEFT_DELIM) {
        line += rest[..start].matches('\n').count();
        let after = &rest[start + LEFT_DELIM.len()..];
        let action = match split_action(after) {
            Some(action) => action,
            None => break,
        };
        rest = &after[action.len..];

        if action.parens > MAX_NESTING_DEPTH {
            return Err(format!(
                "line {}: parentheses nested deeper than {} levels",
                line, MAX_NESTING_DEPTH
            ));
        }

        let body = action.body.trim_start_matches('-').trim();
        let (keyword, args) = body
            .split_once(char::is_whitespace)
            .unwrap_or((body, ""));
        let caller = blocks.iter().rev().flatten().next().cloned();

        match keyword {
            "if" | "range" | "with" => blocks.push(None),
            "define" | "block" => {
                let name = quoted_name(args).unwrap_or_default();
                if keyword == "block" {
                    if let Some(caller) = caller {
                        outline.calls.entry(caller).or_default().push(name.clone());
                    }
                }
                outline.calls.entry(name.clone()).or_default();
                blocks.push(Some(name));
            }
            "end" => {
                blocks.pop();
            }
            "template" => {
                if let (Some(caller), Some(name)) = (caller, quoted_name(args)) {
                    outline.calls.entry(caller).or_default().push(name);
                }
            }
            _ => {}
        }

        if blocks.len() > MAX_NESTING_DEPTH {
            return Err(format!(
                "line {}: blocks nested deeper than {} levels",
                line, MAX_NESTING_DEPTH
            ));
        }
        line += action.body.matches('\n').count();
    }

    Ok(outline)
}

/// Reject call cycles and call chains deeper than [`MAX_NESTING_DEPTH`]
pub(crate) fn check_calls(calls: &HashMap<String, Vec<String>>) -> Result<(), String> {
    #[derive(Clone, Copy, PartialEq, Eq)]
    enum Mark {
        Active,
        Done,
    }

    let mut marks: HashMap<&str, Mark> = HashMap::new();
    let mut roots: Vec<&String> = calls.keys().collect();
    roots.sort();

    for root in roots {
        if marks.contains_key(root.as_str()) {
            continue;
        }
        marks.insert(root.as_str(), Mark::Active);
        let mut stack: Vec<(&str, usize)> = vec![(root.as_str(), 0)];

        while let Some(&(name, next)) = stack.last() {
            let callees = calls.get(name).map(Vec::as_slice).unwrap_or(&[]);
            let callee = match callees.get(next) {
                Some(callee) => callee.as_str(),
                None => {
                    marks.insert(name, Mark::Done);
                    stack.pop();
                    continue;
                }
            };
            if let Some(top) = stack.last_mut() {
                top.1 += 1;
            }

            match marks.get(callee) {
                Some(Mark::Active) => {
                    return Err(format!("template {:?} calls itself recursively", callee))
                }
                Some(Mark::Done) => {}
                None => {
                    if stack.len() >= MAX_NESTING_DEPTH {
                        return Err(format!(
                            "template calls nested deeper than {} levels",
                            MAX_NESTING_DEPTH
                        ));
                    }
                    marks.insert(callee, Mark::Active);
                    stack.push((callee, 0));
                }
            }
        }
    }

    Ok(())
}
