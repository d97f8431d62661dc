// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Command-line parsing.

use anyhow::{anyhow, bail, Context, Result};
use bim_shell_core::{Attribute, ChangeSource, ObjectId};

pub const USAGE: &str = "\
Usage: bim-shell <elements.json> [options] [actions]

Loads a JSON array of elements, builds the grouped tree and prints it with
visibility markers (+ visible, - hidden, ~ mixed).

Options:
  --config <file>        Session settings as JSON (default: BIM_SHELL_* env)
  --group-by <a,b,..>    Tree levels: name, id, category, family, familyType
  --json                 Print the tree as JSON
  --source <name>        Source for the following actions
                         (tree, search, contextMenu, controlBar, keyboard)

Actions, applied in order:
  --isolate <ids>        Show only these objects (comma separated)
  --show <ids>           Add objects to the visible set
  --hide <ids>           Remove objects from the visible set
  --isolate-node <n>     Isolate everything under tree node n
  --hide-node <n>        Hide everything under tree node n
  --show-node <n>        Show everything under tree node n
  --select <ids>         Set the viewer selection
  --toggle               Toggle the contextual isolation
  --clear                End the isolation
  --search <text>        Filter the tree
  --search-isolate       Isolate the search matches
";

/// One step run against the session, in command-line order.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Isolate(Vec<ObjectId>, ChangeSource),
    Show(Vec<ObjectId>, ChangeSource),
    Hide(Vec<ObjectId>, ChangeSource),
    IsolateNode(u32, ChangeSource),
    HideNode(u32, ChangeSource),
    ShowNode(u32, ChangeSource),
    Select(Vec<ObjectId>),
    Toggle(ChangeSource),
    Clear(ChangeSource),
    Search(String),
    SearchIsolate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Args {
    pub elements: String,
    pub config: Option<String>,
    pub group_by: Option<Vec<Attribute>>,
    pub json: bool,
    pub actions: Vec<Action>,
}

/// `None` means help was requested.
pub fn parse(args: &[String]) -> Result<Option<Args>> {
    let Some(first) = args.first() else {
        return Ok(None);
    };
    if first == "--help" || first == "-h" {
        return Ok(None);
    }

    let mut parsed = Args {
        elements: first.clone(),
        config: None,
        group_by: None,
        json: false,
        actions: Vec::new(),
    };
    let mut source = ChangeSource::ControlBar;

    let mut rest = args[1..].iter();
    while let Some(flag) = rest.next() {
        let mut value = || {
            rest.next()
                .cloned()
                .ok_or_else(|| anyhow!("{flag} expects a value"))
        };
        match flag.as_str() {
            "--config" => parsed.config = Some(value()?),
            "--group-by" => parsed.group_by = Some(attributes(&value()?)?),
            "--json" => parsed.json = true,
            "--source" => source = value()?.parse()?,
            "--isolate" => parsed.actions.push(Action::Isolate(ids(&value()?)?, source)),
            "--show" => parsed.actions.push(Action::Show(ids(&value()?)?, source)),
            "--hide" => parsed.actions.push(Action::Hide(ids(&value()?)?, source)),
            "--isolate-node" => parsed.actions.push(Action::IsolateNode(node(&value()?)?, source)),
            "--hide-node" => parsed.actions.push(Action::HideNode(node(&value()?)?, source)),
            "--show-node" => parsed.actions.push(Action::ShowNode(node(&value()?)?, source)),
            "--select" => parsed.actions.push(Action::Select(ids(&value()?)?)),
            "--toggle" => parsed.actions.push(Action::Toggle(source)),
            "--clear" => parsed.actions.push(Action::Clear(source)),
            "--search" => parsed.actions.push(Action::Search(value()?)),
            "--search-isolate" => parsed.actions.push(Action::SearchIsolate),
            other => bail!("unknown option: {other}"),
        }
    }
    Ok(Some(parsed))
}

fn ids(list: &str) -> Result<Vec<ObjectId>> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse()
                .map(ObjectId)
                .with_context(|| format!("invalid object id: {s}"))
        })
        .collect()
}

fn node(value: &str) -> Result<u32> {
    value
        .trim()
        .parse()
        .with_context(|| format!("invalid node index: {value}"))
}

fn attributes(list: &str) -> Result<Vec<Attribute>> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| Attribute::from_name(s).ok_or_else(|| anyhow!("unknown attribute: {s}")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn help_and_empty() {
        assert_eq!(parse(&[]).unwrap(), None);
        assert_eq!(parse(&args(&["-h"])).unwrap(), None);
    }

    #[test]
    fn actions_keep_order_and_source() {
        let parsed = parse(&args(&[
            "model.json",
            "--hide",
            "1, 2",
            "--source",
            "keyboard",
            "--toggle",
            "--search",
            "door",
        ]))
        .unwrap()
        .unwrap();

        assert_eq!(parsed.elements, "model.json");
        assert_eq!(
            parsed.actions,
            vec![
                Action::Hide(vec![ObjectId(1), ObjectId(2)], ChangeSource::ControlBar),
                Action::Toggle(ChangeSource::Keyboard),
                Action::Search("door".to_string()),
            ]
        );
    }

    #[test]
    fn group_by_names() {
        let parsed = parse(&args(&["m.json", "--group-by", "family,familyType"]))
            .unwrap()
            .unwrap();
        assert_eq!(parsed.group_by, Some(vec![Attribute::Family, Attribute::FamilyType]));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse(&args(&["m.json", "--isolate"])).is_err());
        assert!(parse(&args(&["m.json", "--isolate", "x"])).is_err());
        assert!(parse(&args(&["m.json", "--source", "mouse"])).is_err());
        assert!(parse(&args(&["m.json", "--group-by", "colour"])).is_err());
        assert!(parse(&args(&["m.json", "--frobnicate"])).is_err());
    }
}
