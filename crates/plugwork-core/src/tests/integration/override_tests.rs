#![cfg(test)]

use std::sync::Arc;

use crate::kernel::error::Error;
use crate::plugin_system::error::PluginSystemError;

use super::common::{command, scenario_api};

#[test]
fn test_widget_then_widget2_override() {
    // Widget alone
    let mut api = scenario_api(&[]);
    let widget = command("Widget");
    api.add_plugin(widget.clone(), false).unwrap();
    let finalized = api.finalize().unwrap();

    let commands = &finalized["Command"];
    assert_eq!(commands.len(), 1);
    assert!(Arc::ptr_eq(commands["Widget"].class(), &widget));

    // Widget overridden by Widget2 in a fresh API
    let mut api = scenario_api(&[]);
    let widget2 = command("Widget");
    api.add_plugin(widget.clone(), false).unwrap();
    api.add_plugin(widget2.clone(), true).unwrap();
    let finalized = api.finalize().unwrap();

    let commands = &finalized["Command"];
    assert_eq!(commands.len(), 1);
    assert!(Arc::ptr_eq(commands["Widget"].class(), &widget2));
    assert!(Arc::ptr_eq(&api.get_plugin_next(&widget2).unwrap(), &widget));
}

#[test]
fn test_all_four_override_combinations() {
    // (existing name, override flag) -> outcome
    let mut api = scenario_api(&[]);
    api.add_plugin(command("fresh"), false).expect("new name, no override");

    let mut api = scenario_api(&[]);
    match api.add_plugin(command("fresh"), true) {
        Err(Error::PluginSystem(PluginSystemError::MissingOverride { name, .. })) => assert_eq!(name, "fresh"),
        other => panic!("Expected MissingOverride, got {:?}", other),
    }

    let mut api = scenario_api(&[]);
    api.add_plugin(command("taken"), false).unwrap();
    match api.add_plugin(command("taken"), false) {
        Err(Error::PluginSystem(PluginSystemError::Override { name, .. })) => assert_eq!(name, "taken"),
        other => panic!("Expected Override, got {:?}", other),
    }

    let mut api = scenario_api(&[]);
    api.add_plugin(command("taken"), false).unwrap();
    api.add_plugin(command("taken"), true).expect("existing name with override");
}

#[test]
fn test_without_collisions_namespaces_mirror_the_ledger() {
    let mut api = scenario_api(&[]);
    let names = ["user_show", "group_show", "host_show", "service_show"];
    for name in names {
        api.add_plugin(command(name), false).unwrap();
    }
    let ledger: Vec<String> = api.ledger().iter().map(|d| d.class.name().to_string()).collect();
    let finalized = api.finalize().unwrap();

    assert_eq!(finalized["Command"].names(), ledger);
    assert_eq!(finalized["Command"].names(), names.to_vec());
}

#[test]
fn test_override_error_message() {
    let mut api = scenario_api(&[]);
    api.add_plugin(command("Widget"), false).unwrap();
    let err = api.add_plugin(command("Widget"), false).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Plugin system error: Command.Widget is already registered; use override=true to replace it with plugins.Widget"
    );
}
