#![cfg(test)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use crate::kernel::error::Error;
use crate::plugin_system::{FinalizeState, PluginClass};
use crate::stage_manager::Stage;
use crate::stage_manager::error::StageSystemError;

use super::common::{Greeter, Noop, command, greeter_class, scenario_api};

#[test]
fn test_finalize_twice_fails() {
    let mut api = scenario_api(&[]);
    api.add_plugin(command("ping"), false).unwrap();
    api.finalize().unwrap();

    match api.finalize() {
        Err(Error::StageSystem(StageSystemError::StageAlreadyDone { stage })) => {
            assert_eq!(stage, Stage::Finalize);
        }
        other => panic!("Expected StageAlreadyDone, got {:?}", other),
    }
}

#[test]
fn test_multi_base_plugin_is_one_instance() {
    let mut api = scenario_api(&[]);
    let user = PluginClass::builder("user")
        .base("Object")
        .base("Command")
        .build_default::<Noop>();
    api.add_plugin(user, false).unwrap();
    let finalized = api.finalize().unwrap();

    let as_command = &finalized["Command"]["user"];
    let as_object = &finalized["Object"]["user"];
    assert!(Arc::ptr_eq(as_command, as_object));
    assert_eq!(finalized.instances().len(), 1);
    assert_eq!(finalized.plugins()[0].namespaces, vec!["Command", "Object"]);
    assert!(finalized["Backend"].is_empty());
    assert_eq!(finalized.names(), vec!["Command", "Object", "Backend"]);
}

#[test]
fn test_lazy_plugin_finalized_once_across_threads() {
    const READERS: usize = 8;
    let runs = Arc::new(AtomicUsize::new(0));
    let mut api = scenario_api(&["plugins_on_demand=true"]);
    api.add_plugin(greeter_class("hello", &runs, false), false).unwrap();
    let finalized = api.finalize().unwrap();
    assert_eq!(runs.load(Ordering::SeqCst), 0);

    let barrier = Barrier::new(READERS);
    thread::scope(|scope| {
        for _ in 0..READERS {
            let finalized = Arc::clone(&finalized);
            let barrier = &barrier;
            scope.spawn(move || {
                barrier.wait();
                let instance = &finalized["Command"]["hello"];
                let greeter = instance.plugin::<Greeter>().unwrap();
                assert_eq!(instance.attr(&greeter.greeting).unwrap(), "hello from hello");
                assert_eq!(instance.state(), FinalizeState::Done);
            });
        }
    });

    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[test]
fn test_early_plugins_finalize_during_finalize() {
    let runs = Arc::new(AtomicUsize::new(0));
    let mut api = scenario_api(&["plugins_on_demand=true"]);
    api.add_plugin(greeter_class("eager", &runs, true), false).unwrap();
    api.add_plugin(greeter_class("lazy", &runs, false), false).unwrap();
    let finalized = api.finalize().unwrap();

    assert_eq!(runs.load(Ordering::SeqCst), 1);
    assert!(finalized["Command"]["eager"].is_finalized());
    assert!(!finalized["Command"]["lazy"].is_finalized());
}

#[test]
fn test_hook_error_surfaces_from_finalize() {
    use crate::kernel::error::Result;
    use crate::plugin_system::{FinalizeContext, Plugin};

    struct Failing;
    impl Plugin for Failing {
        fn on_finalize(&self, _ctx: &FinalizeContext<'_>) -> Result<()> {
            Err("no backend configured".into())
        }
    }

    let mut api = scenario_api(&[]);
    api.add_plugin(PluginClass::builder("failing").base("Backend").build(|| Failing), false)
        .unwrap();
    match api.finalize() {
        Err(Error::Other(message)) => assert_eq!(message, "no backend configured"),
        other => panic!("Expected the hook error, got {:?}", other),
    }
    // Nothing was locked and the instance stays in progress
    assert!(!api.is_locked());
    let finalized = api.finalized().unwrap();
    assert_eq!(finalized["Backend"]["failing"].state(), FinalizeState::InProgress);
}

#[test]
fn test_test_mode_skips_freezing() {
    let runs = Arc::new(AtomicUsize::new(0));
    let mut api = scenario_api(&["mode=unit_test"]);
    api.add_plugin(greeter_class("hello", &runs, true), false).unwrap();
    let finalized = api.finalize().unwrap();

    assert!(!api.is_locked());
    assert!(!finalized["Command"]["hello"].is_locked());

    let mut production = scenario_api(&[]);
    production.add_plugin(greeter_class("hello", &runs, true), false).unwrap();
    let finalized = production.finalize().unwrap();
    assert!(production.is_locked());
    assert!(finalized["Command"]["hello"].is_locked());
}
