//! Built-in default plugin package
//!
//! Loaded when no plugin list is configured. Doubles as the reference
//! for how a statically compiled plugin package registers its handlers.

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::entities::EventCategory;
use crate::plugins::discovery::{PluginModule, RegisterHook};
use crate::plugins::registry::{HandlerContext, PatternFlags, Registry};

pub const PACKAGE: &str = "builtin";

/// Module list of the built-in package, in load order.
pub fn modules() -> Vec<PluginModule> {
    vec![ping_module(), echo_module()]
}

fn ping_module() -> PluginModule {
    let register: RegisterHook = Box::new(|registry: &mut Registry| {
        registry.register(
            EventCategory::RespondTo,
            "^ping$",
            PatternFlags::case_insensitive(),
            "ping",
            Arc::new(|_ctx: &HandlerContext| Ok(Some("pong".to_string()))),
        )?;
        registry.at_start(
            "announce",
            Arc::new(|client| {
                let info = client.client_info();
                info!("{} ready on {}", info.name, info.platform);
                Ok(())
            }),
        );
        Ok(())
    });

    PluginModule::new("builtin.ping", register).with_init(Box::new(|| {
        debug!("builtin.ping initialized");
        Ok(())
    }))
}

fn echo_module() -> PluginModule {
    let register: RegisterHook = Box::new(|registry: &mut Registry| {
        registry.register(
            EventCategory::RespondTo,
            "^echo (.*)$",
            PatternFlags::default(),
            "echo",
            Arc::new(|ctx: &HandlerContext| Ok(ctx.capture(0).map(str::to_string))),
        )
    });

    PluginModule::new("builtin.echo", register)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::routing::resolver::{resolve, Resolved};

    fn loaded_registry() -> Registry {
        let mut registry = Registry::new();
        for module in modules() {
            let mut staged = Registry::new();
            module.register(&mut staged).unwrap();
            registry.absorb(staged);
        }
        registry
    }

    #[test]
    fn ping_replies_pong() {
        let registry = loaded_registry();
        let results: Vec<_> = resolve(&registry, EventCategory::RespondTo, "PING").collect();
        match &results[..] {
            [Resolved::Match { handler, captures, .. }] => {
                let ctx = HandlerContext {
                    event: crate::domain::entities::ChatEvent::respond_to("chan", "PING"),
                    captures: captures.clone(),
                };
                assert_eq!(handler(&ctx).unwrap(), Some("pong".to_string()));
            }
            _ => panic!("expected exactly one match"),
        }
    }

    #[test]
    fn echo_replies_with_capture() {
        let registry = loaded_registry();
        let results: Vec<_> = resolve(&registry, EventCategory::RespondTo, "echo hello there").collect();
        match &results[..] {
            [Resolved::Match { handler, captures, .. }] => {
                let ctx = HandlerContext {
                    event: crate::domain::entities::ChatEvent::respond_to("chan", "echo hello there"),
                    captures: captures.clone(),
                };
                assert_eq!(handler(&ctx).unwrap(), Some("hello there".to_string()));
            }
            _ => panic!("expected exactly one match"),
        }
    }

    #[test]
    fn package_registers_one_at_start_hook() {
        let registry = loaded_registry();
        assert_eq!(registry.at_start_hooks().len(), 1);
    }
}
