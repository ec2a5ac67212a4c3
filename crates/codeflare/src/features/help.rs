//! Usage routes: `help [<topic...>]` in the namespace and `/help` at root.

use std::sync::Arc;

use codeflare_core::{
    handler_fn, help_for, CommandOutput, FeatureModule, FlagSchema, Handler, Registrar,
    RegistrationError,
};

pub struct Help;

impl FeatureModule for Help {
    fn name(&self) -> &str {
        "help"
    }

    fn register(&self, registrar: &mut Registrar<'_>) -> Result<(), RegistrationError> {
        let namespace = registrar.namespace().to_string();
        registrar.listen(
            "help [<topic...>]",
            FlagSchema::empty(),
            topic_help(namespace.clone()),
            "Show usage, optionally only for one command",
        )?;
        registrar.listen_root(
            "/help [<topic...>]",
            FlagSchema::empty(),
            topic_help(namespace),
            "Show usage",
        )?;
        Ok(())
    }
}

/// Topics are command words below the namespace; a leading namespace word
/// is accepted too.
fn topic_help(namespace: String) -> Arc<dyn Handler> {
    handler_fn(move |args, ctx| {
        let topic = args.list("topic");
        let prefix = match topic.first() {
            None => None,
            Some(first) if *first == namespace => Some(topic.join(" ")),
            Some(_) => Some(format!("{namespace} {}", topic.join(" "))),
        };
        Ok(CommandOutput::Text(help_for(ctx.registry, prefix.as_deref())))
    })
}

#[cfg(test)]
mod tests {
    use codeflare_core::{install_modules, Dispatcher, Invocation, Registry};

    use super::*;
    use crate::features;

    fn help_text(tokens: &[&str]) -> String {
        let mut registry = Registry::new();
        let report = install_modules(&mut registry, "codeflare", &features::all());
        assert!(report.is_clean(), "{report:?}");

        let outcome = Dispatcher::new(&registry)
            .dispatch(&Invocation::new(tokens.iter().copied()))
            .unwrap_or_else(|e| panic!("{e}"));
        match outcome {
            Ok(CommandOutput::Text(text)) => text,
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn test_global_help_lists_every_module() {
        let text = help_text(&["codeflare", "help"]);
        for command in ["tailf", "browse", "chart", "events", "dashboard", "description"] {
            assert!(text.contains(&format!("codeflare {command}")), "{command} missing");
        }
        assert_eq!(text, help_text(&["help"]));
    }

    #[test]
    fn test_topic_help() {
        let text = help_text(&["codeflare", "help", "chart"]);
        assert!(text.contains("codeflare chart <metric> <paths...>"));
        assert!(!text.contains("dashboard"));
        assert_eq!(text, help_text(&["help", "codeflare", "chart"]));
    }

    #[test]
    fn test_unknown_topic() {
        assert_eq!(
            help_text(&["help", "kubectl"]),
            "no commands found matching 'codeflare kubectl'"
        );
    }

    #[test]
    fn test_help_flag_scoped_to_command() {
        let text = help_text(&["codeflare", "events", "--help"]);
        assert!(text.contains("codeflare events <dir> [-k|--kind <string>]"));
        assert_eq!(text.lines().count(), 2);
    }
}
