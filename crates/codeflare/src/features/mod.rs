//! Feature modules served under the configured namespace.

pub mod browse;
pub mod chart;
pub mod dashboard;
pub mod description;
pub mod events;
pub mod help;
pub mod logdir;
pub mod tailf;

use codeflare_core::FeatureModule;

/// Every built-in module, in installation order.
pub fn all() -> Vec<Box<dyn FeatureModule>> {
    vec![
        Box::new(tailf::Tailf),
        Box::new(browse::Browse),
        Box::new(chart::Chart),
        Box::new(events::Events),
        Box::new(dashboard::Dashboard),
        Box::new(description::Description),
        Box::new(help::Help),
    ]
}
