//! `schema` - list resource types and their attributes

use anyhow::Result;
use colored::Colorize;

use crate::provider::{Provider, describe};
use crate::ui;

pub fn run(type_name: Option<&str>) -> Result<()> {
    let provider = Provider::new();
    match type_name {
        None => {
            ui::header("Resource types");
            for (tier, name) in types(&provider) {
                println!("  {:<36} {}", name, format!("tier {tier}").dimmed());
            }
        }
        Some(name) => {
            let handler = provider.handler(name)?;
            ui::header(&format!("{name} (tier {})", handler.tier()));
            for (field, wire, kind) in describe(handler.schema()) {
                println!("  {:<44} {:<32} {}", field, wire.dimmed(), kind.cyan());
            }
        }
    }
    Ok(())
}

fn types(provider: &Provider) -> Vec<(u8, &'static str)> {
    provider
        .handlers()
        .into_iter()
        .map(|h| (h.tier(), h.type_name()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_types_are_ordered_by_tier() {
        let listed = types(&Provider::new());
        assert_eq!(listed.len(), 14);
        assert!(listed.windows(2).all(|w| w[0].0 <= w[1].0));
        assert!(listed.contains(&(3, "bigip_ltm_virtual_server")));
    }

    #[test]
    fn test_unknown_type_is_an_error() {
        assert!(run(Some("bigip_gtm_pool")).is_err());
    }
}
