//! CLI display utilities for formatting output

use crate::plugin::api::{HealthStatus, ModuleDescriptor, PluginInfo};
use colored::Colorize;
use std::fmt::Write;

/// Render the plugin listing, one plugin per line
pub fn plugin_table(plugins: &[PluginInfo], modules: &[&str], use_color: bool) -> String {
    let mut out = String::new();
    if plugins.is_empty() {
        out.push_str("No plugins registered.\n");
    }

    let width = plugins
        .iter()
        .map(|plugin| plugin.name.len())
        .max()
        .unwrap_or(0);
    for plugin in plugins {
        let name = format!("{:width$}", plugin.name, width = width);
        let name = if use_color {
            name.bold().to_string()
        } else {
            name
        };
        let _ = writeln!(
            out,
            "{}  {:<10} {:<8} {}",
            name, plugin.plugin_type, plugin.version, plugin.description
        );
        let _ = writeln!(
            out,
            "{:width$}  {}",
            "",
            ModuleDescriptor::for_info(plugin),
            width = width
        );
    }

    if !modules.is_empty() {
        let header = "Engine modules:";
        let header = if use_color {
            header.bold().to_string()
        } else {
            header.to_string()
        };
        let _ = writeln!(out, "\n{}", header);
        for module in modules {
            let _ = writeln!(out, "  {}", module);
        }
    }
    out
}

pub fn health_line(plugin: &str, status: HealthStatus, use_color: bool) -> String {
    let label = status.to_string();
    let label = match (use_color, status) {
        (false, _) => label,
        (true, HealthStatus::Healthy) => label.green().to_string(),
        (true, HealthStatus::Unhealthy) => label.red().to_string(),
        (true, HealthStatus::Undefined) => label.yellow().to_string(),
    };
    format!("{}: {}", plugin, label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::api::PluginType;

    fn info(name: &str) -> PluginInfo {
        PluginInfo {
            name: name.to_string(),
            version: "1.0.0".to_string(),
            description: "Checks things".to_string(),
            author: "intelrun".to_string(),
            api_version: 20261001,
            plugin_type: PluginType::Analyzer,
            module: "observable_analyzers.checker.Checker".to_string(),
        }
    }

    #[test]
    fn test_plugin_table_without_color() {
        let table = plugin_table(&[info("checker")], &["engines_manager.modules.Summary"], false);
        assert!(table.contains("checker"));
        assert!(table.contains("analyzer"));
        assert!(table.contains("analyzers_manager.observable_analyzers.checker.Checker"));
        assert!(table.contains("Engine modules:"));
        assert!(table.contains("engines_manager.modules.Summary"));
    }

    #[test]
    fn test_empty_table() {
        assert_eq!(plugin_table(&[], &[], false), "No plugins registered.\n");
    }

    #[test]
    fn test_health_line_plain() {
        assert_eq!(
            health_line("http_status", HealthStatus::Undefined, false),
            "http_status: undefined"
        );
    }
}
