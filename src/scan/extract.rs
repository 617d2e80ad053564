//! Provider requirement extraction from a Terraform root module.
//!
//! Reads every `*.tf` and `*.tf.json` file directly inside the module
//! directory and collects the version constraints declared for each
//! provider, from `required_providers` and from legacy `provider` blocks.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_json::Value as Json;

use super::hcl::{self, Body, Value};
use super::outcome::ProviderRequirement;
use crate::error::{CheckError, Result};

/// Constraint strings in declaration order, keyed by provider name.
type Declarations = BTreeMap<String, Vec<String>>;

/// Collect the provider requirements of the module at `module_dir`.
///
/// Entries are ordered by provider name, then declaration order. A provider
/// declared without a version contributes nothing.
pub fn extract(module_dir: &Path) -> Result<Vec<ProviderRequirement>> {
    let files = module_files(module_dir)?;
    if files.is_empty() {
        return Err(load_error(
            module_dir,
            "no Terraform configuration files found",
        ));
    }

    let mut declared = Declarations::new();
    for file in &files {
        let src = std::fs::read_to_string(file).map_err(|e| load_error(file, e.to_string()))?;
        let name = file.to_string_lossy();
        if name.ends_with(".tf.json") {
            collect_json(&src, &mut declared).map_err(|e| load_error(file, e))?;
        } else {
            let body = hcl::parse(&src).map_err(|e| load_error(file, e.to_string()))?;
            collect_hcl(&body, &mut declared);
        }
    }

    tracing::debug!(
        "Found {} provider(s) in {} file(s) under {}",
        declared.len(),
        files.len(),
        module_dir.display()
    );

    Ok(declared
        .into_iter()
        .flat_map(|(name, versions)| {
            versions
                .into_iter()
                .map(move |version| ProviderRequirement::new(name.clone(), version))
        })
        .collect())
}

fn load_error(path: &Path, message: impl Into<String>) -> CheckError {
    CheckError::ModuleLoad {
        path: path.to_path_buf(),
        message: message.into(),
    }
}

/// Terraform files directly in `dir`, sorted by name.
fn module_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| load_error(dir, e.to_string()))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| load_error(dir, e.to_string()))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if is_ignored(&name) {
            continue;
        }
        if name.ends_with(".tf") || name.ends_with(".tf.json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Hidden files and editor backups or lock files (`.#main.tf`, `#main.tf#`, `main.tf~`).
fn is_ignored(name: &str) -> bool {
    name.starts_with('.') || name.starts_with('#') || name.ends_with('~')
}

fn declare(declared: &mut Declarations, provider: &str, version: &str) {
    declared
        .entry(provider.to_string())
        .or_default()
        .push(version.to_string());
}

fn collect_hcl(body: &Body, declared: &mut Declarations) {
    for terraform in body.blocks_of("terraform") {
        for required in terraform.body.blocks_of("required_providers") {
            for attr in &required.body.attributes {
                let version = match &attr.value {
                    Value::Str(legacy) => Some(legacy.as_str()),
                    object => object.get("version").and_then(Value::as_str),
                };
                if let Some(version) = version {
                    declare(declared, &attr.name, version);
                }
            }
        }
    }

    for provider in body.blocks_of("provider") {
        let Some(name) = provider.labels.first() else {
            continue;
        };
        if let Some(version) = provider.body.attribute("version").and_then(Value::as_str) {
            declare(declared, name, version);
        }
    }
}

/// JSON syntax lets any block appear as an object or an array of objects.
fn each_object(value: &Json) -> Vec<&serde_json::Map<String, Json>> {
    match value {
        Json::Object(map) => vec![map],
        Json::Array(items) => items.iter().filter_map(Json::as_object).collect(),
        _ => Vec::new(),
    }
}

fn collect_json(src: &str, declared: &mut Declarations) -> std::result::Result<(), String> {
    let root: Json = serde_json::from_str(src).map_err(|e| format!("invalid JSON: {}", e))?;
    let root = root
        .as_object()
        .ok_or_else(|| "top-level value must be an object".to_string())?;

    if let Some(terraform) = root.get("terraform") {
        for block in each_object(terraform) {
            let Some(required) = block.get("required_providers") else {
                continue;
            };
            for providers in each_object(required) {
                for (name, value) in providers {
                    let version = match value {
                        Json::String(legacy) => Some(legacy.as_str()),
                        other => other.get("version").and_then(Json::as_str),
                    };
                    if let Some(version) = version {
                        declare(declared, name, version);
                    }
                }
            }
        }
    }

    if let Some(provider) = root.get("provider") {
        for providers in each_object(provider) {
            for (name, configs) in providers {
                for config in each_object(configs) {
                    if let Some(version) = config.get("version").and_then(Json::as_str) {
                        declare(declared, name, version);
                    }
                }
            }
        }
    }

    Ok(())
}
