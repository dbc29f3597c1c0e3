//! Ansible modules, one module and one unit test per allowed verb.
//!
//! The `DOCUMENTATION` block is serialized from [`ModuleDoc`] so that it
//! always agrees with the `argument_spec` rendered next to it.

use std::fmt::Write as _;

use apigen_core::TargetKind;
use indexmap::IndexMap;
use serde::Serialize;

use super::verbs::{py_str, summary_line, Verb, VerbOption};
use super::{Language, RenderedFile, ResourceGenerator, ResourceRequest};
use crate::descriptor::{AttributeType, ResourceDescriptor};
use crate::error::Result;
use crate::naming;

/// Ansible generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnsibleGenerator;

impl ResourceGenerator for AnsibleGenerator {
    fn target(&self) -> TargetKind {
        TargetKind::Ansible
    }

    fn generate(&self, request: &ResourceRequest<'_>) -> Result<Vec<RenderedFile>> {
        let service = naming::module_name(request.service_type);
        let resource = naming::module_name(&request.descriptor.name);
        let mut files = Vec::new();
        for verb in Verb::allowed(request.descriptor) {
            let module = AnsibleModule::new(request.descriptor, &service, &resource, verb);
            files.push(RenderedFile::new(
                format!("plugins/modules/{}.py", module.name),
                Language::Python,
                module.render()?,
            ));
            files.push(RenderedFile::new(
                format!("tests/unit/plugins/modules/test_{}.py", module.name),
                Language::Python,
                module.render_test(),
            ));
        }
        tracing::debug!(
            resource = %request.descriptor.name,
            files = files.len(),
            "rendered ansible modules"
        );
        Ok(files)
    }
}

/// `DOCUMENTATION` block of a module.
#[derive(Debug, Serialize)]
pub struct ModuleDoc {
    /// Module name.
    pub module: String,
    /// One-line description.
    pub short_description: String,
    /// Paragraphs.
    pub description: Vec<String>,
    /// Options keyed by name.
    pub options: IndexMap<String, OptionDoc>,
}

/// One documented option.
#[derive(Debug, Serialize)]
pub struct OptionDoc {
    /// Paragraphs.
    pub description: Vec<String>,
    /// Ansible option type.
    #[serde(rename = "type")]
    pub option_type: AttributeType,
    /// Must be supplied.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    /// Element type of `list` options.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elements: Option<&'static str>,
}

struct AnsibleModule<'d> {
    descriptor: &'d ResourceDescriptor,
    service: &'d str,
    resource: &'d str,
    verb: Verb,
    name: String,
    class_name: String,
    options: Vec<VerbOption<'d>>,
}

impl<'d> AnsibleModule<'d> {
    fn new(descriptor: &'d ResourceDescriptor, service: &'d str, resource: &'d str, verb: Verb) -> Self {
        let name = format!("{service}_{resource}_{verb}");
        Self {
            descriptor,
            service,
            resource,
            verb,
            class_name: format!("{}Module", naming::type_name(&name)),
            options: verb.options(descriptor),
            name,
        }
    }

    fn plural(&self) -> String {
        self.descriptor
            .resources_key
            .clone()
            .unwrap_or_else(|| naming::pluralize(self.resource))
    }

    fn short_description(&self) -> String {
        let human = self.resource.replace('_', " ");
        match self.verb {
            Verb::List => format!("List {}", self.plural().replace('_', " ")),
            Verb::Show => format!("Fetch one {human}"),
            Verb::Create => format!("Create a {human}"),
            Verb::Delete => format!("Delete a {human}"),
            Verb::Set => format!("Update {human} attributes"),
            Verb::Unset => format!("Clear {human} attributes"),
        }
    }

    fn doc(&self) -> ModuleDoc {
        let mut options = IndexMap::new();
        if self.verb.targets_existing() {
            options.insert(
                "name_or_id".to_string(),
                OptionDoc {
                    description: vec![format!("Name or ID of the {}.", self.resource.replace('_', " "))],
                    option_type: AttributeType::Str,
                    required: true,
                    elements: None,
                },
            );
        }
        for option in &self.options {
            let description = if option.clears {
                format!("Clear C({}).", option.name)
            } else {
                summary_line(option.attribute.doc.as_deref())
                    .map_or_else(|| format!("Value of C({}).", option.name), |line| format!("{line}."))
            };
            let option_type = if option.clears {
                AttributeType::Bool
            } else {
                option.attribute.attr_type
            };
            options.insert(
                option.name.to_string(),
                OptionDoc {
                    description: vec![description],
                    option_type,
                    required: option.required,
                    elements: (option_type == AttributeType::List).then_some("str"),
                },
            );
        }
        ModuleDoc {
            module: self.name.clone(),
            short_description: self.short_description(),
            description: self
                .descriptor
                .doc
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(|d| vec![d.to_string()])
                .unwrap_or_else(|| vec![format!("{}.", self.short_description())]),
            options,
        }
    }

    fn render(&self) -> Result<String> {
        let doc = self.doc();
        let mut out = String::new();
        out.push_str("#!/usr/bin/python\n");
        out.push_str("# -*- coding: utf-8 -*-\n\n");
        out.push_str("DOCUMENTATION = r\"\"\"\n---\n");
        out.push_str(&serde_yaml_ng::to_string(&doc)?);
        out.push_str("\"\"\"\n\n");

        out.push_str("EXAMPLES = r\"\"\"\n");
        let _ = writeln!(out, "- name: {}", self.short_description());
        let _ = writeln!(out, "  openstack.cloud.{}:", self.name);
        out.push_str("    cloud: devstack\n");
        if self.verb.targets_existing() {
            let _ = writeln!(out, "    name_or_id: my-{}", self.resource.replace('_', "-"));
        }
        for option in self.options.iter().filter(|o| o.required) {
            let _ = writeln!(out, "    {}: {}", option.name, example_value(option.attribute.attr_type));
        }
        out.push_str("\"\"\"\n\n");

        let (return_key, return_type) = self.return_value();
        out.push_str("RETURN = r\"\"\"\n");
        if let Some(key) = &return_key {
            let _ = writeln!(out, "{key}:");
            let _ = writeln!(out, "  description: {}", self.short_description());
            out.push_str("  returned: success\n");
            let _ = writeln!(out, "  type: {return_type}");
        }
        out.push_str("\"\"\"\n\n");

        out.push_str(
            "from ansible_collections.openstack.cloud.plugins.module_utils.openstack import OpenStackModule\n\n\n",
        );
        let _ = writeln!(out, "class {}(OpenStackModule):", self.class_name);
        out.push_str("    argument_spec = {\n");
        for (name, option) in &doc.options {
            let ty = serde_yaml_ng::to_string(&option.option_type)?;
            let mut spec = format!("type={}", py_str(ty.trim()));
            if option.required {
                spec.push_str(", required=True");
            }
            if let Some(elements) = option.elements {
                let _ = write!(spec, ", elements={}", py_str(elements));
            }
            let _ = writeln!(out, "        {}: dict({spec}),", py_str(name));
        }
        out.push_str("    }\n");
        out.push_str("    module_kwargs = dict(\n");
        out.push_str("        supports_check_mode=True,\n");
        out.push_str("    )\n\n");

        out.push_str("    def run(self):\n");
        let _ = writeln!(out, "        proxy = self.conn.{}", self.service);
        if !self.options.is_empty() {
            let keys: Vec<String> = self.options.iter().map(|o| py_str(o.name)).collect();
            let keys = if keys.len() == 1 {
                format!("{},", keys[0])
            } else {
                keys.join(", ")
            };
            out.push_str("        attrs = {\n");
            if self.verb == Verb::Unset {
                out.push_str("            key: None\n");
                let _ = writeln!(out, "            for key in ({keys})");
                out.push_str("            if self.params[key]\n");
            } else {
                out.push_str("            key: self.params[key]\n");
                let _ = writeln!(out, "            for key in ({keys})");
                out.push_str("            if self.params[key] is not None\n");
            }
            out.push_str("        }\n");
        }
        self.render_run_body(&mut out, return_key.as_deref());
        out.push_str("\n\n");
        out.push_str("def main():\n");
        let _ = writeln!(out, "    module = {}()", self.class_name);
        out.push_str("    module()\n\n\n");
        out.push_str("if __name__ == \"__main__\":\n");
        out.push_str("    main()\n");
        Ok(out)
    }

    fn return_value(&self) -> (Option<String>, &'static str) {
        match self.verb {
            Verb::List => (Some(self.plural()), "list"),
            Verb::Delete => (None, "dict"),
            Verb::Show | Verb::Create | Verb::Set | Verb::Unset => {
                (Some(self.resource.to_string()), "dict")
            }
        }
    }

    fn render_run_body(&self, out: &mut String, return_key: Option<&str>) {
        let resource = self.resource;
        let kwargs = if self.options.is_empty() { "" } else { "**attrs" };
        let find = format!("proxy.find_{resource}(self.params[\"name_or_id\"], ignore_missing=False)");
        let key = return_key.unwrap_or(resource);
        match self.verb {
            Verb::List => {
                let _ = writeln!(out, "        data = proxy.{}({kwargs})", self.plural());
                out.push_str("        self.exit_json(\n");
                out.push_str("            changed=False,\n");
                let _ = writeln!(
                    out,
                    "            {key}=[item.to_dict(computed=False) for item in data],"
                );
                out.push_str("        )\n");
            }
            Verb::Show => {
                let _ = writeln!(out, "        obj = {find}");
                let _ = writeln!(out, "        self.exit_json(changed=False, {key}=obj.to_dict(computed=False))");
            }
            Verb::Create => {
                out.push_str("        if self.ansible.check_mode:\n");
                out.push_str("            self.exit_json(changed=True)\n");
                let _ = writeln!(out, "        obj = proxy.create_{resource}({kwargs})");
                let _ = writeln!(out, "        self.exit_json(changed=True, {key}=obj.to_dict(computed=False))");
            }
            Verb::Delete => {
                let _ = writeln!(
                    out,
                    "        obj = proxy.find_{resource}(self.params[\"name_or_id\"], ignore_missing=True)"
                );
                out.push_str("        if obj is None:\n");
                out.push_str("            self.exit_json(changed=False)\n");
                out.push_str("        if not self.ansible.check_mode:\n");
                let _ = writeln!(out, "            proxy.delete_{resource}(obj)");
                out.push_str("        self.exit_json(changed=True)\n");
            }
            Verb::Set | Verb::Unset => {
                let _ = writeln!(out, "        obj = {find}");
                if self.options.is_empty() {
                    out.push_str("        changes = {}\n");
                } else {
                    out.push_str("        changes = {\n");
                    out.push_str("            key: value\n");
                    out.push_str("            for key, value in attrs.items()\n");
                    out.push_str("            if getattr(obj, key, None) != value\n");
                    out.push_str("        }\n");
                }
                out.push_str("        if changes and not self.ansible.check_mode:\n");
                let _ = writeln!(out, "            obj = proxy.update_{resource}(obj, **changes)");
                out.push_str("        self.exit_json(\n");
                out.push_str("            changed=bool(changes),\n");
                let _ = writeln!(out, "            {key}=obj.to_dict(computed=False),");
                out.push_str("        )\n");
            }
        }
    }

    fn render_test(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "\"\"\"Tests for the ``{}`` module.\"\"\"\n", self.name);
        out.push_str("import yaml\n\n");
        let _ = writeln!(
            out,
            "from ansible_collections.openstack.cloud.plugins.modules import {} as module_under_test\n\n",
            self.name
        );
        out.push_str("def _documentation():\n");
        out.push_str("    return yaml.safe_load(module_under_test.DOCUMENTATION)\n\n\n");
        out.push_str("def test_documented_options_match_argument_spec():\n");
        out.push_str("    documented = _documentation()[\"options\"] or {}\n");
        let _ = writeln!(
            out,
            "    assert set(documented) == set(module_under_test.{}.argument_spec)\n\n",
            self.class_name
        );
        out.push_str("def test_module_name():\n");
        let _ = writeln!(out, "    assert _documentation()[\"module\"] == {}", py_str(&self.name));
        out
    }
}

fn example_value(attr_type: AttributeType) -> &'static str {
    match attr_type {
        AttributeType::Str => "example",
        AttributeType::Int => "1",
        AttributeType::Float => "1.5",
        AttributeType::Bool => "true",
        AttributeType::List => "[example]",
        AttributeType::Dict => "{key: value}",
        AttributeType::Raw => "{}",
    }
}
