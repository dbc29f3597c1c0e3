//! OpenStackClient-style Python commands, one module and one unit test per
//! allowed verb.

use std::fmt::Write as _;

use apigen_core::TargetKind;

use super::verbs::{py_str, python_type, summary_line, Verb, VerbOption};
use super::{Language, RenderedFile, ResourceGenerator, ResourceRequest};
use crate::descriptor::{AttributeType, ResourceDescriptor};
use crate::error::Result;
use crate::naming;

/// OSC generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct OscGenerator;

impl ResourceGenerator for OscGenerator {
    fn target(&self) -> TargetKind {
        TargetKind::Osc
    }

    fn generate(&self, request: &ResourceRequest<'_>) -> Result<Vec<RenderedFile>> {
        let ctx = OscContext::new(request);
        let mut files = Vec::new();
        for verb in Verb::allowed(request.descriptor) {
            let module_dir = format!("{}/{}/{}", ctx.service, ctx.version, ctx.resource);
            files.push(RenderedFile::new(
                format!("{module_dir}/{verb}.py"),
                Language::Python,
                ctx.render_command(verb),
            ));
            files.push(RenderedFile::new(
                format!("tests/unit/{module_dir}/test_{verb}.py"),
                Language::Python,
                ctx.render_test(verb),
            ));
        }
        tracing::debug!(
            resource = %request.descriptor.name,
            files = files.len(),
            "rendered osc commands"
        );
        Ok(files)
    }
}

struct OscContext<'d> {
    descriptor: &'d ResourceDescriptor,
    service: String,
    version: String,
    resource: String,
    plural: String,
    class_suffix: String,
}

impl<'d> OscContext<'d> {
    fn new(request: &ResourceRequest<'d>) -> Self {
        let descriptor = request.descriptor;
        let resource = naming::module_name(&descriptor.name);
        let plural = descriptor
            .resources_key
            .clone()
            .unwrap_or_else(|| naming::pluralize(&resource));
        Self {
            descriptor,
            service: naming::module_name(request.service_type),
            version: naming::module_name(request.api_version),
            class_suffix: naming::type_name(&resource),
            plural,
            resource,
        }
    }

    fn class_name(&self, verb: Verb) -> String {
        format!("{}{}", naming::type_name(verb.as_str()), self.class_suffix)
    }

    fn human(&self) -> String {
        self.resource.replace('_', " ")
    }

    fn description(&self, verb: Verb) -> String {
        let human = self.human();
        match verb {
            Verb::List => format!("List {}", self.plural.replace('_', " ")),
            Verb::Show => format!("Display {human} details"),
            Verb::Create => format!("Create new {human}"),
            Verb::Delete => format!("Delete {human}(s)"),
            Verb::Set => format!("Set {human} properties"),
            Verb::Unset => format!("Unset {human} properties"),
        }
    }

    fn columns(&self) -> String {
        let names: Vec<String> = self.descriptor.attributes.keys().map(|n| py_str(n)).collect();
        match names.as_slice() {
            [single] => format!("({single},)"),
            _ => format!("({})", names.join(", ")),
        }
    }

    fn render_command(&self, verb: Verb) -> String {
        let options = verb.options(self.descriptor);
        let mut out = String::new();
        let _ = writeln!(out, "\"\"\"{}.", self.description(verb));
        out.push('\n');
        let _ = writeln!(out, "Generated from the {} resource descriptor.", self.descriptor.name);
        out.push_str("\"\"\"\n\n");

        if options
            .iter()
            .any(|o| !o.clears && o.attribute.attr_type == AttributeType::Bool)
        {
            out.push_str("import argparse\n\n");
        }
        if options
            .iter()
            .any(|o| !o.clears && o.attribute.attr_type == AttributeType::Dict)
        {
            out.push_str("from osc_lib.cli import parseractions\n");
        }
        out.push_str("from osc_lib.command import command\n");
        out.push_str("from osc_lib import utils\n\n");
        out.push_str("from openstackclient.i18n import _\n\n\n");

        let base = match verb {
            Verb::List => "command.Lister",
            Verb::Show | Verb::Create => "command.ShowOne",
            Verb::Delete | Verb::Set | Verb::Unset => "command.Command",
        };
        let _ = writeln!(out, "class {}({base}):", self.class_name(verb));
        let _ = writeln!(out, "    _description = _({})\n", py_str(&self.description(verb)));

        out.push_str("    def get_parser(self, prog_name):\n");
        out.push_str("        parser = super().get_parser(prog_name)\n");
        if verb.targets_existing() {
            self.render_positional(&mut out, verb);
        }
        for option in &options {
            render_option(&mut out, verb, option);
        }
        out.push_str("        return parser\n\n");

        out.push_str("    def take_action(self, parsed_args):\n");
        let _ = writeln!(
            out,
            "        client = self.app.client_manager.sdk_connection.{}",
            self.service
        );
        if !options.is_empty() {
            out.push_str("        attrs = {}\n");
            for option in &options {
                if option.clears {
                    let _ = writeln!(out, "        if parsed_args.{}:", option.dest());
                    let _ = writeln!(out, "            attrs[{}] = None", py_str(option.name));
                } else {
                    let _ = writeln!(out, "        if parsed_args.{} is not None:", option.dest());
                    let _ = writeln!(
                        out,
                        "            attrs[{}] = parsed_args.{}",
                        py_str(option.name),
                        option.dest()
                    );
                }
            }
        }
        let find = format!(
            "client.find_{}(parsed_args.{}, ignore_missing=False)",
            self.resource, self.resource
        );
        match verb {
            Verb::List => {
                let _ = writeln!(out, "        columns = {}", self.columns());
                let kwargs = if options.is_empty() { "" } else { "**attrs" };
                let _ = writeln!(out, "        data = client.{}({kwargs})", self.plural);
                out.push_str("        return (\n");
                out.push_str("            columns,\n");
                out.push_str("            (utils.get_item_properties(item, columns) for item in data),\n");
                out.push_str("        )\n");
            }
            Verb::Show => {
                let _ = writeln!(out, "        obj = {find}");
                let _ = writeln!(out, "        columns = {}", self.columns());
                out.push_str("        return (columns, utils.get_item_properties(obj, columns))\n");
            }
            Verb::Create => {
                let kwargs = if options.is_empty() { "" } else { "**attrs" };
                let _ = writeln!(out, "        obj = client.create_{}({kwargs})", self.resource);
                let _ = writeln!(out, "        columns = {}", self.columns());
                out.push_str("        return (columns, utils.get_item_properties(obj, columns))\n");
            }
            Verb::Delete => {
                let _ = writeln!(out, "        for name_or_id in parsed_args.{}:", self.resource);
                let _ = writeln!(
                    out,
                    "            obj = client.find_{}(name_or_id, ignore_missing=False)",
                    self.resource
                );
                let _ = writeln!(out, "            client.delete_{}(obj)", self.resource);
            }
            Verb::Set | Verb::Unset => {
                if options.is_empty() {
                    let _ = writeln!(out, "        {find}");
                } else {
                    let _ = writeln!(out, "        obj = {find}");
                    out.push_str("        if attrs:\n");
                    let _ = writeln!(out, "            client.update_{}(obj, **attrs)", self.resource);
                }
            }
        }
        out
    }

    fn render_positional(&self, out: &mut String, verb: Verb) {
        let human = self.human();
        let (nargs, help) = match verb {
            Verb::Delete => (
                "\n            nargs=\"+\",",
                format!("{human}(s) to delete (name or ID)"),
            ),
            Verb::Show => ("", format!("{human} to display (name or ID)")),
            _ => ("", format!("{human} to modify (name or ID)")),
        };
        out.push_str("        parser.add_argument(\n");
        let _ = writeln!(out, "            {},", py_str(&self.resource));
        let _ = writeln!(out, "            metavar={},{nargs}", py_str(&format!("<{}>", self.resource)));
        let _ = writeln!(out, "            help=_({}),", py_str(&help));
        out.push_str("        )\n");
    }

    fn render_test(&self, verb: Verb) -> String {
        let class_name = self.class_name(verb);
        let options = verb.options(self.descriptor);
        let mut out = String::new();
        let _ = writeln!(
            out,
            "\"\"\"Tests for the ``{} {verb}`` command.\"\"\"\n",
            self.human()
        );
        out.push_str("from unittest import mock\n\n");
        let _ = writeln!(
            out,
            "from openstackclient.{}.{}.{} import {verb} as command_module",
            self.service, self.version, self.resource
        );
        out.push_str("from openstackclient.tests.unit import utils as tests_utils\n\n\n");

        let _ = writeln!(out, "class Test{class_name}(tests_utils.TestCommand):");
        out.push_str("    def setUp(self):\n");
        out.push_str("        super().setUp()\n");
        out.push_str("        self.app.client_manager.sdk_connection = mock.Mock()\n");
        let _ = writeln!(
            out,
            "        self.client = self.app.client_manager.sdk_connection.{}",
            self.service
        );
        let _ = writeln!(out, "        self.cmd = command_module.{class_name}(self.app, None)\n");

        let mut arglist = Vec::new();
        let mut verifylist = Vec::new();
        if verb.targets_existing() {
            arglist.push(py_str("res-id"));
            let parsed = if verb == Verb::Delete {
                "[\"res-id\"]".to_string()
            } else {
                py_str("res-id")
            };
            verifylist.push(format!("({}, {parsed})", py_str(&self.resource)));
        }
        let mut expected_attrs = Vec::new();
        for option in options.iter().filter(|o| o.required) {
            let (arg, parsed) = sample_value(option.attribute.attr_type);
            arglist.push(py_str(&option.flag()));
            if !arg.is_empty() {
                arglist.push(py_str(arg));
            }
            verifylist.push(format!("({}, {parsed})", py_str(&option.dest())));
            expected_attrs.push(format!("{}: {parsed}", py_str(option.name)));
        }

        out.push_str("    def test_take_action(self):\n");
        let _ = writeln!(out, "        arglist = [{}]", arglist.join(", "));
        let _ = writeln!(out, "        verifylist = [{}]", verifylist.join(", "));
        out.push_str("        parsed_args = self.check_parser(self.cmd, arglist, verifylist)\n");
        out.push_str("        self.cmd.take_action(parsed_args)\n");
        let resource = &self.resource;
        match verb {
            Verb::List => {
                let _ = writeln!(out, "        self.client.{}.assert_called_once_with()", self.plural);
            }
            Verb::Show => {
                let _ = writeln!(
                    out,
                    "        self.client.find_{resource}.assert_called_once_with(\"res-id\", ignore_missing=False)"
                );
            }
            Verb::Create => {
                let _ = writeln!(
                    out,
                    "        self.client.create_{resource}.assert_called_once_with(**{{{}}})",
                    expected_attrs.join(", ")
                );
            }
            Verb::Delete => {
                let _ = writeln!(
                    out,
                    "        self.client.delete_{resource}.assert_called_once_with(\n            self.client.find_{resource}.return_value\n        )"
                );
            }
            Verb::Set | Verb::Unset => {
                let _ = writeln!(out, "        self.client.update_{resource}.assert_not_called()");
            }
        }
        out
    }
}

fn render_option(out: &mut String, verb: Verb, option: &VerbOption<'_>) {
    let attr_type = option.attribute.attr_type;
    let human = option.name.replace('_', " ");
    let help = if option.clears {
        format!("Clear {human}")
    } else if verb == Verb::List {
        format!("Filter by {human}")
    } else {
        summary_line(option.attribute.doc.as_deref())
            .map_or_else(|| format!("New {human}"), ToString::to_string)
    };

    out.push_str("        parser.add_argument(\n");
    let _ = writeln!(out, "            {},", py_str(&option.flag()));
    let _ = writeln!(out, "            dest={},", py_str(&option.dest()));
    if option.clears {
        out.push_str("            action=\"store_true\",\n");
    } else {
        match attr_type {
            AttributeType::Bool => {
                out.push_str("            action=argparse.BooleanOptionalAction,\n");
                out.push_str("            default=None,\n");
            }
            AttributeType::List => {
                let _ = writeln!(out, "            metavar={},", py_str(&format!("<{}>", option.dest())));
                out.push_str("            action=\"append\",\n");
            }
            AttributeType::Dict => {
                out.push_str("            metavar=\"<key=value>\",\n");
                out.push_str("            action=parseractions.KeyValueAction,\n");
            }
            AttributeType::Str | AttributeType::Int | AttributeType::Float | AttributeType::Raw => {
                let _ = writeln!(out, "            metavar={},", py_str(&format!("<{}>", option.dest())));
                if let Some(ty) = python_type(attr_type) {
                    let _ = writeln!(out, "            type={ty},");
                }
            }
        }
    }
    if option.required {
        out.push_str("            required=True,\n");
    }
    let _ = writeln!(out, "            help=_({}),", py_str(&help));
    out.push_str("        )\n");
}

/// Command-line sample for an attribute and its parsed Python value.
fn sample_value(attr_type: AttributeType) -> (&'static str, &'static str) {
    match attr_type {
        AttributeType::Str => ("value", "\"value\""),
        AttributeType::Int => ("1", "1"),
        AttributeType::Float => ("1.5", "1.5"),
        AttributeType::Bool => ("", "True"),
        AttributeType::List => ("item", "[\"item\"]"),
        AttributeType::Dict => ("key=value", "{\"key\": \"value\"}"),
        AttributeType::Raw => ("value", "\"value\""),
    }
}
