use std::path::PathBuf;

use qtdecode::qt::{
	ContainerKind, Cursor, FormatterRegistry, ImageValue, Result, SyntheticChildren, TargetImage, TypeHandle, TypeKind, ValueHandle, format_addr,
	size_summary, string_summary,
};
use serde::Serialize;

use crate::cmd::util::format_scalar;

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	#[arg(long)]
	pub root: String,
	#[arg(long, default_value_t = 2)]
	pub depth: u32,
	#[arg(long = "max-children", default_value_t = 32)]
	pub max_children: usize,
	#[arg(long)]
	pub json: bool,
}

#[derive(Debug, Serialize)]
struct ShowOutput {
	path: String,
	root: String,
	address: String,
	value: RenderedValue,
}

/// One rendered value and its expanded children.
#[derive(Debug, Serialize)]
struct RenderedValue {
	name: String,
	#[serde(rename = "type")]
	type_name: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	kind: Option<&'static str>,
	#[serde(skip_serializing_if = "Option::is_none")]
	summary: Option<String>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	children: Vec<RenderedValue>,
	#[serde(skip_serializing_if = "std::ops::Not::not")]
	truncated: bool,
	#[serde(skip_serializing_if = "std::ops::Not::not")]
	corrupted: bool,
}

struct RenderCtx<'r> {
	registry: &'r FormatterRegistry,
	max_children: usize,
}

/// Decode a named root and print it as an indented tree or JSON.
pub fn run(args: Args, registry: &FormatterRegistry) -> Result<()> {
	let Args {
		path,
		root,
		depth,
		max_children,
		json,
	} = args;

	let image = TargetImage::open(&path)?;
	let value = image.root(&root)?;
	let address = value.address().map(format_addr).unwrap_or_default();
	let ctx = RenderCtx { registry, max_children };
	let rendered = ctx.render(&value, depth);

	if json {
		let output = ShowOutput {
			path: path.display().to_string(),
			root,
			address,
			value: rendered,
		};
		let text = serde_json::to_string_pretty(&output)?;
		println!("{text}");
		return Ok(());
	}

	println!("path: {}", path.display());
	println!("root: {root} @ {address}");
	print_tree(&rendered, 0);
	Ok(())
}

impl RenderCtx<'_> {
	fn render(&self, value: &ImageValue<'_>, depth: u32) -> RenderedValue {
		let mut out = RenderedValue {
			name: value.name().to_owned(),
			type_name: value.type_handle().name().to_owned(),
			kind: None,
			summary: None,
			children: Vec::new(),
			truncated: false,
			corrupted: false,
		};

		match self.registry.classify_value(value) {
			Some(ContainerKind::String) => {
				out.kind = Some(ContainerKind::String.as_str());
				out.summary = Some(string_summary(value, self.registry.config().max_string_len));
			}
			Some(kind) => {
				out.kind = Some(kind.as_str());
				self.render_container(value, kind, depth, &mut out);
			}
			None => self.render_plain(value, depth, &mut out),
		}
		out
	}

	fn render_container(&self, value: &ImageValue<'_>, kind: ContainerKind, depth: u32, out: &mut RenderedValue) {
		let Some(mut decoder) = self.registry.decoder_for(value) else {
			return;
		};
		let count = decoder.num_children();
		out.summary = Some(size_summary(count));
		if depth == 0 {
			out.truncated = count > 0;
			return;
		}

		let shown = count.min(self.max_children);
		out.truncated = shown < count;
		for index in 0..shown {
			let Some(child) = decoder.child_at_index(index) else {
				continue;
			};
			let rendered = match kind {
				ContainerKind::Map => self.render_map_node(&child, depth - 1),
				_ => self.render(&child, depth - 1),
			};
			out.children.push(rendered);
		}
		out.corrupted = decoder.is_corrupted();
	}

	/// Map nodes show only their payload; the link fields are decoder internals.
	fn render_map_node(&self, node: &ImageValue<'_>, depth: u32) -> RenderedValue {
		let children = ["key", "value"]
			.into_iter()
			.filter_map(|member| node.member(member).ok())
			.map(|member| self.render(&member, depth))
			.collect();
		RenderedValue {
			name: node.name().to_owned(),
			type_name: node.type_handle().name().to_owned(),
			kind: None,
			summary: None,
			children,
			truncated: false,
			corrupted: false,
		}
	}

	fn render_plain(&self, value: &ImageValue<'_>, depth: u32, out: &mut RenderedValue) {
		let count = match value.type_handle().kind() {
			Some(TypeKind::Primitive) => {
				out.summary = value.data().ok().and_then(|bytes| format_scalar(&out.type_name, &bytes));
				return;
			}
			Some(TypeKind::Pointer { .. } | TypeKind::Reference { .. }) => {
				out.summary = value
					.data()
					.ok()
					.and_then(|bytes| Cursor::new(&bytes).read_ptr(value.pointer_size()).ok())
					.map(format_addr);
				return;
			}
			Some(TypeKind::Struct { fields, .. }) => fields.len(),
			Some(TypeKind::Array { len, .. }) => *len,
			None => return,
		};

		if depth == 0 {
			out.truncated = count > 0;
			return;
		}
		let shown = count.min(self.max_children);
		out.truncated = shown < count;
		out.children = (0..shown)
			.filter_map(|index| value.child_at_index(index).ok())
			.map(|child| self.render(&child, depth - 1))
			.collect();
	}
}

fn print_tree(value: &RenderedValue, indent: usize) {
	let pad = "  ".repeat(indent);
	let mut line = format!("{pad}{}: {}", value.name, value.type_name);
	if let Some(summary) = &value.summary {
		line.push_str(&format!(" = {summary}"));
	}
	if value.truncated {
		line.push_str(" ...");
	}
	if value.corrupted {
		line.push_str(" (corrupted)");
	}
	println!("{line}");
	for child in &value.children {
		print_tree(child, indent + 1);
	}
}
