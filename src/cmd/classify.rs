use qtdecode::qt::{FormatterRegistry, Result, TypeSignature};

#[derive(clap::Args)]
pub struct Args {
	/// Type name as the target spells it, e.g. `QMap<int, QString>`.
	pub type_name: String,
}

/// Print the parsed signature and the decoder kind selected for it.
pub fn run(args: Args, registry: &FormatterRegistry) -> Result<()> {
	let Args { type_name } = args;

	let signature = TypeSignature::parse(&type_name)?;
	let kind = registry.classify(&type_name);

	println!("type: {signature}");
	println!("base: {}", signature.base);
	println!("arity: {}", signature.arity());
	println!("kind: {}", kind.map_or("none", |kind| kind.as_str()));
	Ok(())
}
