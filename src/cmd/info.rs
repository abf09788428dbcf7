use std::path::PathBuf;

use qtdecode::qt::{Result, TargetImage, format_addr};

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
}

/// Print snapshot-level statistics and named roots.
pub fn run(args: Args) -> Result<()> {
	let Args { path } = args;

	let image = TargetImage::open(&path)?;

	println!("path: {}", path.display());
	println!("compression: {}", image.compression.as_str());
	println!("pointer_size: {}", image.pointer_size());
	println!("type_count: {}", image.catalog.len());
	println!("region_count: {}", image.memory.len());
	println!("mapped_bytes: {}", image.memory.total_bytes());
	println!("setting_count: {}", image.settings.len());
	println!("root_count: {}", image.roots.len());

	println!("roots:");
	for root in &image.roots {
		println!("  {}: {} @ {}", root.name, root.type_name, format_addr(root.address));
	}

	Ok(())
}
