use std::fs;
use std::path::PathBuf;

use qtdecode::qt::{Compression, Result, SnapshotBuilder, SnapshotFile};
use tracing::info;

#[derive(clap::Args)]
pub struct Args {
	/// Output snapshot path.
	pub out: PathBuf,
	/// Compress the document with zstd.
	#[arg(long)]
	pub zstd: bool,
}

/// Write a snapshot holding one of each supported container.
pub fn run(args: Args) -> Result<()> {
	let Args { out, zstd } = args;

	let compression = if zstd { Compression::Zstd } else { Compression::None };
	let file = demo_snapshot();
	fs::write(&out, file.to_bytes(compression)?)?;
	info!(path = %out.display(), roots = file.roots.len(), compression = compression.as_str(), "sample snapshot written");

	println!("wrote: {}", out.display());
	println!("roots: {}", file.roots.iter().map(|root| root.name.as_str()).collect::<Vec<_>>().join(", "));
	Ok(())
}

/// Snapshot with roots `numbers`, `names`, `points`, `ages`, `buckets`, and `title`.
pub fn demo_snapshot() -> SnapshotFile {
	let mut b = SnapshotBuilder::new();

	let items: Vec<_> = [3, 1, 4, 1, 5].into_iter().map(|n| b.int(n)).collect();
	let numbers = b.qvector("int", &items);
	b.root("numbers", &numbers);

	let items: Vec<_> = ["alpha", "beta", "gamma"].into_iter().map(|text| b.qstring(text)).collect();
	let names = b.qlist("QString", &items);
	b.root("names", &names);

	let items: Vec<_> = [(1.0, 2.0), (3.5, -4.0)]
		.into_iter()
		.map(|(x, y)| {
			let x = b.double(x);
			let y = b.double(y);
			b.structure("QPointF", &[("xp", x), ("yp", y)])
		})
		.collect();
	let points = b.qlist("QPointF", &items);
	b.root("points", &points);

	let entries: Vec<_> = [("ada", 36), ("alan", 41), ("grace", 85)]
		.into_iter()
		.map(|(name, age)| (b.qstring(name), b.int(age)))
		.collect();
	let ages = b.qmap("QString", "int", &entries);
	b.root("ages", &ages);

	let entries: Vec<_> = [(1, vec![10, 11]), (2, vec![]), (3, vec![30])]
		.into_iter()
		.map(|(key, values)| {
			let key = b.int(key);
			let items: Vec<_> = values.into_iter().map(|n| b.int(n)).collect();
			(key, b.qvector("int", &items))
		})
		.collect();
	let buckets = b.qmap("int", "QVector<int>", &entries);
	b.root("buckets", &buckets);

	let title = b.qstring("Qt \u{1F600} containers");
	b.root("title", &title);

	b.finish()
}
