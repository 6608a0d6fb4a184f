use anyhow::Context as _;

use crate::cli::InitArgs;

const STARTER_PLAN: &str = "\
# memrun benchmark plan
targets:
  - assets/city.bin
  - assets/dungeon.bin
iterations: 3
sample_interval_ms: 50
stabilization_ms: 1000
unload_unused: true
force_reclaim_before_run: true
# mode: auto | system | sim
";

pub async fn init(args: InitArgs) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(&args.dir)
        .await
        .with_context(|| format!("failed to create {}", args.dir.display()))?;

    let path = args.dir.join("plan.yaml");
    if path.exists() && !args.force {
        anyhow::bail!("refusing to overwrite {} (use --force)", path.display());
    }

    tokio::fs::write(&path, STARTER_PLAN)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;

    println!("wrote {}", path.display());
    Ok(())
}
