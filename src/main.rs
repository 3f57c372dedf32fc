use anyhow::Context;

fn main() -> anyhow::Result<()> {
    project_catalog::run().context("project-catalog failed")
}
