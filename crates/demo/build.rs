fn main() -> anyhow::Result<()> {
    codegen::Build::new().run()?;
    Ok(())
}
