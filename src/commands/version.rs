use anyhow::Result;

pub fn execute() -> Result<()> {
    println!("telesim version {}", env!("CARGO_PKG_VERSION"));
    Ok(())
}
